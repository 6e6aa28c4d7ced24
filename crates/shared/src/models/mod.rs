pub mod amount;
pub mod api;
pub mod catalog;
pub mod node;
pub mod policy;
pub mod request;

pub use catalog::ModelInfo;
pub use node::Node;
pub use policy::PolicyConfig;
pub use request::InferenceRequest;
