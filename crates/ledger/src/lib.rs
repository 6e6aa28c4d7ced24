pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod inference;
pub mod policy;
pub mod registry;
pub mod requests;
pub mod settlement;
pub mod store;

pub use api::server::start_server;
pub use api::server::AppState;
pub use catalog::ModelCatalog;
pub use cli::Cli;
pub use config::LedgerConfig;
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use inference::{HttpInferenceExecutor, InferenceDispatcher};
pub use policy::PolicyStore;
pub use registry::NodeRegistry;
pub use requests::RequestLedger;
pub use settlement::SettlementEngine;
pub use store::LedgerContext;
