pub mod admin;
pub mod balances;
pub mod inference;
pub mod models;
pub mod nodes;
pub mod policy;
pub mod requests;
