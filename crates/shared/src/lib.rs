pub mod balance;
pub mod inference;
pub mod models;
pub mod security;
