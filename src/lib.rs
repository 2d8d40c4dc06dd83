pub mod analytics;
pub mod auth_client;
pub mod carousel;
pub mod cli;
pub mod error;
pub mod handler;
pub mod metadata;
pub mod query;
pub mod seed;
pub mod server;
pub mod store;
pub mod tools;
pub mod types;
pub mod validation;
