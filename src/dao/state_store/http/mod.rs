mod config;
mod error;
mod models;
mod store;

pub use config::HttpStoreConfig;
pub use store::HttpStateStore;
