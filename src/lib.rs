pub mod app;
pub mod cipher;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
