pub mod catalog;
pub mod config;
pub mod error;
pub mod json_bridge;
pub mod schema;
pub mod store;

pub use catalog::{Catalog, default_base_dir};
pub use config::{Config, ServerConfig, ViewConfig, ViewOverrides};
pub use error::{Result, StoreError};
pub use store::{DatasetSummary, Store};
