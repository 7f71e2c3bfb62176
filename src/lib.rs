pub mod aggregate;
pub mod config;
pub mod error;
pub mod field_map;
pub mod http_client;
pub mod identity;
pub mod logging;
pub mod percentiles;
pub mod profile;
pub mod queries;
pub mod records;
pub mod refresh;
pub mod season;
pub mod season_cache;
pub mod snapshot;
pub mod store;

pub use error::{Error, Result};
