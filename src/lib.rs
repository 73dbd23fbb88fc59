pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{
    http::{HttpClient, RetryPolicy},
    mongo::MongoStore,
    storage::LocalStorage,
};
pub use config::{LogConfig, RunConfig};
pub use crate::core::{etl::EtlEngine, pipeline::ApiPipeline};
pub use utils::error::{EtlError, Result};
