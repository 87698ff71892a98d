pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::toml_config::TomlConfig;
pub use crate::core::{
    etl::EtlEngine, pipeline::ResolvePipeline, resolver::HttpResolver, ConfigProvider,
    DisplayField, Endpoint, RunSettings, RunSummary, Scheme,
};
pub use crate::utils::error::{EtlError, Result};
