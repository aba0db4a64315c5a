pub mod config;
pub mod core;
pub mod domain;
pub mod scores;
pub mod utils;

pub use crate::config::{local::LocalStorage, CliConfig, TomlConfig};
pub use crate::core::{engine::PipelineEngine, pipeline::CohortPipeline};
pub use crate::utils::error::{PipelineError, Result};
