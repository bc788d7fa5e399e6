pub mod config;
pub mod error;
pub mod types;

pub use config::{
    OutputFile, PipelineConfig, ScanOptions, Target, parse_profile_toml, parse_profile_toml_str,
};
pub use error::{ConfigError, Result};
pub use types::*;
