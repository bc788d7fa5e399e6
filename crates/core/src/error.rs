use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration problems. Any of these aborts the run before a
/// single audio file is opened.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("a minimum threshold and/or a size limit is required")]
    NoChecksEnabled,

    #[error("No target file or directory given")]
    MissingTarget,

    #[error("Invalid target path: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Can not parse resolution {0}, must be in format e.g.: 300x300")]
    Parse(String),

    #[error("Invalid size limit {0}, must be a positive number of kB")]
    InvalidSizeLimit(f64),

    #[error("Invalid {kind} path: {}", .path.display())]
    InvalidOutputPath { kind: &'static str, path: PathBuf },

    #[error("Configuration parse error: {0}")]
    ProfileParse(#[from] toml::de::Error),

    #[error("Could not open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
