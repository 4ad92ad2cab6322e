//! Errors raised by the CLI before the observer runs.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweeperError {
    #[error("configuration file {0} does not exist")]
    MissingConfig(PathBuf),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("fixture error: {0}")]
    Fixture(#[from] document_adapter::AdapterError),
    #[error("fixture {path} has no frames")]
    EmptyFrames { path: PathBuf },
    #[error("control server failed: {0}")]
    Server(#[source] std::io::Error),
}
