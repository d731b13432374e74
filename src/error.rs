//! Top-level error type for library entry points.

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::parsing::fastx::DataError;

/// Any failure that aborts a command
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
