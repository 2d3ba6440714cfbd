//! Build errors for controller construction.

use thiserror::Error;

/// Errors that can occur when building a controller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Entry point not specified. Call .entry_point(state) before .build()")]
    MissingEntryPoint,

    #[error("Assets not specified. Call .assets(assets) before .build()")]
    MissingAssets,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration could not be parsed: {0}")]
    ConfigParse(String),
}
