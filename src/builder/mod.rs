//! Builder API and configuration for controllers.
//!
//! `ControllerConfig` can be deserialized from the host's own config files;
//! `ControllerBuilder` assembles a controller fluently and validates it.

pub mod config;
pub mod controller;
pub mod error;

pub use config::ControllerConfig;
pub use controller::ControllerBuilder;
pub use error::BuildError;
