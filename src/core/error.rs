//! Recoverable errors raised by state hooks.

use thiserror::Error;

/// Error returned by a state's lifecycle or per-tick hooks.
///
/// The controller treats every `StateError` as recoverable: the failing
/// activation is abandoned and control falls back to the last stable state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The state declared that its transition cannot proceed.
    #[error("{state} → {message}")]
    Transition { state: String, message: String },

    /// Any other failure inside a hook.
    #[error("{0}")]
    Hook(String),
}

impl StateError {
    pub fn transition(state: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transition {
            state: state.into(),
            message: message.into(),
        }
    }

    pub fn hook(message: impl Into<String>) -> Self {
        Self::Hook(message.into())
    }
}
