//! Fatal controller errors.

use thiserror::Error;

/// Errors that halt a controller permanently.
///
/// Each one means the state graph itself is misconfigured. They are raised
/// from `Controller::update`, after which the intent is `SystemFailure` and
/// no further tick is processed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Cannot advance to next in queue: queue is empty")]
    QueueExhausted,

    #[error("Cannot revert state from null")]
    RegressFromNull,

    #[error("Cannot revert unrevertible state '{state}'; regress target: {target}")]
    NotRevertible { state: String, target: String },

    #[error("'{state}' failed to activate but there is no state to revert to")]
    NoFallback { state: String },

    #[error("Infinite failure loop detected; repeating exit codes {cycle:?}")]
    FailureLoop { cycle: Vec<i32> },

    #[error("Cannot wake '{state}': it was destroyed when it was undone")]
    DestroyedState { state: String },

    #[error("Exceeded {limit} transitions in a single update")]
    StepLimit { limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = ControllerError::NotRevertible {
            state: "Intro".into(),
            target: "none".into(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot revert unrevertible state 'Intro'; regress target: none"
        );

        let err = ControllerError::FailureLoop { cycle: vec![-1, 0] };
        assert!(err.to_string().contains("[-1, 0]"));
    }
}
