//! Transition intent: the controller's program counter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the controller intends to do on its next processing step.
///
/// Exactly one value is held at any time. `SystemFailure` is absorbing:
/// once set, the controller never processes another tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionIntent {
    /// Settled. The current state runs its per-tick hooks.
    #[default]
    None,
    /// Settled, having arrived at the current state through a regression.
    NoneFromRegress,
    /// Promote the next queued state.
    Next,
    /// Promote the next queued state, which is a previously undone instance.
    NextFromRegress,
    /// Pop the current state and step back.
    Previous,
    /// Pop the current state because its activation failed.
    PreviousOnFail,
    /// Halted after a fatal error.
    SystemFailure,
}

impl TransitionIntent {
    /// True for `None` and `NoneFromRegress`.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::None | Self::NoneFromRegress)
    }

    pub fn is_advancing(self) -> bool {
        matches!(self, Self::Next | Self::NextFromRegress)
    }

    pub fn is_regressing(self) -> bool {
        matches!(self, Self::Previous | Self::PreviousOnFail)
    }

    /// True whenever the intent is anything other than settled.
    ///
    /// Requests issued while transitioning are rejected.
    pub fn is_transitioning(self) -> bool {
        !self.is_settled()
    }

    /// Marker used for the current-state line of a stack trace.
    pub fn marker(self) -> &'static str {
        match self {
            Self::PreviousOnFail => "🛑",
            Self::NoneFromRegress => "⟳▶",
            Self::SystemFailure => "✖",
            _ => "▶",
        }
    }
}

impl fmt::Display for TransitionIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::NoneFromRegress => "NoneFromRegress",
            Self::Next => "Next",
            Self::NextFromRegress => "NextFromRegress",
            Self::Previous => "Previous",
            Self::PreviousOnFail => "PreviousOnFail",
            Self::SystemFailure => "SystemFailure",
        };
        f.write_str(name)
    }
}
