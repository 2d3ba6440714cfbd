//! Core types of the transition controller.
//!
//! This module holds everything that does not drive the stack itself:
//! - The `State` trait and the identities states are tracked by
//! - The `Assets` collaborator contract
//! - The transition intent enum
//! - The bounded transition history and the failure-loop guard

mod assets;
mod error;
mod guard;
mod history;
mod intent;
mod state;

pub use assets::Assets;
pub use error::StateError;
pub use guard::{repeating_sequence, LoopGuard};
pub use history::{TraceEntry, TraceMode, TransitionHistory};
pub use intent::TransitionIntent;
pub use state::{NullState, State, StateId, StateKind};
