//! The `State` trait and the identities the controller tracks states by.
//!
//! A state is an opaque unit of behavior. The controller only reads its
//! name, its discriminant and two policy flags, and drives its lifecycle
//! hooks in a fixed order: `close → (prev | on_advance/on_regress) → configure`.

use super::assets::Assets;
use super::error::StateError;
use crate::machine::Context;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Explicit discriminant naming a class of states.
///
/// Targeted regression can look for "a state like this one" by kind instead
/// of by instance.
///
/// ```rust
/// use phasestack::core::StateKind;
///
/// const MENU: StateKind = StateKind::new("Menu");
/// assert_eq!(MENU.as_str(), "Menu");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct StateKind(&'static str);

impl StateKind {
    pub const fn new(tag: &'static str) -> Self {
        Self(tag)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Instance identity, assigned by the controller when a state is bound.
///
/// Ids are never reused within one controller. `StateId::NULL` belongs to the
/// sentinel that stands in for an empty stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub(crate) u64);

impl StateId {
    pub const NULL: StateId = StateId(0);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One discrete phase of application control flow.
///
/// Only `kind`, `name` and `configure` are required. Hooks that may issue
/// transition requests receive a [`Context`]; teardown hooks only see the
/// assets.
///
/// # Example
///
/// ```rust
/// use phasestack::core::{State, StateError, StateKind};
/// use phasestack::machine::Context;
///
/// struct PickMap {
///     maps: Vec<String>,
/// }
///
/// impl State<()> for PickMap {
///     fn kind(&self) -> StateKind {
///         StateKind::new("PickMap")
///     }
///
///     fn name(&self) -> &str {
///         "PickMap"
///     }
///
///     fn configure(&mut self, ctx: &mut Context<'_, ()>) -> Result<(), StateError> {
///         if self.maps.is_empty() {
///             return Err(ctx.fail_transition("no maps loaded"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait State<C: Assets> {
    /// Discriminant used for kind-based lookups.
    fn kind(&self) -> StateKind;

    /// Display label, used only for diagnostics.
    fn name(&self) -> &str;

    /// Whether regression may pop this state. A non-revertible state is a
    /// permanent checkpoint once another state is pushed above it.
    fn revertible(&self) -> bool {
        true
    }

    /// Whether a regression that lands here keeps regressing instead of
    /// handing control back to this state.
    fn skip_on_undo(&self) -> bool {
        false
    }

    /// Sets up the environment through the assets. Runs on every activation,
    /// after `reset_assets` and `on_advance`/`on_regress`.
    ///
    /// Returning an error abandons the activation and falls back to the
    /// previous stable state.
    fn configure(&mut self, ctx: &mut Context<'_, C>) -> Result<(), StateError>;

    /// Runs before `configure` when this state was advanced to.
    fn on_advance(&mut self, _ctx: &mut Context<'_, C>) -> Result<(), StateError> {
        Ok(())
    }

    /// Runs before `configure` when this state was regressed to.
    fn on_regress(&mut self, _ctx: &mut Context<'_, C>) -> Result<(), StateError> {
        Ok(())
    }

    /// Clerical per-tick work. Never suspended.
    fn update_system(&mut self, _ctx: &mut Context<'_, C>) -> Result<(), StateError> {
        Ok(())
    }

    /// Per-tick input handling. Skipped while the assets suspend interactivity.
    fn update_interactions(&mut self, _ctx: &mut Context<'_, C>) -> Result<(), StateError> {
        Ok(())
    }

    /// Generic teardown, run on every deactivation.
    fn close(&mut self, _assets: &mut C) {}

    /// Undo whatever `configure` did. Runs after `close`, only when this
    /// state is popped by a regression.
    fn prev(&mut self, _assets: &mut C) {}

    /// Terminal cleanup. Runs at most once per instance.
    fn on_destroy(&mut self, _assets: &mut C) {}
}

/// Sentinel reported as current whenever the stack is empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullState;

impl NullState {
    pub const KIND: StateKind = StateKind::new("Null");
}

impl<C: Assets> State<C> for NullState {
    fn kind(&self) -> StateKind {
        Self::KIND
    }

    fn name(&self) -> &str {
        "Null"
    }

    fn skip_on_undo(&self) -> bool {
        true
    }

    fn configure(&mut self, _ctx: &mut Context<'_, C>) -> Result<(), StateError> {
        Ok(())
    }
}
