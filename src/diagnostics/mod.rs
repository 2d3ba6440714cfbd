//! Serializable views of a controller for developer tooling.
//!
//! A snapshot captures the stack, the queue and the recent transition
//! history at one instant. It is meant for inspectors and bug reports; it
//! cannot be used to rebuild a controller.

use crate::core::{StateId, TraceEntry, TransitionIntent};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// What the controller knows about one bound state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateSummary {
    pub id: StateId,
    pub name: String,
    pub kind: String,
    pub exit: i32,
    pub revertible: bool,
    pub skip_on_undo: bool,
}

/// Point-in-time view of a controller.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    /// Snapshot format version
    pub version: u32,

    /// Controller domain, `SM_<name>`
    pub domain: String,

    pub taken_at: DateTime<Utc>,

    pub intent: TransitionIntent,

    /// Top of the stack, or the null sentinel
    pub current: StateSummary,

    /// Stacked states, oldest first
    pub stack: Vec<StateSummary>,

    /// Queued state names, next first
    pub queue: Vec<String>,

    pub regress_target: Option<String>,

    /// Recent transitions, oldest first
    pub history: Vec<TraceEntry>,
}

impl Snapshot {
    /// Pretty-printed JSON for inspectors and bug reports.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
