//! Bounded trace of the transitions a controller has performed.
//!
//! Every deactivation is recorded with the state's name and exit code. The
//! trace feeds both the developer-facing stack trace and the failure-loop
//! guard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// How a state left the top of the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraceMode {
    /// Closed because the next queued state was promoted.
    Advance,
    /// Closed because a previously undone state was promoted again.
    Replay,
    /// Popped by a regression.
    Undo,
    /// Popped because its activation failed.
    Fail,
}

impl TraceMode {
    pub fn marker(self) -> &'static str {
        match self {
            Self::Advance => "→",
            Self::Replay => "⟳",
            Self::Undo => "↩",
            Self::Fail => "🛑",
        }
    }
}

impl fmt::Display for TraceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Record of a single deactivation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub mode: TraceMode,
    /// Name of the state that was deactivated
    pub name: String,
    /// Its exit code at the time; negative means failure
    pub exit: i32,
    pub timestamp: DateTime<Utc>,
}

/// Ordered, bounded history of deactivations. Oldest entries fall off first.
///
/// # Example
///
/// ```rust
/// use phasestack::core::{TraceMode, TransitionHistory};
///
/// let mut history = TransitionHistory::new(2);
/// history.record(TraceMode::Advance, "Title", 0);
/// history.record(TraceMode::Advance, "Menu", 0);
/// history.record(TraceMode::Fail, "Play", -1);
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.exit_codes_newest_first(), vec![-1, 0]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionHistory {
    limit: usize,
    entries: VecDeque<TraceEntry>,
}

impl TransitionHistory {
    /// Create an empty history keeping at most `limit` entries.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            entries: VecDeque::with_capacity(limit),
        }
    }

    pub fn record(&mut self, mode: TraceMode, name: impl Into<String>, exit: i32) {
        self.entries.push_back(TraceEntry {
            mode,
            name: name.into(),
            exit,
            timestamp: Utc::now(),
        });
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from oldest to newest.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &TraceEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&TraceEntry> {
        self.entries.back()
    }

    pub fn exit_codes_newest_first(&self) -> Vec<i32> {
        self.entries.iter().rev().map(|entry| entry.exit).collect()
    }

    /// Render the trace newest-first, one `NN: <marker> <exit> <name>` line
    /// per entry. Indices count from the oldest entry.
    pub fn render_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .map(|(idx, entry)| format!("{idx:02}: {} {} {}", entry.mode, entry.exit, entry.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_history_is_empty() {
        let history = TransitionHistory::new(20);
        assert!(history.is_empty());
        assert_eq!(history.limit(), 20);
        assert!(history.last().is_none());
        assert!(history.render_lines().is_empty());
    }

    #[test]
    fn record_appends_in_order() {
        let mut history = TransitionHistory::new(20);
        history.record(TraceMode::Advance, "Null", 0);
        history.record(TraceMode::Undo, "Play", 2);

        let names: Vec<_> = history.entries().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Null", "Play"]);
        assert_eq!(history.last().map(|e| e.mode), Some(TraceMode::Undo));
    }

    #[test]
    fn oldest_entries_fall_off_at_limit() {
        let mut history = TransitionHistory::new(3);
        for (i, name) in ["A", "B", "C", "D", "E"].iter().enumerate() {
            history.record(TraceMode::Advance, *name, i as i32);
        }

        assert_eq!(history.len(), 3);
        let names: Vec<_> = history.entries().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["C", "D", "E"]);
        assert_eq!(history.exit_codes_newest_first(), vec![4, 3, 2]);
    }

    #[test]
    fn render_lines_are_newest_first() {
        let mut history = TransitionHistory::new(20);
        history.record(TraceMode::Advance, "Title", 0);
        history.record(TraceMode::Fail, "PickMap", -1);

        assert_eq!(
            history.render_lines(),
            vec!["01: 🛑 -1 PickMap".to_string(), "00: → 0 Title".to_string()]
        );
    }

    #[test]
    fn history_serializes_correctly() {
        let mut history = TransitionHistory::new(5);
        history.record(TraceMode::Replay, "Menu", 0);

        let json = serde_json::to_string(&history).unwrap();
        let back: TransitionHistory = serde_json::from_str(&json).unwrap();

        assert_eq!(back.len(), 1);
        assert_eq!(back.last(), history.last());
    }
}
