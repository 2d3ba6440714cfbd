//! Failure-loop detection.
//!
//! A regression that keeps failing back into the same activation would
//! otherwise ping-pong forever. The guard looks for a cycle of exit codes at
//! the newest end of the trace.

use serde::{Deserialize, Serialize};

/// Detects a repeating cycle of exit codes that contains a failure.
///
/// A cycle of length `min_cycle..=max_cycle` must repeat `repeats` times
/// back-to-back at the head of the sequence (newest first), and at least one
/// of its codes must be negative.
///
/// # Example
///
/// ```rust
/// use phasestack::core::LoopGuard;
///
/// let guard = LoopGuard::default();
///
/// // Failed, recovered, failed, recovered, failed, recovered.
/// assert_eq!(guard.check(&[-1, 0, -1, 0, -1, 0]), Some(vec![-1, 0]));
///
/// // Repetition without a failure is not a loop.
/// assert_eq!(guard.check(&[0, 0, 0, 0, 0, 0]), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopGuard {
    pub min_cycle: usize,
    pub max_cycle: usize,
    pub repeats: usize,
}

impl Default for LoopGuard {
    fn default() -> Self {
        Self {
            min_cycle: 2,
            max_cycle: 5,
            repeats: 3,
        }
    }
}

impl LoopGuard {
    /// Return the failing cycle found at the head of `codes`, if any.
    pub fn check(&self, codes: &[i32]) -> Option<Vec<i32>> {
        let cycle = repeating_sequence(codes, self.min_cycle, self.max_cycle, self.repeats)?;
        cycle.iter().any(|code| *code < 0).then_some(cycle)
    }
}

/// Shortest prefix of `seq` with length in `min_len..=max_len` that repeats
/// at least `repeats` times consecutively from the start.
pub fn repeating_sequence(
    seq: &[i32],
    min_len: usize,
    max_len: usize,
    repeats: usize,
) -> Option<Vec<i32>> {
    if repeats == 0 {
        return None;
    }
    (min_len.max(1)..=max_len)
        .take_while(|len| len.checked_mul(repeats).is_some_and(|n| n <= seq.len()))
        .find(|&len| {
            let pattern = &seq[..len];
            seq[..len * repeats]
                .chunks(len)
                .all(|chunk| chunk == pattern)
        })
        .map(|len| seq[..len].to_vec())
}
