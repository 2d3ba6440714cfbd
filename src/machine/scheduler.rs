//! Transition requests and the queue they act on.
//!
//! Every request names the state that issued it. Requests from anything but
//! the active state, and requests made while a transition is already
//! pending, are logged and ignored.

use crate::core::{Assets, StateId, StateKind, TransitionIntent};
use crate::machine::error::ControllerError;
use crate::machine::queue::{Queued, Slot};
use log::warn;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// Where a multi-step regression should stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RegressTarget {
    /// One specific bound instance.
    Instance(StateId),
    /// The first state of this kind.
    Kind(StateKind),
}

impl RegressTarget {
    pub fn matches(&self, id: StateId, kind: StateKind) -> bool {
        match self {
            Self::Instance(target) => *target == id,
            Self::Kind(target) => *target == kind,
        }
    }
}

impl From<StateId> for RegressTarget {
    fn from(id: StateId) -> Self {
        Self::Instance(id)
    }
}

impl From<StateKind> for RegressTarget {
    fn from(kind: StateKind) -> Self {
        Self::Kind(kind)
    }
}

impl fmt::Display for RegressTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(id) => write!(f, "{id} (obj)"),
            Self::Kind(kind) => write!(f, "{kind} (class)"),
        }
    }
}

/// Whether `target` sits below the current state without a checkpoint in
/// between. `below` is the stack under the current state, oldest first.
pub(crate) fn target_reachable<C: Assets>(
    current_revertible: bool,
    below: &[Slot<C>],
    target: &RegressTarget,
) -> bool {
    if !current_revertible {
        return false;
    }
    for slot in below.iter().rev() {
        if target.matches(slot.id, slot.state.kind()) {
            return true;
        }
        if !slot.state.revertible() {
            return false;
        }
    }
    false
}

pub(crate) struct Scheduler<C: Assets> {
    pub(crate) domain: String,
    pub(crate) intent: TransitionIntent,
    pub(crate) queue: VecDeque<Queued<C>>,
    pub(crate) regress_target: Option<RegressTarget>,
    /// Id of the state on top of the stack, or `StateId::NULL`
    pub(crate) active: StateId,
    queue_warning: usize,
    fault: Option<ControllerError>,
}

impl<C: Assets> Scheduler<C> {
    pub(crate) fn new(domain: String, queue_warning: usize) -> Self {
        Self {
            domain,
            intent: TransitionIntent::None,
            queue: VecDeque::new(),
            regress_target: None,
            active: StateId::NULL,
            queue_warning,
            fault: None,
        }
    }

    fn is_active(&self, requested_by: StateId) -> bool {
        if requested_by != self.active {
            warn!(
                "{}: rejecting intent; request from {requested_by} does not match active state {}",
                self.domain, self.active
            );
            return false;
        }
        true
    }

    fn is_idle(&self, requested_by: StateId) -> bool {
        if self.intent.is_transitioning() {
            warn!(
                "{}: rejecting intent to transition by {requested_by}; {} is already in progress",
                self.domain, self.intent
            );
            return false;
        }
        true
    }

    fn may_transition(&self, requested_by: StateId) -> bool {
        self.is_active(requested_by) && self.is_idle(requested_by)
    }

    /// Insert `next` at the queue head, keeping its relative order.
    pub(crate) fn enqueue_front(&mut self, next: Vec<Queued<C>>) {
        for entry in next.into_iter().rev() {
            self.queue.push_front(entry);
        }
    }

    /// Returns the number of states enqueued if the request was accepted.
    pub(crate) fn advance(&mut self, requested_by: StateId, next: Vec<Queued<C>>) -> Option<usize> {
        if !self.may_transition(requested_by) {
            return None;
        }

        let count = next.len();
        self.enqueue_front(next);
        self.intent = match self.queue.front() {
            Some(entry) if entry.is_retired() => TransitionIntent::NextFromRegress,
            _ => TransitionIntent::Next,
        };

        if self.queue.len() >= self.queue_warning {
            warn!(
                "{}: queue is {} members long; warning level is {}",
                self.domain,
                self.queue.len(),
                self.queue_warning
            );
        }
        Some(count)
    }

    pub(crate) fn regress(&mut self, requested_by: StateId) -> bool {
        if !self.may_transition(requested_by) {
            return false;
        }
        self.intent = TransitionIntent::Previous;
        true
    }

    pub(crate) fn regress_to(
        &mut self,
        requested_by: StateId,
        target: RegressTarget,
        current_revertible: bool,
        below: &[Slot<C>],
    ) -> bool {
        if !self.may_transition(requested_by) {
            return false;
        }
        if !target_reachable(current_revertible, below, &target) {
            return false;
        }
        self.intent = TransitionIntent::Previous;
        self.regress_target = Some(target);
        true
    }

    pub(crate) fn unqueue(&mut self, requested_by: StateId, n: usize, assets: &mut C) {
        if self.is_active(requested_by) {
            self.drop_front(n, assets);
        }
    }

    /// Discard up to `n` entries from the queue head.
    pub(crate) fn drop_front(&mut self, n: usize, assets: &mut C) {
        let n = n.min(self.queue.len());
        for entry in self.queue.drain(..n) {
            entry.discard(assets);
        }
    }

    /// Abandon the active activation. `depth` is the current stack length.
    ///
    /// With nothing to fall back to, a fault is recorded for the controller
    /// to raise once the running hook returns.
    pub(crate) fn fail_to_previous(&mut self, requested_by: StateId, depth: usize, name: &str) {
        if !self.is_active(requested_by) {
            return;
        }
        if depth > 1 {
            self.intent = TransitionIntent::PreviousOnFail;
        } else if self.fault.is_none() {
            self.fault = Some(ControllerError::NoFallback {
                state: name.to_string(),
            });
        }
    }

    pub(crate) fn take_fault(&mut self) -> Result<(), ControllerError> {
        match self.fault.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub(crate) fn target_label(&self) -> String {
        self.regress_target
            .map(|target| target.to_string())
            .unwrap_or_else(|| "none".to_string())
    }
}
