//! The handle a running hook uses to talk to its controller.

use crate::core::{Assets, StateError, StateId};
use crate::machine::queue::{Queued, Slot};
use crate::machine::scheduler::{RegressTarget, Scheduler};

/// Borrowed view of the controller handed to the active state's hooks.
///
/// Requests made through a context are always attributed to the state the
/// hook belongs to, which is the active state.
///
/// # Example
///
/// ```rust
/// use phasestack::core::{State, StateError, StateKind};
/// use phasestack::machine::{Context, Queued};
///
/// struct ConfirmMove;
/// struct ResolveMove;
///
/// impl State<()> for ResolveMove {
///     fn kind(&self) -> StateKind { StateKind::new("ResolveMove") }
///     fn name(&self) -> &str { "ResolveMove" }
///     fn configure(&mut self, _ctx: &mut Context<'_, ()>) -> Result<(), StateError> { Ok(()) }
/// }
///
/// impl State<()> for ConfirmMove {
///     fn kind(&self) -> StateKind { StateKind::new("ConfirmMove") }
///     fn name(&self) -> &str { "ConfirmMove" }
///
///     fn configure(&mut self, _ctx: &mut Context<'_, ()>) -> Result<(), StateError> {
///         Ok(())
///     }
///
///     fn update_interactions(&mut self, ctx: &mut Context<'_, ()>) -> Result<(), StateError> {
///         ctx.advance([Queued::instance(ResolveMove)]);
///         Ok(())
///     }
/// }
/// ```
pub struct Context<'a, C: Assets> {
    pub(crate) id: StateId,
    pub(crate) name: String,
    pub(crate) revertible: bool,
    pub(crate) exit: &'a mut i32,
    pub(crate) queued: &'a mut usize,
    pub(crate) assets: &'a mut C,
    pub(crate) scheduler: &'a mut Scheduler<C>,
    /// Stack beneath the calling state, oldest first
    pub(crate) below: &'a [Slot<C>],
}

impl<'a, C: Assets> Context<'a, C> {
    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &str {
        &self.scheduler.domain
    }

    pub fn assets(&self) -> &C {
        &*self.assets
    }

    pub fn assets_mut(&mut self) -> &mut C {
        &mut *self.assets
    }

    /// Status code of the calling state. Negative means failure.
    pub fn exit(&self) -> i32 {
        *self.exit
    }

    pub fn set_exit(&mut self, code: i32) {
        *self.exit = code;
    }

    /// True while a transition request is pending.
    pub fn is_transitioning(&self) -> bool {
        self.scheduler.intent.is_transitioning()
    }

    /// Number of states waiting in the queue.
    pub fn queue_len(&self) -> usize {
        self.scheduler.queue.len()
    }

    /// Request promotion of the next queued state, pushing `next` in front
    /// of the queue first. Returns whether the request was accepted.
    pub fn advance<I>(&mut self, next: I) -> bool
    where
        I: IntoIterator<Item = Queued<C>>,
    {
        let next: Vec<_> = next.into_iter().collect();
        match self.scheduler.advance(self.id, next) {
            Some(count) => {
                *self.queued = count;
                true
            }
            None => false,
        }
    }

    /// Request a step back to the previous stable state.
    pub fn regress(&mut self) -> bool {
        self.scheduler.regress(self.id)
    }

    /// Request regression down to `target`, by instance or by kind.
    ///
    /// Returns `false`, leaving everything untouched, when no matching state
    /// is reachable without crossing a checkpoint.
    pub fn regress_to(&mut self, target: impl Into<RegressTarget>) -> bool {
        self.scheduler
            .regress_to(self.id, target.into(), self.revertible, self.below)
    }

    /// Remove `n` states from the queue head.
    pub fn unqueue(&mut self, n: usize) {
        self.scheduler.unqueue(self.id, n, &mut *self.assets);
    }

    /// Abandon this activation and fall back to the previous stable state.
    ///
    /// With nothing beneath this state the controller halts once the hook
    /// returns.
    pub fn fail_to_previous(&mut self) {
        let depth = self.depth();
        self.scheduler.fail_to_previous(self.id, depth, &self.name);
    }

    /// Mark this state as failed and build the error to return from the hook.
    ///
    /// The exit code becomes `-1` unless it is already negative.
    pub fn fail_transition(&mut self, message: impl Into<String>) -> StateError {
        if *self.exit >= 0 {
            *self.exit = -1;
        }
        StateError::transition(self.name.clone(), message)
    }

    /// Clear the queued-state count left by this state's previous activation.
    pub(crate) fn take_queued(&mut self) -> usize {
        std::mem::take(&mut *self.queued)
    }

    fn depth(&self) -> usize {
        if self.id.is_null() {
            self.below.len()
        } else {
            self.below.len() + 1
        }
    }
}
