//! The controller that drives a stack of states through time.

use crate::builder::{ControllerBuilder, ControllerConfig};
use crate::core::{
    Assets, NullState, State, StateError, StateId, StateKind, TraceMode, TransitionHistory,
    TransitionIntent,
};
use crate::diagnostics::{Snapshot, StateSummary, SNAPSHOT_VERSION};
use crate::machine::context::Context;
use crate::machine::error::ControllerError;
use crate::machine::queue::{Entry, Queued, Slot};
use crate::machine::scheduler::{RegressTarget, Scheduler};
use chrono::Utc;
use log::{debug, error};

/// Drives a stack of activated states and a queue of pending ones.
///
/// The host calls [`Controller::update`] once per tick. Each call drains the
/// pending transition intent (promoting queued states or popping stacked
/// ones) and then runs the current state's per-tick hooks. States steer the
/// controller only through the [`Context`] their hooks receive.
///
/// # Example
///
/// ```rust
/// use phasestack::core::{State, StateError, StateKind};
/// use phasestack::machine::{Context, Controller, Queued};
/// use phasestack::builder::ControllerConfig;
///
/// struct Title;
/// struct Menu;
///
/// impl State<()> for Title {
///     fn kind(&self) -> StateKind { StateKind::new("Title") }
///     fn name(&self) -> &str { "Title" }
///     fn configure(&mut self, _ctx: &mut Context<'_, ()>) -> Result<(), StateError> { Ok(()) }
///     fn update_interactions(&mut self, ctx: &mut Context<'_, ()>) -> Result<(), StateError> {
///         ctx.advance([Queued::instance(Menu)]);
///         Ok(())
///     }
/// }
///
/// impl State<()> for Menu {
///     fn kind(&self) -> StateKind { StateKind::new("Menu") }
///     fn name(&self) -> &str { "Menu" }
///     fn configure(&mut self, _ctx: &mut Context<'_, ()>) -> Result<(), StateError> { Ok(()) }
/// }
///
/// let mut machine = Controller::new(ControllerConfig::named("Game"), (), Queued::instance(Title));
///
/// machine.update().unwrap(); // Null → Title, then Title asks for Menu
/// machine.update().unwrap(); // Title → Menu
/// assert_eq!(machine.current_name(), "Menu");
/// assert_eq!(machine.stack_names(), vec!["Title", "Menu"]);
/// ```
pub struct Controller<C: Assets> {
    config: ControllerConfig,
    assets: C,
    stack: Vec<Slot<C>>,
    null: Slot<C>,
    scheduler: Scheduler<C>,
    history: TransitionHistory,
    next_id: u64,
}

impl<C: Assets> Controller<C> {
    /// Create a controller and request the first advance into `entry_point`.
    ///
    /// The promotion itself runs at the start of the first `update`. The
    /// configuration is used as given; [`ControllerBuilder`] validates it.
    pub fn new(config: ControllerConfig, assets: C, entry_point: Queued<C>) -> Self {
        let mut scheduler = Scheduler::new(config.domain(), config.queue_warning);
        scheduler.enqueue_front(vec![entry_point]);
        // The sentinel is active, so its request passes source verification.
        scheduler.advance(StateId::NULL, Vec::new());

        Self {
            history: TransitionHistory::new(config.trace_limit),
            config,
            assets,
            stack: Vec::new(),
            null: Slot::new(StateId::NULL, Box::new(NullState), None),
            scheduler,
            next_id: 1,
        }
    }

    pub fn builder() -> ControllerBuilder<C> {
        ControllerBuilder::new()
    }

    /// Log prefix of this controller, `SM_<name>`.
    pub fn domain(&self) -> &str {
        &self.scheduler.domain
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn assets(&self) -> &C {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut C {
        &mut self.assets
    }

    pub fn intent(&self) -> TransitionIntent {
        self.scheduler.intent
    }

    pub fn is_transitioning(&self) -> bool {
        self.scheduler.intent.is_transitioning()
    }

    /// True once a fatal error has stopped the controller for good.
    pub fn is_halted(&self) -> bool {
        self.scheduler.intent == TransitionIntent::SystemFailure
    }

    fn current(&self) -> &Slot<C> {
        self.stack.last().unwrap_or(&self.null)
    }

    /// Id of the current state; `StateId::NULL` while the stack is empty.
    pub fn current_id(&self) -> StateId {
        self.current().id
    }

    pub fn current_name(&self) -> &str {
        self.current().name()
    }

    pub fn current_kind(&self) -> StateKind {
        self.current().state.kind()
    }

    pub fn current_exit(&self) -> i32 {
        self.current().exit
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn queue_len(&self) -> usize {
        self.scheduler.queue.len()
    }

    /// Ids of the stacked states, oldest first.
    pub fn stack_ids(&self) -> Vec<StateId> {
        self.stack.iter().map(|slot| slot.id).collect()
    }

    /// Names of the stacked states, oldest first.
    pub fn stack_names(&self) -> Vec<&str> {
        self.stack.iter().map(|slot| slot.name()).collect()
    }

    /// Names of the queued states, next first.
    pub fn queue_names(&self) -> Vec<&str> {
        self.scheduler.queue.iter().map(|entry| entry.name()).collect()
    }

    pub fn regress_target(&self) -> Option<RegressTarget> {
        self.scheduler.regress_target
    }

    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    /// Request an advance on behalf of `requested_by`.
    ///
    /// Requests from any state other than the current one are ignored.
    pub fn advance<I>(&mut self, requested_by: StateId, next: I) -> bool
    where
        I: IntoIterator<Item = Queued<C>>,
    {
        let next: Vec<_> = next.into_iter().collect();
        match self.scheduler.advance(requested_by, next) {
            Some(count) => {
                if let Some(top) = self.stack.last_mut() {
                    top.queued = count;
                }
                true
            }
            None => false,
        }
    }

    pub fn regress(&mut self, requested_by: StateId) -> bool {
        self.scheduler.regress(requested_by)
    }

    pub fn regress_to(&mut self, requested_by: StateId, target: impl Into<RegressTarget>) -> bool {
        let (revertible, below) = match self.stack.split_last() {
            Some((top, rest)) => (top.state.revertible(), rest),
            None => (true, &[][..]),
        };
        self.scheduler
            .regress_to(requested_by, target.into(), revertible, below)
    }

    pub fn unqueue(&mut self, requested_by: StateId, n: usize) {
        self.scheduler.unqueue(requested_by, n, &mut self.assets);
    }

    /// Abandon the current activation on behalf of `requested_by`.
    ///
    /// Fails, and halts the controller, when there is nothing to fall back to.
    pub fn fail_to_previous(&mut self, requested_by: StateId) -> Result<(), ControllerError> {
        let name = self.current_name().to_string();
        self.scheduler
            .fail_to_previous(requested_by, self.stack.len(), &name);
        if let Err(err) = self.scheduler.take_fault() {
            self.halt(&err);
            return Err(err);
        }
        Ok(())
    }

    /// Process one tick.
    ///
    /// Returns the fatal error that halted the controller, if one occurred
    /// during this call. Once halted, every later call is a no-op.
    pub fn update(&mut self) -> Result<(), ControllerError> {
        if self.is_halted() {
            return Ok(());
        }
        if let Err(err) = self.process() {
            self.halt(&err);
            return Err(err);
        }
        Ok(())
    }

    fn halt(&mut self, err: &ControllerError) {
        self.scheduler.intent = TransitionIntent::SystemFailure;
        error!("{}: {err}\n{}", self.domain(), self.stack_trace());
    }

    fn process(&mut self) -> Result<(), ControllerError> {
        let limit = self.config.max_steps_per_update;
        let mut steps = 0;
        let spend = |steps: &mut usize| {
            *steps += 1;
            if *steps > limit {
                Err(ControllerError::StepLimit { limit })
            } else {
                Ok(())
            }
        };

        while self.scheduler.intent.is_advancing() {
            spend(&mut steps)?;
            self.promote_next()?;
        }

        if self.scheduler.intent.is_settled() {
            self.run_current()?;
        }

        while self.scheduler.intent.is_regressing() {
            spend(&mut steps)?;
            self.regress_once()?;
        }
        Ok(())
    }

    /// Run `f` on the current state with a context bound to it.
    fn with_current<R>(
        &mut self,
        f: impl FnOnce(&mut dyn State<C>, &mut Context<'_, C>) -> R,
    ) -> R {
        let Self {
            stack,
            null,
            assets,
            scheduler,
            ..
        } = self;
        let (slot, below) = match stack.split_last_mut() {
            Some((top, rest)) => {
                let rest: &[Slot<C>] = rest;
                (top, rest)
            }
            None => (null, &[][..]),
        };

        let mut ctx = Context {
            id: slot.id,
            name: slot.state.name().to_string(),
            revertible: slot.state.revertible(),
            exit: &mut slot.exit,
            queued: &mut slot.queued,
            assets,
            scheduler,
            below,
        };
        f(slot.state.as_mut(), &mut ctx)
    }

    fn next_id(&mut self) -> StateId {
        let id = StateId(self.next_id);
        self.next_id += 1;
        id
    }

    fn sync_active(&mut self) {
        self.scheduler.active = self.current().id;
    }

    /// Bind a queued entry to this controller.
    ///
    /// An undone instance has already been destroyed and is never woken again.
    fn bind(&mut self, entry: Queued<C>) -> Result<Slot<C>, ControllerError> {
        match entry.0 {
            Entry::Instance(state) => Ok(Slot::new(self.next_id(), state, None)),
            Entry::Factory(factory) => Ok(Slot::new(self.next_id(), factory.build(), Some(factory))),
            Entry::Retired(slot) => Err(ControllerError::DestroyedState {
                state: slot.name().to_string(),
            }),
        }
    }

    fn promote_next(&mut self) -> Result<(), ControllerError> {
        let mode = match self.scheduler.intent {
            TransitionIntent::NextFromRegress => TraceMode::Replay,
            _ => TraceMode::Advance,
        };
        let Some(entry) = self.scheduler.queue.pop_front() else {
            return Err(ControllerError::QueueExhausted);
        };
        self.scheduler.intent = TransitionIntent::None;

        let from = {
            let Self {
                stack,
                null,
                assets,
                history,
                ..
            } = self;
            let last = stack.last_mut().unwrap_or(null);
            last.state.close(assets);
            history.record(mode, last.name(), last.exit);
            last.name().to_string()
        };

        let slot = self.bind(entry)?;
        self.stack.push(slot);
        self.sync_active();
        self.wake(false)?;

        debug!(
            "{}: advanced from '{from}' to '{}'",
            self.domain(),
            self.current_name()
        );

        self.cull_non_revertibles();
        Ok(())
    }

    /// Activate the current state: unqueue what its previous activation
    /// pushed, reset the assets, then run its entry hooks and `configure`.
    fn wake(&mut self, from_regress: bool) -> Result<(), ControllerError> {
        let result = self.with_current(|state, ctx| {
            let stale = ctx.take_queued();
            ctx.unqueue(stale);
            ctx.assets_mut().reset_assets();
            if from_regress {
                state.on_regress(ctx)?;
            } else {
                state.on_advance(ctx)?;
            }
            state.configure(ctx)
        });
        if let Err(err) = result {
            self.recover(err);
        }
        self.scheduler.take_fault()
    }

    fn run_current(&mut self) -> Result<(), ControllerError> {
        let result = self.with_current(|state, ctx| {
            state.update_system(ctx)?;
            if !ctx.assets().suspend_interactivity() {
                state.update_interactions(ctx)?;
            }
            Ok(())
        });
        if let Err(err) = result {
            self.recover(err);
        }
        self.scheduler.take_fault()
    }

    /// Turn a hook failure into a request to fall back to the previous state.
    fn recover(&mut self, err: StateError) {
        let (id, name) = {
            let current = self.current();
            (current.id, current.name().to_string())
        };
        error!("{}.{name}: {err}", self.domain());
        self.scheduler.fail_to_previous(id, self.stack.len(), &name);
        debug!("{}", self.stack_trace());
    }

    /// Destroy everything beneath the newest checkpoint; it can never be
    /// regressed to again.
    fn cull_non_revertibles(&mut self) {
        let Some(idx) = self.stack.iter().rposition(|slot| !slot.state.revertible()) else {
            return;
        };
        if idx == 0 {
            return;
        }
        for mut slot in self.stack.drain(..idx) {
            slot.destroy(&mut self.assets);
        }
        debug!("{}: culled {idx} unreachable states", self.domain());
    }

    fn regress_once(&mut self) -> Result<(), ControllerError> {
        let mut codes = vec![self.current().exit];
        codes.extend(self.history.exit_codes_newest_first());
        if let Some(cycle) = self.config.loop_guard.check(&codes) {
            return Err(ControllerError::FailureLoop { cycle });
        }

        match self.stack.last() {
            None => return Err(ControllerError::RegressFromNull),
            Some(top) if !top.state.revertible() => {
                return Err(ControllerError::NotRevertible {
                    state: top.name().to_string(),
                    target: self.scheduler.target_label(),
                })
            }
            Some(_) => {}
        }
        let Some(mut undone) = self.stack.pop() else {
            return Err(ControllerError::RegressFromNull);
        };
        self.sync_active();

        // Whatever the undone activation queued goes with it.
        self.scheduler.drop_front(undone.queued, &mut self.assets);

        if self.scheduler.intent == TransitionIntent::PreviousOnFail {
            self.history.record(TraceMode::Fail, undone.name(), undone.exit);
            self.scheduler.intent = TransitionIntent::Previous;
        } else {
            undone.state.close(&mut self.assets);
            undone.state.prev(&mut self.assets);
            self.history.record(TraceMode::Undo, undone.name(), undone.exit);
        }
        undone.destroy(&mut self.assets);
        let from = undone.name().to_string();
        self.scheduler.queue.push_front(undone.into_requeued());

        let resume = !self.stack.is_empty() && {
            let current = self.current();
            match &self.scheduler.regress_target {
                Some(target) => target.matches(current.id, current.state.kind()),
                None => !current.state.skip_on_undo(),
            }
        };
        if resume {
            self.scheduler.regress_target = None;
            self.scheduler.intent = TransitionIntent::NoneFromRegress;
            self.wake(true)?;
        }

        debug!(
            "{}: regressed from '{from}' to '{}'; state {}",
            self.domain(),
            self.current_name(),
            if resume { "did wake" } else { "did not wake" }
        );
        Ok(())
    }

    /// Human-readable rendering of the queue, the current state and the
    /// recent transition history, for developer tooling.
    pub fn stack_trace(&self) -> String {
        let mut lines = vec![
            format!(
                "State History for '{}' (last {}):",
                self.domain(),
                self.history.limit()
            ),
            "Queue".to_string(),
        ];
        lines.extend(
            self.scheduler
                .queue
                .iter()
                .enumerate()
                .rev()
                .map(|(idx, entry)| format!("{idx:02}: {}", entry.name())),
        );
        let current = self.current();
        lines.push(format!(
            "cur: {} {} {}",
            self.scheduler.intent.marker(),
            current.exit,
            current.name()
        ));
        lines.extend(self.history.render_lines());
        lines.join("\n")
    }

    /// Serializable view of the controller for inspection tools.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            domain: self.domain().to_string(),
            taken_at: Utc::now(),
            intent: self.scheduler.intent,
            current: summarize(self.current()),
            stack: self.stack.iter().map(summarize).collect(),
            queue: self.queue_names().into_iter().map(String::from).collect(),
            regress_target: self.scheduler.regress_target.map(|t| t.to_string()),
            history: self.history.entries().cloned().collect(),
        }
    }
}

fn summarize<C: Assets>(slot: &Slot<C>) -> StateSummary {
    StateSummary {
        id: slot.id,
        name: slot.name().to_string(),
        kind: slot.state.kind().as_str().to_string(),
        exit: slot.exit,
        revertible: slot.state.revertible(),
        skip_on_undo: slot.state.skip_on_undo(),
    }
}

impl<C: Assets> Drop for Controller<C> {
    fn drop(&mut self) {
        for slot in self.stack.iter_mut().rev() {
            slot.destroy(&mut self.assets);
        }
        self.null.destroy(&mut self.assets);
        let pending = self.scheduler.queue.len();
        self.scheduler.drop_front(pending, &mut self.assets);
        self.assets.destroy();
    }
}
