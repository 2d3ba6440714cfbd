//! Shared probe states for the integration tests.
//!
//! A `Lab` hands out probes that write every lifecycle hook they see into a
//! shared journal, and lets a test steer whichever probe is current through
//! a one-shot command slot consumed in `update_interactions`.

#![allow(dead_code)]

use phasestack::builder::ControllerConfig;
use phasestack::core::{Assets, State, StateError, StateKind};
use phasestack::machine::{Context, Controller, Queued, RegressTarget};
use std::cell::RefCell;
use std::rc::Rc;

pub type Journal = Rc<RefCell<Vec<String>>>;

pub struct TestAssets {
    pub resets: usize,
    pub suspended: bool,
    journal: Journal,
}

impl Assets for TestAssets {
    fn reset_assets(&mut self) {
        self.resets += 1;
    }

    fn suspend_interactivity(&self) -> bool {
        self.suspended
    }

    fn destroy(&mut self) {
        self.journal.borrow_mut().push("assets:destroy".to_string());
    }
}

pub enum Command {
    Advance(Vec<Queued<TestAssets>>),
    Regress,
    RegressTo(RegressTarget),
    Unqueue(usize),
    FailToPrevious,
}

#[derive(Clone, Default)]
pub struct Lab {
    journal: Journal,
    command: Rc<RefCell<Option<Command>>>,
    replies: Rc<RefCell<Vec<bool>>>,
}

impl Lab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self, name: &'static str) -> Probe {
        Probe {
            name,
            revertible: true,
            skip_on_undo: false,
            fail_configure: false,
            fail_on_tick: false,
            lab: self.clone(),
        }
    }

    pub fn assets(&self) -> TestAssets {
        TestAssets {
            resets: 0,
            suspended: false,
            journal: Rc::clone(&self.journal),
        }
    }

    pub fn controller(&self, entry: Probe) -> Controller<TestAssets> {
        self.controller_with(ControllerConfig::named("Test"), entry)
    }

    pub fn controller_with(&self, config: ControllerConfig, entry: Probe) -> Controller<TestAssets> {
        Controller::new(config, self.assets(), Queued::instance(entry))
    }

    pub fn send(&self, command: Command) {
        *self.command.borrow_mut() = Some(command);
    }

    pub fn has_pending_command(&self) -> bool {
        self.command.borrow().is_some()
    }

    pub fn last_reply(&self) -> Option<bool> {
        self.replies.borrow().last().copied()
    }

    pub fn events(&self) -> Vec<String> {
        self.journal.borrow().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.journal.borrow().iter().filter(|e| *e == event).count()
    }

    pub fn clear(&self) {
        self.journal.borrow_mut().clear();
    }

    fn record(&self, name: &str, hook: &str) {
        self.journal.borrow_mut().push(format!("{name}:{hook}"));
    }

    fn take_command(&self) -> Option<Command> {
        self.command.borrow_mut().take()
    }

    fn reply(&self, accepted: bool) {
        self.replies.borrow_mut().push(accepted);
    }
}

pub struct Probe {
    name: &'static str,
    revertible: bool,
    skip_on_undo: bool,
    fail_configure: bool,
    fail_on_tick: bool,
    lab: Lab,
}

impl Probe {
    pub fn checkpoint(mut self) -> Self {
        self.revertible = false;
        self
    }

    pub fn skip_on_undo(mut self) -> Self {
        self.skip_on_undo = true;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_configure = true;
        self
    }

    pub fn failing_on_tick(mut self) -> Self {
        self.fail_on_tick = true;
        self
    }

    pub fn queued(self) -> Queued<TestAssets> {
        Queued::instance(self)
    }
}

impl State<TestAssets> for Probe {
    fn kind(&self) -> StateKind {
        StateKind::new(self.name)
    }

    fn name(&self) -> &str {
        self.name
    }

    fn revertible(&self) -> bool {
        self.revertible
    }

    fn skip_on_undo(&self) -> bool {
        self.skip_on_undo
    }

    fn configure(&mut self, ctx: &mut Context<'_, TestAssets>) -> Result<(), StateError> {
        self.lab.record(self.name, "configure");
        if self.fail_configure {
            return Err(ctx.fail_transition("refused to configure"));
        }
        Ok(())
    }

    fn on_advance(&mut self, _ctx: &mut Context<'_, TestAssets>) -> Result<(), StateError> {
        self.lab.record(self.name, "on_advance");
        Ok(())
    }

    fn on_regress(&mut self, _ctx: &mut Context<'_, TestAssets>) -> Result<(), StateError> {
        self.lab.record(self.name, "on_regress");
        Ok(())
    }

    fn update_system(&mut self, _ctx: &mut Context<'_, TestAssets>) -> Result<(), StateError> {
        if self.fail_on_tick {
            return Err(StateError::hook("lost track of the cursor"));
        }
        Ok(())
    }

    fn update_interactions(&mut self, ctx: &mut Context<'_, TestAssets>) -> Result<(), StateError> {
        let Some(command) = self.lab.take_command() else {
            return Ok(());
        };
        let accepted = match command {
            Command::Advance(next) => ctx.advance(next),
            Command::Regress => ctx.regress(),
            Command::RegressTo(target) => ctx.regress_to(target),
            Command::Unqueue(n) => {
                ctx.unqueue(n);
                true
            }
            Command::FailToPrevious => {
                ctx.fail_to_previous();
                true
            }
        };
        self.lab.reply(accepted);
        Ok(())
    }

    fn close(&mut self, _assets: &mut TestAssets) {
        self.lab.record(self.name, "close");
    }

    fn prev(&mut self, _assets: &mut TestAssets) {
        self.lab.record(self.name, "prev");
    }

    fn on_destroy(&mut self, _assets: &mut TestAssets) {
        self.lab.record(self.name, "destroy");
    }
}

/// Send `command` to the current state and let the controller act on it.
pub fn drive(
    machine: &mut Controller<TestAssets>,
    lab: &Lab,
    command: Command,
) -> Result<(), phasestack::ControllerError> {
    lab.send(command);
    machine.update()?;
    machine.update()
}
