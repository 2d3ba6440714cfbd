//! The imperative shell: the controller and the handles states use to
//! steer it.
//!
//! # Key Concepts
//!
//! - **Stack**: activated states, oldest first; the last one is current
//! - **Queue**: states waiting to be promoted, as live instances or factories
//! - **Intent**: what the next processing step will do
//! - **Context**: the only way a running state issues requests
//!
//! A single `update` per host tick drains pending advances, runs the current
//! state, then drains pending regressions.

mod context;
mod controller;
mod error;
mod queue;
mod scheduler;

pub use context::Context;
pub use controller::Controller;
pub use error::ControllerError;
pub use queue::{Factory, Queued};
pub use scheduler::RegressTarget;
