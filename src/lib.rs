//! Phasestack: a hierarchical transition controller
//!
//! Phasestack drives a stack of discrete states (game phases, menu steps,
//! turn-sequence stages) forward and backward over time, like a browser
//! history with transactional rollback. It guarantees consistent forward
//! progression, safe undo, recovery from failed activations and detection
//! of failure loops, while staying agnostic to what each state does.
//!
//! # Core Concepts
//!
//! - **State**: an opaque unit of behavior with a name, a kind and two
//!   policy flags (`revertible`, `skip_on_undo`)
//! - **Controller**: owns the stack of activated states and the queue of
//!   pending ones, and processes one step per host tick
//! - **Context**: the handle a running state uses to request transitions
//! - **Assets**: the application-owned collaborator every state configures
//!
//! # Example
//!
//! ```rust
//! use phasestack::builder::ControllerBuilder;
//! use phasestack::core::{State, StateError, StateKind};
//! use phasestack::machine::{Context, Queued};
//!
//! struct Intro;
//! struct Menu;
//!
//! impl State<()> for Intro {
//!     fn kind(&self) -> StateKind { StateKind::new("Intro") }
//!     fn name(&self) -> &str { "Intro" }
//!     fn revertible(&self) -> bool { false }
//!     fn configure(&mut self, ctx: &mut Context<'_, ()>) -> Result<(), StateError> {
//!         ctx.advance([Queued::instance(Menu)]);
//!         Ok(())
//!     }
//! }
//!
//! impl State<()> for Menu {
//!     fn kind(&self) -> StateKind { StateKind::new("Menu") }
//!     fn name(&self) -> &str { "Menu" }
//!     fn configure(&mut self, _ctx: &mut Context<'_, ()>) -> Result<(), StateError> { Ok(()) }
//! }
//!
//! let mut machine = ControllerBuilder::new()
//!     .name("Title")
//!     .assets(())
//!     .entry_point(Queued::instance(Intro))
//!     .build()
//!     .unwrap();
//!
//! machine.update().unwrap();
//! assert_eq!(machine.current_name(), "Menu");
//! ```

pub mod builder;
pub mod core;
pub mod diagnostics;
pub mod machine;

// Re-export commonly used types
pub use builder::{ControllerBuilder, ControllerConfig};
pub use core::{Assets, State, StateError, StateId, StateKind, TransitionIntent};
pub use machine::{Context, Controller, ControllerError, Queued, RegressTarget};
