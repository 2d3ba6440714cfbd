//! Queue entries and the bookkeeping the controller keeps per bound state.

use crate::core::{Assets, State, StateId};
use std::fmt;
use std::rc::Rc;

/// Zero-argument constructor for a state, instantiated when promoted.
pub struct Factory<C: Assets> {
    build: Rc<dyn Fn() -> Box<dyn State<C>>>,
    label: &'static str,
}

impl<C: Assets> Factory<C> {
    pub(crate) fn build(&self) -> Box<dyn State<C>> {
        (self.build)()
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl<C: Assets> Clone for Factory<C> {
    fn clone(&self) -> Self {
        Self {
            build: Rc::clone(&self.build),
            label: self.label,
        }
    }
}

/// A state waiting in the controller's queue.
///
/// # Example
///
/// ```rust
/// use phasestack::core::{State, StateError, StateKind};
/// use phasestack::machine::{Context, Queued};
///
/// #[derive(Default)]
/// struct Briefing;
///
/// impl State<()> for Briefing {
///     fn kind(&self) -> StateKind { StateKind::new("Briefing") }
///     fn name(&self) -> &str { "Briefing" }
///     fn configure(&mut self, _ctx: &mut Context<'_, ()>) -> Result<(), StateError> { Ok(()) }
/// }
///
/// let live = Queued::<()>::instance(Briefing);
/// let deferred = Queued::<()>::factory(Briefing::default);
///
/// assert_eq!(live.name(), "Briefing");
/// assert_eq!(deferred.name(), "Briefing");
/// ```
pub struct Queued<C: Assets>(pub(crate) Entry<C>);

pub(crate) enum Entry<C: Assets> {
    /// A live instance that has never been bound.
    Instance(Box<dyn State<C>>),
    /// Built lazily when promoted.
    Factory(Factory<C>),
    /// An instance that was popped by a regression and already destroyed.
    /// Promoting it is fatal.
    Retired(Slot<C>),
}

impl<C: Assets> Queued<C> {
    pub fn instance<S: State<C> + 'static>(state: S) -> Self {
        Self(Entry::Instance(Box::new(state)))
    }

    pub fn boxed(state: Box<dyn State<C>>) -> Self {
        Self(Entry::Instance(state))
    }

    pub fn factory<S, F>(build: F) -> Self
    where
        S: State<C> + 'static,
        F: Fn() -> S + 'static,
    {
        Self(Entry::Factory(Factory {
            build: Rc::new(move || Box::new(build()) as Box<dyn State<C>>),
            label: short_type_name::<S>(),
        }))
    }

    /// Display name; deferred entries report their type name.
    pub fn name(&self) -> &str {
        match &self.0 {
            Entry::Instance(state) => state.name(),
            Entry::Factory(factory) => factory.label,
            Entry::Retired(slot) => slot.name(),
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.0, Entry::Factory(_))
    }

    /// True for an undone, already destroyed instance.
    pub fn is_retired(&self) -> bool {
        matches!(self.0, Entry::Retired(_))
    }

    /// Drop this entry without ever activating it.
    pub(crate) fn discard(self, assets: &mut C) {
        match self.0 {
            Entry::Instance(mut state) => state.on_destroy(assets),
            Entry::Factory(_) => {}
            Entry::Retired(mut slot) => slot.destroy(assets),
        }
    }
}

impl<C: Assets> fmt::Debug for Queued<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match &self.0 {
            Entry::Instance(_) => "Instance",
            Entry::Factory(_) => "Factory",
            Entry::Retired(_) => "Retired",
        };
        f.debug_tuple(variant).field(&self.name()).finish()
    }
}

/// A bound state and the controller's bookkeeping for it.
pub(crate) struct Slot<C: Assets> {
    pub(crate) id: StateId,
    pub(crate) state: Box<dyn State<C>>,
    /// Status code; negative means the state failed
    pub(crate) exit: i32,
    /// States this activation pushed onto the queue with its last advance
    pub(crate) queued: usize,
    pub(crate) origin: Option<Factory<C>>,
    destroyed: bool,
}

impl<C: Assets> Slot<C> {
    pub(crate) fn new(id: StateId, state: Box<dyn State<C>>, origin: Option<Factory<C>>) -> Self {
        Self {
            id,
            state,
            exit: 0,
            queued: 0,
            origin,
            destroyed: false,
        }
    }

    pub(crate) fn name(&self) -> &str {
        self.state.name()
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Run `on_destroy` unless it already ran.
    pub(crate) fn destroy(&mut self, assets: &mut C) {
        if !self.destroyed {
            self.state.on_destroy(assets);
            self.destroyed = true;
        }
    }

    /// Entry to put back on the queue after this slot was undone.
    ///
    /// Factory-built states come back as their factory, so a later re-advance
    /// builds a fresh instance.
    pub(crate) fn into_requeued(mut self) -> Queued<C> {
        self.queued = 0;
        match self.origin.take() {
            Some(factory) => Queued(Entry::Factory(factory)),
            None => Queued(Entry::Retired(self)),
        }
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{StateError, StateKind};
    use crate::machine::Context;
    use std::cell::Cell;

    struct Crate {
        destroyed: Rc<Cell<usize>>,
    }

    impl State<()> for Crate {
        fn kind(&self) -> StateKind {
            StateKind::new("Crate")
        }

        fn name(&self) -> &str {
            "Crate"
        }

        fn configure(&mut self, _ctx: &mut Context<'_, ()>) -> Result<(), StateError> {
            Ok(())
        }

        fn on_destroy(&mut self, _assets: &mut ()) {
            self.destroyed.set(self.destroyed.get() + 1);
        }
    }

    fn counter() -> Rc<Cell<usize>> {
        Rc::new(Cell::new(0))
    }

    #[test]
    fn factory_label_is_the_short_type_name() {
        let destroyed = counter();
        let entry = Queued::<()>::factory(move || Crate {
            destroyed: Rc::clone(&destroyed),
        });
        assert_eq!(entry.name(), "Crate");
        assert!(entry.is_deferred());
        assert!(!entry.is_retired());
    }

    #[test]
    fn discarding_an_instance_destroys_it() {
        let destroyed = counter();
        let entry = Queued::instance(Crate {
            destroyed: Rc::clone(&destroyed),
        });
        entry.discard(&mut ());
        assert_eq!(destroyed.get(), 1);
    }

    #[test]
    fn slot_destroy_runs_once() {
        let destroyed = counter();
        let mut slot: Slot<()> = Slot::new(
            StateId(1),
            Box::new(Crate {
                destroyed: Rc::clone(&destroyed),
            }),
            None,
        );
        slot.destroy(&mut ());
        slot.destroy(&mut ());
        assert!(slot.is_destroyed());
        assert_eq!(destroyed.get(), 1);

        // A retired slot is not destroyed again when discarded.
        slot.into_requeued().discard(&mut ());
        assert_eq!(destroyed.get(), 1);
    }

    #[test]
    fn requeued_factory_slot_becomes_deferred() {
        let destroyed = counter();
        let shared = Rc::clone(&destroyed);
        let Queued(Entry::Factory(factory)) = Queued::<()>::factory(move || Crate {
            destroyed: Rc::clone(&shared),
        }) else {
            panic!("expected factory entry");
        };

        let mut slot = Slot::new(StateId(4), factory.build(), Some(factory));
        slot.queued = 3;
        let requeued = slot.into_requeued();
        assert!(requeued.is_deferred());
        assert_eq!(requeued.name(), "Crate");
    }

    #[test]
    fn short_type_name_strips_paths_and_generics() {
        assert_eq!(short_type_name::<Crate>(), "Crate");
        assert_eq!(short_type_name::<Vec<Crate>>(), "Vec");
    }
}
