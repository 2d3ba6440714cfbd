//! Builder for constructing controllers.

use crate::builder::config::ControllerConfig;
use crate::builder::error::BuildError;
use crate::core::{Assets, LoopGuard};
use crate::machine::{Controller, Queued};

/// Builder for constructing controllers with a fluent API.
pub struct ControllerBuilder<C: Assets> {
    config: ControllerConfig,
    assets: Option<C>,
    entry_point: Option<Queued<C>>,
}

impl<C: Assets> ControllerBuilder<C> {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: ControllerConfig::default(),
            assets: None,
            entry_point: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn trace_limit(mut self, limit: usize) -> Self {
        self.config.trace_limit = limit;
        self
    }

    pub fn queue_warning(mut self, length: usize) -> Self {
        self.config.queue_warning = length;
        self
    }

    pub fn max_steps_per_update(mut self, steps: usize) -> Self {
        self.config.max_steps_per_update = steps;
        self
    }

    pub fn loop_guard(mut self, guard: LoopGuard) -> Self {
        self.config.loop_guard = guard;
        self
    }

    /// Set the shared assets (required).
    pub fn assets(mut self, assets: C) -> Self {
        self.assets = Some(assets);
        self
    }

    /// Set the first state (required).
    pub fn entry_point(mut self, entry: Queued<C>) -> Self {
        self.entry_point = Some(entry);
        self
    }

    /// Build the controller.
    /// Returns an error if required fields are missing or the configuration
    /// is inconsistent.
    pub fn build(self) -> Result<Controller<C>, BuildError> {
        let entry_point = self.entry_point.ok_or(BuildError::MissingEntryPoint)?;
        let assets = self.assets.ok_or(BuildError::MissingAssets)?;
        self.config.validate()?;
        Ok(Controller::new(self.config, assets, entry_point))
    }
}

impl<C: Assets> Default for ControllerBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{State, StateError, StateKind, TransitionIntent};
    use crate::machine::Context;

    struct Lobby;

    impl State<()> for Lobby {
        fn kind(&self) -> StateKind {
            StateKind::new("Lobby")
        }

        fn name(&self) -> &str {
            "Lobby"
        }

        fn configure(&mut self, _ctx: &mut Context<'_, ()>) -> Result<(), StateError> {
            Ok(())
        }
    }

    #[test]
    fn builder_validates_required_fields() {
        let result = ControllerBuilder::<()>::new().assets(()).build();
        assert!(matches!(result, Err(BuildError::MissingEntryPoint)));

        let result = ControllerBuilder::<()>::new()
            .entry_point(Queued::instance(Lobby))
            .build();
        assert!(matches!(result, Err(BuildError::MissingAssets)));
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let result = ControllerBuilder::new()
            .assets(())
            .entry_point(Queued::instance(Lobby))
            .max_steps_per_update(0)
            .build();
        assert!(matches!(result, Err(BuildError::InvalidConfig(_))));
    }

    #[test]
    fn builder_creates_controller_poised_to_advance() {
        let machine = ControllerBuilder::new()
            .name("Online")
            .trace_limit(8)
            .queue_warning(4)
            .assets(())
            .entry_point(Queued::factory(|| Lobby))
            .build()
            .unwrap();

        assert_eq!(machine.domain(), "SM_Online");
        assert_eq!(machine.config().trace_limit, 8);
        assert_eq!(machine.intent(), TransitionIntent::Next);
        assert_eq!(machine.current_name(), "Null");
        assert_eq!(machine.queue_names(), vec!["Lobby"]);
    }

    #[test]
    fn builder_accepts_a_loaded_config() {
        let config = ControllerConfig::named("Loaded");
        let mut machine = ControllerBuilder::new()
            .config(config)
            .assets(())
            .entry_point(Queued::instance(Lobby))
            .build()
            .unwrap();

        machine.update().unwrap();
        assert_eq!(machine.current_name(), "Lobby");
        assert_eq!(machine.stack_len(), 1);
    }
}
