//! Controller configuration.

use crate::builder::error::BuildError;
use crate::core::LoopGuard;
use serde::{Deserialize, Serialize};

/// Tunables for one controller.
///
/// Every field has a default, so a host can load a partial document:
///
/// ```rust
/// use phasestack::builder::ControllerConfig;
///
/// let config = ControllerConfig::from_json(r#"{ "name": "Battle", "queue_warning": 10 }"#).unwrap();
///
/// assert_eq!(config.domain(), "SM_Battle");
/// assert_eq!(config.queue_warning, 10);
/// assert_eq!(config.trace_limit, 20);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Title of the machine, for logging
    pub name: String,
    /// Number of transitions kept in the trace
    pub trace_limit: usize,
    /// Queue length at which an advance logs a warning
    pub queue_warning: usize,
    /// Advance and regress steps allowed within a single update
    pub max_steps_per_update: usize,
    pub loop_guard: LoopGuard,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            name: "Machine".to_string(),
            trace_limit: 20,
            queue_warning: 30,
            max_steps_per_update: 256,
            loop_guard: LoopGuard::default(),
        }
    }
}

impl ControllerConfig {
    /// Default configuration with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn domain(&self) -> String {
        format!("SM_{}", self.name)
    }

    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BuildError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the limits are usable together.
    pub fn validate(&self) -> Result<(), BuildError> {
        let guard = &self.loop_guard;
        if self.max_steps_per_update == 0 {
            return Err(BuildError::InvalidConfig(
                "max_steps_per_update must be at least 1".to_string(),
            ));
        }
        if guard.min_cycle == 0 || guard.min_cycle > guard.max_cycle {
            return Err(BuildError::InvalidConfig(format!(
                "loop guard cycle bounds {}..={} are empty",
                guard.min_cycle, guard.max_cycle
            )));
        }
        if guard.repeats < 2 {
            return Err(BuildError::InvalidConfig(
                "loop guard needs at least 2 repeats".to_string(),
            ));
        }
        // The guard also sees the exit code of the state being popped.
        let needed = guard.min_cycle.checked_mul(guard.repeats).ok_or_else(|| {
            BuildError::InvalidConfig(format!(
                "loop guard needs {} repeats of {} codes, more than any trace holds",
                guard.repeats, guard.min_cycle
            ))
        })?;
        if self.trace_limit.saturating_add(1) < needed {
            return Err(BuildError::InvalidConfig(format!(
                "trace_limit {} is too short for the loop guard (needs {})",
                self.trace_limit,
                needed - 1
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.domain(), "SM_Machine");
        assert_eq!(config.trace_limit, 20);
        assert_eq!(config.queue_warning, 30);
    }

    #[test]
    fn zero_step_limit_is_rejected() {
        let config = ControllerConfig {
            max_steps_per_update: 0,
            ..ControllerConfig::default()
        };
        assert!(matches!(config.validate(), Err(BuildError::InvalidConfig(_))));
    }

    #[test]
    fn inverted_cycle_bounds_are_rejected() {
        let config = ControllerConfig {
            loop_guard: LoopGuard {
                min_cycle: 4,
                max_cycle: 2,
                repeats: 3,
            },
            ..ControllerConfig::default()
        };
        assert!(matches!(config.validate(), Err(BuildError::InvalidConfig(_))));
    }

    #[test]
    fn short_trace_is_rejected() {
        let config = ControllerConfig {
            trace_limit: 4,
            ..ControllerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ControllerConfig {
            trace_limit: 5,
            ..ControllerConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn oversized_loop_guard_is_rejected() {
        let result =
            ControllerConfig::from_json(r#"{ "loop_guard": { "repeats": 18446744073709551615 } }"#);
        assert!(matches!(result, Err(BuildError::InvalidConfig(_))));

        let config = ControllerConfig {
            trace_limit: usize::MAX,
            ..ControllerConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = ControllerConfig::from_json("{ \"trace_limit\": \"many\" }");
        assert!(matches!(result, Err(BuildError::ConfigParse(_))));
    }

    #[test]
    fn nested_loop_guard_loads() {
        let config =
            ControllerConfig::from_json(r#"{ "loop_guard": { "repeats": 4 } }"#).unwrap();
        assert_eq!(config.loop_guard.repeats, 4);
        assert_eq!(config.loop_guard.max_cycle, 5);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ControllerConfig::named("Menus");
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ControllerConfig::from_json(&json).unwrap(), config);
    }
}
