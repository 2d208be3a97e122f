//! Shared handles passed to every agent component.

use courier_core::{AgentSettings, Configuration};
use courier_driver::AutomationDriver;
use std::sync::Arc;

/// Immutable configuration plus the single browser session.
///
/// Cloning is cheap; all clones refer to the same driver.
#[derive(Clone, derive_getters::Getters)]
pub struct AgentContext {
    config: Arc<Configuration>,
    settings: Arc<AgentSettings>,
    driver: Arc<dyn AutomationDriver>,
}

impl AgentContext {
    /// Bundle the configuration, settings and driver.
    pub fn new(
        config: Configuration,
        settings: AgentSettings,
        driver: Arc<dyn AutomationDriver>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            settings: Arc::new(settings),
            driver,
        }
    }
}

impl std::fmt::Debug for AgentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentContext")
            .field("config", &self.config)
            .field("settings", &self.settings)
            .field("driver", &self.driver.driver_name())
            .finish()
    }
}
