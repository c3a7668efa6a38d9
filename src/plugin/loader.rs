use crate::host::{ActionError, EditorContext};
use crate::perf::{self, Event};

use super::{ActionSet, PluginRegistry, RegistryError};

/// Why a plugin module could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("no plugin module named {0:?}")]
    NotFound(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("module {module} failed to load: {reason}")]
    Failed { module: String, reason: String },
}

/// Turns module identifiers into registered plugins.
pub trait ModuleResolver {
    /// Run module `id`, registering whatever plugins it provides.
    ///
    /// # Errors
    /// Fails when the module is unknown or its registration fails.
    fn load(&self, id: &str, registry: &mut PluginRegistry) -> Result<(), LoadError>;
}

/// A plugin whose `setup` succeeded, with the actions it contributed.
#[derive(Debug)]
pub struct SetUpPlugin {
    pub name: String,
    pub actions: ActionSet,
}

/// Outcome of one [`PluginLoader::load_all`] run.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Module ids that loaded, in order.
    pub loaded: Vec<String>,
    /// Module ids that failed, with the reason.
    pub failed: Vec<(String, LoadError)>,
    /// Names of the plugins set up during this run, in registration order.
    pub set_up: Vec<String>,
    /// Plugins whose setup failed, with the reason.
    pub setup_failed: Vec<(String, ActionError)>,
    /// The set-up plugins themselves, for the host to take.
    pub plugins: Vec<SetUpPlugin>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.setup_failed.is_empty()
    }
}

/// Loads plugin modules into a registry it owns, then sets the plugins up.
///
/// Every module in a run is attempted before any `setup` is called. A module
/// that fails leaves the registry as it was; the others still load. Each
/// registered plugin is set up at most once, however many runs there are.
#[derive(Debug, Default)]
pub struct PluginLoader {
    registry: PluginRegistry,
    set_up: usize,
}

impl PluginLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Load `ids` in order, then set up every plugin not yet set up.
    pub fn load_all<I, S>(
        &mut self,
        resolver: &dyn ModuleResolver,
        ids: I,
        ctx: &mut EditorContext,
    ) -> LoadReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let _scope = perf::scope("plugins.load_all");
        let mut report = LoadReport::default();

        for id in ids {
            let id = id.as_ref();
            match self.load_one(resolver, id) {
                Ok(()) => {
                    perf::record(Event::ModuleLoaded { module: id });
                    report.loaded.push(id.to_string());
                }
                Err(err) => {
                    tracing::error!(module = id, error = %err, "plugin module failed to load");
                    perf::record(Event::ModuleFailed {
                        module: id,
                        reason: &err.to_string(),
                    });
                    report.failed.push((id.to_string(), err));
                }
            }
        }

        while let Some(plugin) = self.registry.get(self.set_up) {
            self.set_up += 1;
            let name = plugin.name().to_string();
            match plugin.setup(ctx) {
                Ok(actions) => {
                    tracing::debug!(plugin = %name, "plugin set up");
                    perf::record(Event::PluginSetUp { plugin: &name });
                    report.set_up.push(name.clone());
                    report.plugins.push(SetUpPlugin { name, actions });
                }
                Err(err) => {
                    tracing::error!(plugin = %name, error = %err, "plugin setup failed");
                    perf::record(Event::SetupFailed {
                        plugin: &name,
                        reason: &err.to_string(),
                    });
                    report.setup_failed.push((name, err));
                }
            }
        }

        report
    }

    fn load_one(&mut self, resolver: &dyn ModuleResolver, id: &str) -> Result<(), LoadError> {
        let mut staged = PluginRegistry::new();
        resolver.load(id, &mut staged)?;
        self.registry.append(staged)?;
        Ok(())
    }
}
