//! Built-in plugin modules and the catalog that resolves them by id.

mod align;
mod drafts;
mod example;
mod formatting;

pub use align::Align;
pub use drafts::DraftToolbar;
pub use example::{Example, SAMPLE};
pub use formatting::Formatting;

use crate::plugin::{LoadError, ModuleResolver, Plugin, PluginRegistry};

/// Module ids loaded when nothing else is configured.
pub const DEFAULT_MODULES: &[&str] = &[drafts::NAME, formatting::NAME];

type Register = Box<dyn Fn(&mut PluginRegistry) -> Result<(), LoadError>>;

/// Module id → registration function.
///
/// Starts with the built-in modules; hosts and tests can add more or replace
/// one under the same id.
pub struct BuiltinModules {
    modules: Vec<(String, Register)>,
}

impl BuiltinModules {
    /// The built-in catalog: `toolbar`, `formatting` (also `enhanced-toolbar`),
    /// `align` and `example`.
    pub fn new() -> Self {
        Self::empty()
            .with_plugin(drafts::NAME, || DraftToolbar)
            .with_plugin(formatting::NAME, || Formatting)
            .with_plugin("enhanced-toolbar", || Formatting)
            .with_plugin(align::NAME, || Align)
            .with_plugin(example::NAME, || Example)
    }

    /// A catalog with no modules.
    pub fn empty() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Add module `id`, replacing any module already under that id.
    #[must_use]
    pub fn with_module<F>(mut self, id: impl Into<String>, register: F) -> Self
    where
        F: Fn(&mut PluginRegistry) -> Result<(), LoadError> + 'static,
    {
        let id = id.into();
        self.modules.retain(|(existing, _)| *existing != id);
        self.modules.push((id, Box::new(register)));
        self
    }

    /// Add module `id` registering the single plugin `make` builds.
    #[must_use]
    pub fn with_plugin<P, F>(self, id: impl Into<String>, make: F) -> Self
    where
        P: Plugin + 'static,
        F: Fn() -> P + 'static,
    {
        self.with_module(id, move |registry| {
            registry.register(Box::new(make()))?;
            Ok(())
        })
    }

    /// Module ids in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|(id, _)| id.as_str())
    }
}

impl Default for BuiltinModules {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BuiltinModules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

impl ModuleResolver for BuiltinModules {
    fn load(&self, id: &str, registry: &mut PluginRegistry) -> Result<(), LoadError> {
        let (_, register) = self
            .modules
            .iter()
            .find(|(name, _)| name == id)
            .ok_or_else(|| LoadError::NotFound(id.to_string()))?;
        register(registry)
    }
}
