use std::collections::HashSet;

use super::Plugin;

/// Errors registering plugins.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("a plugin named {0:?} is already registered")]
    Duplicate(String),
}

/// Ordered list of registered plugins. Names are unique.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin.
    ///
    /// # Errors
    /// Rejects a plugin whose name is already registered.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> Result<(), RegistryError> {
        if self.contains(plugin.name()) {
            return Err(RegistryError::Duplicate(plugin.name().to_string()));
        }
        tracing::debug!(plugin = plugin.name(), "plugin registered");
        self.plugins.push(plugin);
        Ok(())
    }

    /// Move every plugin of `other` to the end of this registry, keeping
    /// their order. Nothing is moved if any name clashes.
    ///
    /// # Errors
    /// Rejects the whole batch on the first clashing name.
    pub fn append(&mut self, other: Self) -> Result<(), RegistryError> {
        let mut names: HashSet<&str> = self.names().collect();
        for plugin in &other.plugins {
            if !names.insert(plugin.name()) {
                return Err(RegistryError::Duplicate(plugin.name().to_string()));
            }
        }
        self.plugins.extend(other.plugins);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    pub fn get(&self, index: usize) -> Option<&dyn Plugin> {
        self.plugins.get(index).map(Box::as_ref)
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.name())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
