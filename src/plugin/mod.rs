//! Plugin registration and loading.
//!
//! A plugin module is identified by a string id. A [`ModuleResolver`] runs
//! the module, which registers one or more [`Plugin`]s; the [`PluginLoader`]
//! then calls each plugin's [`Plugin::setup`] once, collecting the
//! [`ActionSet`] it contributes to the toolbar.

mod action;
mod loader;
mod registry;

pub use action::{ActionSet, ActionSetBuilder, Handler};
pub use loader::{LoadError, LoadReport, ModuleResolver, PluginLoader, SetUpPlugin};
pub use registry::{PluginRegistry, RegistryError};

use crate::host::{ActionError, EditorContext};

/// A toolbar plugin.
pub trait Plugin {
    /// Unique name within a registry.
    fn name(&self) -> &str;

    /// Build this plugin's menus and handlers against `ctx`.
    ///
    /// # Errors
    /// A failing setup is reported; the plugin contributes nothing.
    fn setup(&self, ctx: &mut EditorContext) -> Result<ActionSet, ActionError>;
}
