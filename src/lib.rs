// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. menu::MenuTree)
    clippy::module_name_repetitions
)]

//! # Markbar
//!
//! A Markdown editing core extended by toolbar plugins.
//!
//! A host owns the buffer and hands plugins an [`host::EditorContext`];
//! plugins contribute menus of actions that edit the buffer through it.
//!
//! ## Modules
//!
//! - [`editor`]: selection-aware buffer operations
//! - [`image`]: image placeholders and the label → payload map
//! - [`menu`]: validated menu trees and the menu state machine
//! - [`plugin`]: plugin registry and loader
//! - [`plugins`]: the built-in plugin modules
//! - [`toolbar`]: dispatch across every plugin's menu
//! - [`host`]: the editing context, host capabilities and a headless session
//! - [`config`]: flag files and flag merging
//! - [`perf`]: timing scopes and the debug event log

pub mod config;
pub mod editor;
pub mod host;
pub mod image;
pub mod menu;
pub mod perf;
pub mod plugin;
pub mod plugins;
pub mod toolbar;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::editor::{Edit, Selection};
    pub use crate::host::{ActionError, EditorContext, Notice, NoticeLevel, Session};
    pub use crate::menu::{Menu, MenuId, MenuNode, MenuTree};
    pub use crate::plugin::{ActionSet, ModuleResolver, Plugin, PluginLoader, PluginRegistry};
    pub use crate::plugins::BuiltinModules;
    pub use crate::toolbar::{Pressed, Toolbar};
}
