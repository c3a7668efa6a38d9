//! The toolbar: one section per set-up plugin, each with its own menu state.

use std::collections::HashMap;

use crate::host::{ActionError, EditorContext};
use crate::menu::{ActionKey, Dispatch, EntryKind, Menu, MenuEntry, MenuError, MenuId};
use crate::perf::{self, Event};
use crate::plugin::{Handler, SetUpPlugin};

struct Section {
    plugin: String,
    menu: Menu,
    handlers: HashMap<ActionKey, Handler>,
}

/// A rendered toolbar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarEntry {
    pub plugin: String,
    pub menu: MenuId,
    pub entry: MenuEntry,
}

impl ToolbarEntry {
    /// Whether selecting this entry switches menus.
    pub fn is_transition(&self) -> bool {
        self.entry.kind == EntryKind::Transition
    }
}

/// What pressing an entry did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pressed {
    /// The action ran to completion.
    Ran { plugin: String, action: ActionKey },
    /// The plugin's menu switched.
    Switched { plugin: String, menu: MenuId },
    /// The action aborted; a notice says why.
    Aborted { plugin: String, action: ActionKey },
}

#[derive(Default)]
pub struct Toolbar {
    sections: Vec<Section>,
}

impl Toolbar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a set-up plugin's section at the end.
    pub fn add(&mut self, plugin: SetUpPlugin) {
        let (tree, handlers) = plugin.actions.into_parts();
        self.sections.push(Section {
            plugin: plugin.name,
            menu: Menu::new(tree),
            handlers,
        });
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn plugins(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.plugin.as_str())
    }

    /// The current menu of `plugin`'s section.
    pub fn current_menu(&self, plugin: &str) -> Option<&MenuId> {
        self.section(plugin).map(|s| s.menu.current())
    }

    /// Every section's current menu, rendered fresh.
    pub fn entries(&self) -> Vec<ToolbarEntry> {
        self.sections
            .iter()
            .flat_map(|section| {
                section.menu.entries().into_iter().map(|entry| ToolbarEntry {
                    plugin: section.plugin.clone(),
                    menu: section.menu.current().clone(),
                    entry,
                })
            })
            .collect()
    }

    /// Press the first entry whose label matches, searching sections in
    /// order. An exact label wins; otherwise the label with its leading icon
    /// dropped is compared case-insensitively, so `save` finds `💾 Save`.
    ///
    /// # Errors
    /// Fails if no current entry matches.
    pub fn press(&mut self, label: &str, ctx: &mut EditorContext) -> Result<Pressed, MenuError> {
        let entries = self.entries();
        let found = entries
            .iter()
            .find(|e| e.entry.label == label)
            .or_else(|| entries.iter().find(|e| loose_match(&e.entry.label, label)))
            .ok_or_else(|| MenuError::NoSuchLabel(label.to_string()))?;
        self.select(found, ctx)
    }

    /// Select a rendered entry.
    ///
    /// # Errors
    /// Fails for entries of an unknown plugin or from an earlier rendering.
    pub fn select(
        &mut self,
        entry: &ToolbarEntry,
        ctx: &mut EditorContext,
    ) -> Result<Pressed, MenuError> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.plugin == entry.plugin)
            .ok_or_else(|| MenuError::NoSuchLabel(entry.entry.label.clone()))?;

        match section.menu.select(&entry.entry)? {
            Dispatch::Switched(menu) => {
                perf::record(Event::MenuSwitched {
                    plugin: &section.plugin,
                    menu: menu.as_str(),
                });
                Ok(Pressed::Switched {
                    plugin: section.plugin.clone(),
                    menu,
                })
            }
            Dispatch::Invoke(action) => {
                let _scope = perf::scope("toolbar.action");
                tracing::debug!(plugin = %section.plugin, action = %action, "dispatch");
                let result = section
                    .handlers
                    .get(&action)
                    .map_or_else(|| Err(ActionError::Unbound(action.to_string())), |h| h(ctx));
                let plugin = section.plugin.clone();
                match result {
                    Ok(()) => {
                        perf::record(Event::ActionRan {
                            plugin: &plugin,
                            action: action.as_str(),
                        });
                        Ok(Pressed::Ran { plugin, action })
                    }
                    Err(err) => {
                        report(ctx, &plugin, &action, &err);
                        Ok(Pressed::Aborted { plugin, action })
                    }
                }
            }
        }
    }

    fn section(&self, plugin: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.plugin == plugin)
    }
}

impl std::fmt::Debug for Toolbar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.sections.iter().map(|s| (&s.plugin, s.menu.current())))
            .finish()
    }
}

fn report(ctx: &mut EditorContext, plugin: &str, action: &ActionKey, err: &ActionError) {
    if matches!(err, ActionError::MissingCapability(_)) {
        tracing::warn!(plugin, action = %action, error = %err, "action aborted");
    } else {
        tracing::debug!(plugin, action = %action, error = %err, "action aborted");
    }
    perf::record(Event::ActionAborted {
        plugin,
        action: action.as_str(),
        reason: &err.to_string(),
    });
    ctx.notify(err.level(), err.to_string());
}

fn loose_match(label: &str, query: &str) -> bool {
    label
        .split_once(' ')
        .filter(|(icon, _)| !icon.chars().any(char::is_alphanumeric))
        .is_some_and(|(_, rest)| rest.eq_ignore_ascii_case(query))
}
