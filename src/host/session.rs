use crate::menu::MenuError;
use crate::plugin::{LoadReport, ModuleResolver, PluginLoader};
use crate::toolbar::{Pressed, Toolbar, ToolbarEntry};

use super::{ActionError, EditorContext, Notice};

/// A headless editor host: one context, the plugins loaded into it, and the
/// toolbar their actions live on. Created fresh per editing session.
#[derive(Debug)]
pub struct Session {
    ctx: EditorContext,
    loader: PluginLoader,
    toolbar: Toolbar,
}

impl Session {
    pub fn new(ctx: EditorContext) -> Self {
        Self {
            ctx,
            loader: PluginLoader::new(),
            toolbar: Toolbar::new(),
        }
    }

    /// Load plugin modules and add every newly set-up plugin to the toolbar.
    pub fn load_plugins<I, S>(&mut self, resolver: &dyn ModuleResolver, ids: I) -> LoadReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = self.loader.load_all(resolver, ids, &mut self.ctx);
        for plugin in std::mem::take(&mut report.plugins) {
            self.toolbar.add(plugin);
        }
        report
    }

    /// Press a toolbar entry by label.
    ///
    /// # Errors
    /// Fails if no entry of the current menus has that label.
    pub fn press(&mut self, label: &str) -> Result<Pressed, MenuError> {
        self.toolbar.press(label, &mut self.ctx)
    }

    /// Select a rendered toolbar entry.
    ///
    /// # Errors
    /// Fails for stale or unknown entries.
    pub fn select(&mut self, entry: &ToolbarEntry) -> Result<Pressed, MenuError> {
        self.toolbar.select(entry, &mut self.ctx)
    }

    /// Open a persisted document (image payloads are split off into the map).
    ///
    /// # Errors
    /// Fails when the context has no renderer.
    pub fn open_document(&mut self, raw: &str) -> Result<(), ActionError> {
        self.ctx.load_document(raw)
    }

    /// The document to persist, with image payloads embedded.
    pub fn saved_document(&self) -> String {
        self.ctx.document_with_images()
    }

    pub const fn context(&self) -> &EditorContext {
        &self.ctx
    }

    pub const fn context_mut(&mut self) -> &mut EditorContext {
        &mut self.ctx
    }

    pub const fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.ctx.take_notices()
    }
}
