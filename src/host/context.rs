use std::sync::Arc;

use crate::editor::{Edit, Selection};
use crate::image::{self, ImageMap, ImageStore};

use super::{
    ActionError, DraftStore, Exporter, ImageSource, Notice, NoticeLevel, Previewer, Renderer,
};

/// The editing context handed to every plugin.
///
/// It owns the buffer and selection and mediates all access to them: plugins
/// read through it and request replacements through it, never holding a copy
/// across dispatch turns. Host capabilities are optional and checked at use.
#[derive(Default)]
pub struct EditorContext {
    content: String,
    selection: Selection,
    images: ImageStore,
    renderer: Option<Box<dyn Renderer>>,
    drafts: Option<Box<dyn DraftStore>>,
    exporter: Option<Box<dyn Exporter>>,
    previewer: Option<Box<dyn Previewer>>,
    image_source: Option<Box<dyn ImageSource>>,
    notices: Vec<Notice>,
}

impl EditorContext {
    /// A context with an empty buffer and no capabilities.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self.selection = Selection::caret(self.content.len());
        self
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    #[must_use]
    pub fn with_drafts(mut self, drafts: impl DraftStore + 'static) -> Self {
        self.drafts = Some(Box::new(drafts));
        self
    }

    #[must_use]
    pub fn with_exporter(mut self, exporter: impl Exporter + 'static) -> Self {
        self.exporter = Some(Box::new(exporter));
        self
    }

    #[must_use]
    pub fn with_previewer(mut self, previewer: impl Previewer + 'static) -> Self {
        self.previewer = Some(Box::new(previewer));
        self
    }

    #[must_use]
    pub fn with_image_source(mut self, source: impl ImageSource + 'static) -> Self {
        self.image_source = Some(Box::new(source));
        self
    }

    #[must_use]
    pub fn with_images(mut self, images: ImageStore) -> Self {
        self.images = images;
        self
    }

    // --- Buffer access ---

    /// The current buffer.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The current selection; always valid for [`content`](Self::content).
    pub const fn selection(&self) -> Selection {
        self.selection
    }

    /// The selected text.
    pub fn selected_text(&self) -> &str {
        &self.content[self.selection.range()]
    }

    /// Move the selection, clamped into the buffer.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.normalize(&self.content);
    }

    /// Replace the whole buffer and re-render.
    ///
    /// # Errors
    /// Aborts with the buffer untouched when the host has no renderer.
    pub fn set_content(&mut self, content: impl Into<String>) -> Result<(), ActionError> {
        self.require_renderer()?;
        self.content = content.into();
        self.selection = self.selection.normalize(&self.content);
        self.render()
    }

    /// Apply an edit (buffer and selection) and re-render in the same turn.
    ///
    /// # Errors
    /// Aborts with the buffer untouched when the host has no renderer.
    pub fn apply(&mut self, edit: Edit) -> Result<(), ActionError> {
        self.require_renderer()?;
        self.content = edit.text;
        self.selection = edit.selection.normalize(&self.content);
        self.render()
    }

    /// Render the current buffer.
    ///
    /// # Errors
    /// Fails when the host has no renderer.
    pub fn render(&mut self) -> Result<(), ActionError> {
        let images = self.images.snapshot();
        let Some(renderer) = self.renderer.as_deref_mut() else {
            return Err(ActionError::MissingCapability("render"));
        };
        renderer.render(&self.content, &images);
        Ok(())
    }

    // --- Images ---

    /// The session's image map.
    pub const fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Load a persisted document: strip payload lines, swap in the rebuilt
    /// image map, then show the cleaned buffer.
    ///
    /// # Errors
    /// Aborts with buffer and image map untouched when the host has no renderer.
    pub fn load_document(&mut self, raw: &str) -> Result<(), ActionError> {
        self.require_renderer()?;
        let decoded = image::decode(raw);
        tracing::debug!(images = decoded.images.len(), "document loaded");
        self.images.replace(decoded.images);
        self.selection = Selection::caret(0);
        self.set_content(decoded.text)
    }

    /// The buffer as it should be persisted, with image payloads embedded.
    pub fn document_with_images(&self) -> String {
        image::embed(&self.content, &self.images.snapshot())
    }

    /// Snapshot of the image map.
    pub fn image_map(&self) -> Arc<ImageMap> {
        self.images.snapshot()
    }

    // --- Capabilities ---

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// # Errors
    /// Fails when the host provides no draft store.
    pub fn drafts(&mut self) -> Result<&mut dyn DraftStore, ActionError> {
        match self.drafts.as_deref_mut() {
            Some(drafts) => Ok(drafts),
            None => Err(ActionError::MissingCapability("draft store")),
        }
    }

    /// # Errors
    /// Fails when the host provides no exporter.
    pub fn exporter(&mut self) -> Result<&mut dyn Exporter, ActionError> {
        match self.exporter.as_deref_mut() {
            Some(exporter) => Ok(exporter),
            None => Err(ActionError::MissingCapability("export")),
        }
    }

    /// # Errors
    /// Fails when the host provides no preview handoff.
    pub fn previewer(&mut self) -> Result<&mut dyn Previewer, ActionError> {
        match self.previewer.as_deref_mut() {
            Some(previewer) => Ok(previewer),
            None => Err(ActionError::MissingCapability("preview")),
        }
    }

    /// # Errors
    /// Fails when the host provides no image picker.
    pub fn image_source(&mut self) -> Result<&mut dyn ImageSource, ActionError> {
        match self.image_source.as_deref_mut() {
            Some(image_source) => Ok(image_source),
            None => Err(ActionError::MissingCapability("image picker")),
        }
    }

    fn require_renderer(&self) -> Result<(), ActionError> {
        if self.renderer.is_none() {
            return Err(ActionError::MissingCapability("render"));
        }
        Ok(())
    }

    // --- Notices ---

    /// Raise a notice for the user.
    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    /// Notices raised so far.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drain the pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

impl std::fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorContext")
            .field("content", &format_args!("{} bytes", self.content.len()))
            .field("selection", &self.selection)
            .field("images", &self.images.len())
            .field("renderer", &self.renderer.is_some())
            .field("drafts", &self.drafts.is_some())
            .field("exporter", &self.exporter.is_some())
            .field("previewer", &self.previewer.is_some())
            .field("image_source", &self.image_source.is_some())
            .field("notices", &self.notices.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::wrap_selection;
    use crate::host::{ComrakRenderer, MemoryDraftStore};

    #[test]
    fn test_apply_without_renderer_leaves_buffer() {
        let mut ctx = EditorContext::new().with_content("hello");
        ctx.set_selection(Selection::new(0, 5));
        let edit = wrap_selection(ctx.content(), ctx.selection(), "**", "**");

        let err = ctx.apply(edit).unwrap_err();
        assert!(matches!(err, ActionError::MissingCapability("render")));
        assert_eq!(ctx.content(), "hello");
        assert_eq!(ctx.selection(), Selection::new(0, 5));
    }

    #[test]
    fn test_apply_updates_buffer_selection_and_renders() {
        let renderer = ComrakRenderer::new();
        let mut ctx = EditorContext::new()
            .with_content("hello")
            .with_renderer(renderer.clone());
        ctx.set_selection(Selection::new(0, 5));
        let edit = wrap_selection(ctx.content(), ctx.selection(), "**", "**");
        ctx.apply(edit).unwrap();

        assert_eq!(ctx.content(), "**hello**");
        assert_eq!(ctx.selection(), Selection::caret(9));
        assert!(renderer.html().contains("<strong>hello</strong>"));
    }

    #[test]
    fn test_set_selection_is_clamped() {
        let mut ctx = EditorContext::new().with_content("abc");
        ctx.set_selection(Selection::new(1, 50));
        assert_eq!(ctx.selection(), Selection::new(1, 3));
        assert_eq!(ctx.selected_text(), "bc");
    }

    #[test]
    fn test_set_content_clamps_existing_selection() {
        let mut ctx = EditorContext::new()
            .with_content("a long buffer")
            .with_renderer(ComrakRenderer::new());
        ctx.set_content("ab").unwrap();
        assert_eq!(ctx.selection(), Selection::caret(2));
    }

    #[test]
    fn test_missing_capabilities_are_reported() {
        let mut ctx = EditorContext::new();
        assert!(matches!(ctx.drafts(), Err(ActionError::MissingCapability(_))));
        assert!(matches!(ctx.exporter(), Err(ActionError::MissingCapability(_))));
        assert!(matches!(ctx.previewer(), Err(ActionError::MissingCapability(_))));
        assert!(matches!(ctx.image_source(), Err(ActionError::MissingCapability(_))));

        let mut ctx = EditorContext::new().with_drafts(MemoryDraftStore::new());
        assert!(ctx.drafts().is_ok());
    }

    #[test]
    fn test_load_document_swaps_image_map_and_strips_payloads() {
        let mut ctx = EditorContext::new().with_renderer(ComrakRenderer::new());
        ctx.images().encode(b"stale");
        ctx.images().encode(b"stale too");

        let mut fresh = ImageMap::new();
        let placeholder = image::encode(&mut fresh, b"new");
        let raw = format!("# Doc\n{}\n", placeholder.text);
        ctx.load_document(&raw).unwrap();

        assert_eq!(ctx.content(), "# Doc\n🖼️[Image 1]\n");
        assert_eq!(*ctx.image_map(), fresh);
        assert_eq!(ctx.document_with_images(), raw);
    }

    #[test]
    fn test_notices_drain() {
        let mut ctx = EditorContext::new();
        ctx.notify(NoticeLevel::Info, "Saved!");
        assert_eq!(ctx.notices().len(), 1);
        let drained = ctx.take_notices();
        assert_eq!(drained[0].message, "Saved!");
        assert!(ctx.notices().is_empty());
    }
}
