//! The editing host: the context plugins work against, the capabilities it
//! may offer, and a headless [`Session`] that drives everything.

mod capabilities;
mod context;
mod error;
mod notice;
mod preview;
mod render;
mod session;

pub use capabilities::{
    DirExporter, DraftStore, Exporter, FileDraftStore, ImageSource, MemoryDraftStore, Previewer,
    PrintPreviewer, QueuedImages, RecordingPreviewer, Renderer, SystemPreviewer,
};
pub use context::EditorContext;
pub use error::ActionError;
pub use notice::{Notice, NoticeLevel};
pub use preview::{FragmentError, decode_fragment, encode_component, preview_url};
pub use render::ComrakRenderer;
pub use session::Session;

/// Storage key of the persisted draft.
pub const DRAFT_KEY: &str = "markdownDraft";

/// File name offered by Export.
pub const EXPORT_FILE_NAME: &str = "draft.md";

/// Default address of the companion preview view.
pub const PREVIEW_BASE: &str = "preview.html";
