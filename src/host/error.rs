use std::io;

use crate::editor::EditError;
use crate::image::CodecError;
use crate::menu::MenuError;

use super::NoticeLevel;

/// Why an action did not complete.
///
/// None of these are fatal: the action aborts, the buffer is left as it was,
/// and the toolbar reports the condition.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The host did not provide a capability the action needs.
    #[error("host capability unavailable: {0}")]
    MissingCapability(&'static str),
    /// The action needs selected text.
    #[error("select some text first")]
    EmptySelection,
    /// The action found nothing to act on.
    #[error("{0}")]
    NoTarget(String),
    /// Load was requested but no draft has been saved.
    #[error("No draft found.")]
    NoStoredDraft,
    /// A menu entry points at an action the plugin never bound.
    #[error("action {0} has no handler")]
    Unbound(String),
    #[error(transparent)]
    Menu(#[from] MenuError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ActionError {
    /// How the condition is shown to the user.
    pub const fn level(&self) -> NoticeLevel {
        match self {
            Self::EmptySelection | Self::NoTarget(_) | Self::NoStoredDraft => NoticeLevel::Warning,
            _ => NoticeLevel::Error,
        }
    }
}

impl From<EditError> for ActionError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::EmptySelection => Self::EmptySelection,
            EditError::NoMarker { .. } => Self::NoTarget(err.to_string()),
        }
    }
}
