//! Preview, Save, Load and Export.

use crate::host::{ActionError, DRAFT_KEY, EXPORT_FILE_NAME, EditorContext, NoticeLevel};
use crate::menu::{MenuNode, MenuTree};
use crate::plugin::{ActionSet, Plugin};

pub const NAME: &str = "toolbar";

/// Draft handling: preview handoff, persistence, and export.
#[derive(Debug, Clone, Copy, Default)]
pub struct DraftToolbar;

impl Plugin for DraftToolbar {
    fn name(&self) -> &str {
        NAME
    }

    fn setup(&self, _ctx: &mut EditorContext) -> Result<ActionSet, ActionError> {
        let menu = MenuTree::single(vec![
            MenuNode::action("🔗 Preview", "preview"),
            MenuNode::action("💾 Save", "save"),
            MenuNode::action("📂 Load", "load"),
            MenuNode::action("📄 Export", "export"),
        ])?;
        ActionSet::builder(menu)
            .on("preview", preview)
            .on("save", save)
            .on("load", load)
            .on("export", export)
            .build()
    }
}

fn preview(ctx: &mut EditorContext) -> Result<(), ActionError> {
    let document = ctx.document_with_images();
    ctx.previewer()?.open(&document)?;
    Ok(())
}

fn save(ctx: &mut EditorContext) -> Result<(), ActionError> {
    let document = ctx.document_with_images();
    ctx.drafts()?.store(DRAFT_KEY, &document)?;
    ctx.notify(NoticeLevel::Info, "Saved!");
    Ok(())
}

fn load(ctx: &mut EditorContext) -> Result<(), ActionError> {
    if !ctx.has_renderer() {
        return Err(ActionError::MissingCapability("render"));
    }
    let draft = ctx
        .drafts()?
        .load(DRAFT_KEY)?
        .filter(|draft| !draft.is_empty())
        .ok_or(ActionError::NoStoredDraft)?;
    ctx.load_document(&draft)
}

fn export(ctx: &mut EditorContext) -> Result<(), ActionError> {
    let document = ctx.document_with_images();
    let path = ctx.exporter()?.export(EXPORT_FILE_NAME, &document)?;
    ctx.notify(NoticeLevel::Info, format!("Exported {}", path.display()));
    Ok(())
}
