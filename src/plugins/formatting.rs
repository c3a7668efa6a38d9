//! Formatting toolbar: inline styles, headings, math templates, images.

use crate::editor::{
    Alignment, insert_at_cursor, line_bounds, prefix_current_line, wrap_line_containing_marker,
    wrap_selection,
};
use crate::host::{ActionError, EditorContext, NoticeLevel};
use crate::image::IMAGE_MARKERS;
use crate::menu::{MenuId, MenuNode, MenuTree};
use crate::plugin::{ActionSet, Plugin};

pub const NAME: &str = "formatting";

const BLOCK_MATH: &str = "$$\n\\int_0^1 x dx\n$$";
const INLINE_INTEGRAL: &str = "$\\int x dx$";

const HELP: &str = "Editor Shortcuts:
• Bold: Select → Bold
• Inline math: $E=mc^2$
• Block math: $$\\int_0^1 x dx$$
• Images: 🖼️ Images → Insert Image, then align the nearest image above the cursor
• Use '🔗 Preview' to view rendered output";

#[derive(Debug, Clone, Copy, Default)]
pub struct Formatting;

impl Plugin for Formatting {
    fn name(&self) -> &str {
        NAME
    }

    fn setup(&self, _ctx: &mut EditorContext) -> Result<ActionSet, ActionError> {
        let math = MenuId::new("math")?;
        let images = MenuId::new("images")?;
        let menu = MenuTree::builder()
            .menu(
                MenuId::main(),
                vec![
                    MenuNode::action("Bold", "bold"),
                    MenuNode::action("Italic", "italic"),
                    MenuNode::action("Heading", "heading"),
                    MenuNode::submenu("∑ Math", math.clone()),
                    MenuNode::submenu("🖼️ Images", images.clone()),
                    MenuNode::action("❔ Help", "help"),
                ],
            )
            .menu(
                math,
                vec![
                    MenuNode::action("Inline $x$", "inline-math"),
                    MenuNode::action("Block $$...$$", "block-math"),
                    MenuNode::action("∫ Insert Math", "insert-math"),
                    MenuNode::back(),
                ],
            )
            .menu(
                images,
                vec![
                    MenuNode::action("Insert Image", "insert-image"),
                    MenuNode::action("Image Left", "image-left"),
                    MenuNode::action("Image Center", "image-center"),
                    MenuNode::action("Image Right", "image-right"),
                    MenuNode::back(),
                ],
            )
            .build()?;

        ActionSet::builder(menu)
            .on("bold", |ctx| wrap(ctx, "**", "**"))
            .on("italic", |ctx| wrap(ctx, "*", "*"))
            .on("heading", |ctx| {
                let edit = prefix_current_line(ctx.content(), ctx.selection(), "# ");
                ctx.apply(edit)
            })
            .on("inline-math", |ctx| wrap(ctx, "$", "$"))
            .on("block-math", |ctx| {
                let edit = insert_at_cursor(ctx.content(), ctx.selection(), BLOCK_MATH);
                ctx.apply(edit)
            })
            .on("insert-math", |ctx| {
                let edit = insert_at_cursor(ctx.content(), ctx.selection(), INLINE_INTEGRAL);
                ctx.apply(edit)
            })
            .on("help", |ctx| {
                ctx.notify(NoticeLevel::Info, HELP);
                Ok(())
            })
            .on("insert-image", insert_image)
            .on("image-left", |ctx| align_image(ctx, Alignment::Left))
            .on("image-center", |ctx| align_image(ctx, Alignment::Center))
            .on("image-right", |ctx| align_image(ctx, Alignment::Right))
            .build()
    }
}

fn wrap(ctx: &mut EditorContext, prefix: &str, suffix: &str) -> Result<(), ActionError> {
    let edit = wrap_selection(ctx.content(), ctx.selection(), prefix, suffix);
    ctx.apply(edit)
}

fn align_image(ctx: &mut EditorContext, align: Alignment) -> Result<(), ActionError> {
    let edit = wrap_line_containing_marker(ctx.content(), ctx.selection(), IMAGE_MARKERS, align)?;
    ctx.apply(edit)
}

/// Take the next image from the host's picker and insert its label on a line
/// of its own. The payload lives in the image map until the document is saved.
fn insert_image(ctx: &mut EditorContext) -> Result<(), ActionError> {
    if !ctx.has_renderer() {
        return Err(ActionError::MissingCapability("render"));
    }
    let bytes = ctx
        .image_source()?
        .next_image()?
        .ok_or_else(|| ActionError::NoTarget("No image chosen.".to_string()))?;

    let placeholder = ctx.images().encode(&bytes);
    tracing::debug!(label = %placeholder.label, bytes = bytes.len(), "image inserted");

    let selection = ctx.selection();
    let line = line_bounds(ctx.content(), selection.start);
    let mut text = String::new();
    if selection.start > line.start {
        text.push('\n');
    }
    text.push_str(&placeholder.label.token());
    if !ctx.content()[selection.end..].starts_with('\n') {
        text.push('\n');
    }
    let edit = insert_at_cursor(ctx.content(), selection, &text);
    ctx.apply(edit)
}
