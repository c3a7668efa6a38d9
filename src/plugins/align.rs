//! Text alignment, as inline tags on the selection or current line, or as a
//! block wrapper around the selection.

use crate::editor::{Alignment, align_selection, set_alignment};
use crate::host::{ActionError, EditorContext};
use crate::menu::{MenuId, MenuNode, MenuTree};
use crate::plugin::{ActionSet, Plugin};

pub const NAME: &str = "align";

#[derive(Debug, Clone, Copy, Default)]
pub struct Align;

impl Plugin for Align {
    fn name(&self) -> &str {
        NAME
    }

    fn setup(&self, _ctx: &mut EditorContext) -> Result<ActionSet, ActionError> {
        let block = MenuId::new("block")?;
        let menu = MenuTree::builder()
            .menu(
                MenuId::main(),
                vec![
                    MenuNode::action("Align Left", "left"),
                    MenuNode::action("Align Center", "center"),
                    MenuNode::action("Align Right", "right"),
                    MenuNode::action("Remove Alignment", "none"),
                    MenuNode::submenu("▤ Block", block.clone()),
                ],
            )
            .menu(
                block,
                vec![
                    MenuNode::action("Block Left", "block-left"),
                    MenuNode::action("Block Center", "block-center"),
                    MenuNode::action("Block Right", "block-right"),
                    MenuNode::back(),
                ],
            )
            .build()?;

        ActionSet::builder(menu)
            .on("left", |ctx| tag(ctx, Some(Alignment::Left)))
            .on("center", |ctx| tag(ctx, Some(Alignment::Center)))
            .on("right", |ctx| tag(ctx, Some(Alignment::Right)))
            .on("none", |ctx| tag(ctx, None))
            .on("block-left", |ctx| block_wrap(ctx, Alignment::Left))
            .on("block-center", |ctx| block_wrap(ctx, Alignment::Center))
            .on("block-right", |ctx| block_wrap(ctx, Alignment::Right))
            .build()
    }
}

fn tag(ctx: &mut EditorContext, align: Option<Alignment>) -> Result<(), ActionError> {
    let edit = set_alignment(ctx.content(), ctx.selection(), align);
    ctx.apply(edit)?;
    tracing::debug!(align = align.map_or("none", Alignment::as_str), "text aligned");
    Ok(())
}

fn block_wrap(ctx: &mut EditorContext, align: Alignment) -> Result<(), ActionError> {
    let edit = align_selection(ctx.content(), ctx.selection(), align)?;
    ctx.apply(edit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Selection;
    use crate::host::ComrakRenderer;

    fn context(content: &str) -> (EditorContext, ActionSet) {
        let mut ctx = EditorContext::new()
            .with_content(content)
            .with_renderer(ComrakRenderer::new());
        let set = Align.setup(&mut ctx).unwrap();
        (ctx, set)
    }

    fn run(set: &ActionSet, key: &str, ctx: &mut EditorContext) -> Result<(), ActionError> {
        set.handler(&key.into()).unwrap()(ctx)
    }

    #[test]
    fn test_center_current_line_then_realign() {
        let (mut ctx, set) = context("one\ntwo\nthree");
        ctx.set_selection(Selection::caret(5));
        run(&set, "center", &mut ctx).unwrap();
        assert_eq!(ctx.content(), "one\n<center>two</center>\nthree");

        ctx.set_selection(Selection::caret(6));
        run(&set, "right", &mut ctx).unwrap();
        assert_eq!(ctx.content(), "one\n<right>two</right>\nthree");

        run(&set, "none", &mut ctx).unwrap();
        assert_eq!(ctx.content(), "one\ntwo\nthree");
    }

    #[test]
    fn test_block_wrap_reselects_inner_text() {
        let (mut ctx, set) = context("a para");
        ctx.set_selection(Selection::new(2, 6));
        run(&set, "block-left", &mut ctx).unwrap();
        assert_eq!(
            ctx.content(),
            "a <div style=\"text-align: left;\">\npara\n</div>"
        );
        assert_eq!(ctx.selected_text(), "para");
    }

    #[test]
    fn test_block_wrap_needs_selection() {
        let (mut ctx, set) = context("a para");
        let err = run(&set, "block-center", &mut ctx).unwrap_err();
        assert!(matches!(err, ActionError::EmptySelection));
        assert_eq!(ctx.content(), "a para");
    }
}
