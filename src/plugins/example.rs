//! Replaces the buffer with a sample document covering Markdown and math.

use crate::editor::Selection;
use crate::host::{ActionError, EditorContext};
use crate::menu::{MenuNode, MenuTree};
use crate::plugin::{ActionSet, Plugin};

pub const NAME: &str = "example";

pub const SAMPLE: &str = r#"# Markdown and MathJax Example

This is an example demonstrating **Markdown** formatting and MathJax for mathematical equations.

## Basic Markdown

* **Bold Text**: **bold** or __bold__
* *Italic Text*: *italic* or _italic_
* `Monospace Code`: `inline code`
* ~~Strikethrough~~: ~~strikethrough~~

## Code Blocks

Inline code can be highlighted. For example: `console.log("Hello, World!")`.

```javascript
function helloWorld() {
    console.log("Hello, World!")
}
helloWorld();
```

## Mathematics

Here's an inline equation using single dollar signs: $E=mc^2$.

And a display equation using double dollar signs:
$$
\int_0^\infty e^{-x^2} dx = \frac{\sqrt{\pi}}{2}
$$

Another common formula:
$$
a^2 + b^2 = c^2
$$

Enjoy editing!"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct Example;

impl Plugin for Example {
    fn name(&self) -> &str {
        NAME
    }

    fn setup(&self, _ctx: &mut EditorContext) -> Result<ActionSet, ActionError> {
        let menu = MenuTree::single(vec![MenuNode::action("📝 Insert Example", "insert")])?;
        ActionSet::builder(menu)
            .on("insert", |ctx| {
                ctx.set_content(SAMPLE)?;
                ctx.set_selection(Selection::caret(SAMPLE.len()));
                Ok(())
            })
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ComrakRenderer;

    #[test]
    fn test_insert_example_replaces_buffer() {
        let renderer = ComrakRenderer::new();
        let mut ctx = EditorContext::new()
            .with_content("old")
            .with_renderer(renderer.clone());
        let set = Example.setup(&mut ctx).unwrap();
        set.handler(&"insert".into()).unwrap()(&mut ctx).unwrap();

        assert_eq!(ctx.content(), SAMPLE);
        assert_eq!(ctx.selection(), Selection::caret(SAMPLE.len()));
        let html = renderer.html();
        assert!(html.contains("<h1>Markdown and MathJax Example</h1>"));
        assert!(html.contains("<h2>Code Blocks</h2>"));
        assert!(html.contains("<del>Strikethrough</del>"));
        assert!(SAMPLE.contains(r"\int_0^\infty e^{-x^2} dx"));
        assert!(SAMPLE.ends_with("Enjoy editing!"));
    }
}
