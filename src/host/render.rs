//! Markdown to HTML rendering with comrak.

use std::sync::{Arc, Mutex, MutexGuard};

use comrak::{Options, markdown_to_html};

use crate::image::{ImageMap, resolve_for_preview};

use super::Renderer;

/// Renders the buffer to HTML, resolving image placeholders first.
///
/// Clones share the output, so the host can keep a handle to read the latest
/// HTML while the context owns the renderer.
#[derive(Debug, Clone, Default)]
pub struct ComrakRenderer {
    output: Arc<Mutex<Rendered>>,
}

#[derive(Debug, Default)]
struct Rendered {
    html: String,
    count: usize,
}

impl ComrakRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// HTML from the most recent render.
    pub fn html(&self) -> String {
        self.lock().html.clone()
    }

    /// How many renders have happened.
    pub fn render_count(&self) -> usize {
        self.lock().count
    }

    fn lock(&self) -> MutexGuard<'_, Rendered> {
        match self.output.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Renderer for ComrakRenderer {
    fn render(&mut self, markdown: &str, images: &ImageMap) {
        let resolved = end_wrapper_blocks(&resolve_for_preview(markdown, images));
        let html = markdown_to_html(&resolved, &create_options());
        let mut out = self.lock();
        out.html = html;
        out.count += 1;
    }
}

/// Put a blank line after each closing `</div>` so an alignment wrapper's
/// HTML block ends there instead of running into the next paragraph.
fn end_wrapper_blocks(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut lines = markdown.split('\n').peekable();
    while let Some(line) = lines.next() {
        out.push_str(line);
        if let Some(next) = lines.peek() {
            out.push('\n');
            if line.trim() == "</div>" && !next.trim().is_empty() {
                out.push('\n');
            }
        }
    }
    out
}

fn create_options() -> Options {
    let mut options = Options::default();

    // GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;

    // Alignment wrappers and image placeholders are raw HTML
    options.render.unsafe_ = true;

    options
}
