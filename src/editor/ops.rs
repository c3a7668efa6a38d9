use std::fmt;
use std::ops::Range;

use super::Selection;

/// Result of a buffer operation: the new buffer and a selection valid for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// The full buffer after the edit.
    pub text: String,
    /// Selection into `text` (not into the pre-edit buffer).
    pub selection: Selection,
}

/// Errors reported by buffer operations that had nothing to act on.
///
/// These are never fatal; the caller leaves the buffer untouched and tells the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// No line at or above the cursor contains any of the markers.
    #[error("no line containing {markers} found above the cursor")]
    NoMarker { markers: String },
    /// The operation needs selected text but the selection is blank.
    #[error("no text selected")]
    EmptySelection,
}

/// Horizontal alignment applied by the alignment wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    pub const ALL: [Self; 3] = [Self::Left, Self::Center, Self::Right];

    /// CSS / tag name of the alignment.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    fn block_open(self) -> String {
        format!("<div style=\"text-align: {};\">", self.as_str())
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const BLOCK_CLOSE: &str = "</div>";

/// Replace the selection with `prefix + selected + suffix`.
///
/// The caret lands immediately after the inserted suffix; the wrapped text is
/// not re-selected. An empty selection brackets an empty string at the caret.
pub fn wrap_selection(text: &str, selection: Selection, prefix: &str, suffix: &str) -> Edit {
    let sel = selection.normalize(text);
    let selected = &text[sel.range()];
    let mut out = String::with_capacity(text.len() + prefix.len() + suffix.len());
    out.push_str(&text[..sel.start]);
    out.push_str(prefix);
    out.push_str(selected);
    out.push_str(suffix);
    let caret = out.len();
    out.push_str(&text[sel.end..]);
    Edit {
        text: out,
        selection: Selection::caret(caret),
    }
}

/// Replace the selection (usually a caret) with `insert`.
///
/// The caret lands immediately after the inserted text.
pub fn insert_at_cursor(text: &str, selection: Selection, insert: &str) -> Edit {
    let sel = selection.normalize(text);
    replace_range(text, sel.range(), insert)
}

/// Prepend `prefix` to the line containing `selection.start`.
///
/// Not idempotent: applying the same prefix twice stacks it. Only the cursor
/// line changes. The caret is shifted by `prefix.len()` so it stays on the same
/// character; a caret at the start of the line lands at `line_start + prefix.len()`.
pub fn prefix_current_line(text: &str, selection: Selection, prefix: &str) -> Edit {
    let sel = selection.normalize(text);
    let line_start = line_bounds(text, sel.start).start;
    let mut out = String::with_capacity(text.len() + prefix.len());
    out.push_str(&text[..line_start]);
    out.push_str(prefix);
    out.push_str(&text[line_start..]);
    Edit {
        text: out,
        selection: Selection::caret(sel.start + prefix.len()),
    }
}

/// Wrap the nearest line at or above the cursor that contains any marker in
/// a block alignment wrapper.
///
/// Used to tag the image reference closest above the cursor. A line already
/// inside an alignment wrapper has that wrapper replaced, not nested. The
/// caret lands after the closing wrapper.
///
/// # Errors
/// Returns [`EditError::NoMarker`] when no such line exists; the buffer is
/// left as is.
pub fn wrap_line_containing_marker(
    text: &str,
    selection: Selection,
    markers: &[&str],
    align: Alignment,
) -> Result<Edit, EditError> {
    let sel = selection.normalize(text);
    let mut line = line_bounds(text, sel.start);
    loop {
        let content = &text[line.clone()];
        if markers.iter().any(|m| !m.is_empty() && content.contains(m)) {
            let wrapped = format!("{}\n{content}\n{BLOCK_CLOSE}", align.block_open());
            let target = enclosing_wrapper(text, &line).unwrap_or(line);
            return Ok(replace_range(text, target, &wrapped));
        }
        if line.start == 0 {
            break;
        }
        line = line_bounds(text, line.start - 1);
    }
    Err(EditError::NoMarker {
        markers: markers.join(", "),
    })
}

/// Wrap a non-blank selection in a block alignment wrapper.
///
/// The selection afterwards covers the original text inside the wrapper.
///
/// # Errors
/// Returns [`EditError::EmptySelection`] when the selection is empty or only
/// whitespace.
pub fn align_selection(text: &str, selection: Selection, align: Alignment) -> Result<Edit, EditError> {
    let sel = selection.normalize(text);
    let selected = &text[sel.range()];
    if selected.trim().is_empty() {
        return Err(EditError::EmptySelection);
    }
    let open = align.block_open();
    let wrapped = format!("{open}\n{selected}\n{BLOCK_CLOSE}");
    let inner_start = sel.start + open.len() + 1;
    let mut out = String::with_capacity(text.len() + wrapped.len());
    out.push_str(&text[..sel.start]);
    out.push_str(&wrapped);
    out.push_str(&text[sel.end..]);
    Ok(Edit {
        text: out,
        selection: Selection::new(inner_start, inner_start + selected.len()),
    })
}

/// Apply (or with `None`, remove) inline alignment tags.
///
/// Acts on the selection, or on the whole cursor line when nothing is
/// selected. Existing `<left>`, `<center>` and `<right>` tags in the target
/// are stripped first, so re-aligning replaces rather than nests.
pub fn set_alignment(text: &str, selection: Selection, align: Option<Alignment>) -> Edit {
    let sel = selection.normalize(text);
    let had_selection = !sel.is_empty();
    let target = if had_selection {
        sel.range()
    } else {
        line_bounds(text, sel.start)
    };
    let cleaned = strip_alignment_tags(&text[target.clone()]);
    let replacement = match align {
        Some(a) => format!("<{a}>{cleaned}</{a}>"),
        None => cleaned,
    };
    let start = target.start;
    let mut edit = replace_range(text, target, &replacement);
    if had_selection {
        edit.selection = Selection::new(start, start + replacement.len());
    }
    edit
}

/// Byte range of the line containing `offset`, excluding the line break.
pub fn line_bounds(text: &str, offset: usize) -> Range<usize> {
    let offset = Selection::caret(offset).normalize(text).start;
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    start..end
}

/// The range of an alignment wrapper sitting directly around `line`.
fn enclosing_wrapper(text: &str, line: &Range<usize>) -> Option<Range<usize>> {
    if line.start == 0 || line.end >= text.len() {
        return None;
    }
    let open = line_bounds(text, line.start - 1);
    let close = line_bounds(text, line.end + 1);
    let is_open = Alignment::ALL
        .iter()
        .any(|a| text[open.clone()] == a.block_open());
    (is_open && &text[close.clone()] == BLOCK_CLOSE).then_some(open.start..close.end)
}

fn replace_range(text: &str, range: Range<usize>, insert: &str) -> Edit {
    let mut out = String::with_capacity(text.len() + insert.len());
    out.push_str(&text[..range.start]);
    out.push_str(insert);
    let caret = out.len();
    out.push_str(&text[range.end..]);
    Edit {
        text: out,
        selection: Selection::caret(caret),
    }
}

fn strip_alignment_tags(s: &str) -> String {
    let mut out = s.to_string();
    for a in Alignment::ALL {
        out = out
            .replace(&format!("<{a}>"), "")
            .replace(&format!("</{a}>"), "");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- wrap_selection ---

    #[test]
    fn test_wrap_selection_bold_whole_buffer() {
        let edit = wrap_selection("hello", Selection::new(0, 5), "**", "**");
        assert_eq!(edit.text, "**hello**");
        assert_eq!(edit.selection, Selection::caret(9));
    }

    #[test]
    fn test_wrap_selection_empty_selection_brackets_caret() {
        let edit = wrap_selection("ab", Selection::caret(1), "$", "$");
        assert_eq!(edit.text, "a$$b");
        assert_eq!(edit.selection, Selection::caret(3));
    }

    #[test]
    fn test_wrap_selection_on_empty_buffer() {
        let edit = wrap_selection("", Selection::caret(0), "*", "*");
        assert_eq!(edit.text, "**");
        assert_eq!(edit.selection, Selection::caret(2));
    }

    #[test]
    fn test_wrap_selection_at_end_of_buffer() {
        let edit = wrap_selection("abc", Selection::caret(3), "`", "`");
        assert_eq!(edit.text, "abc``");
        assert_eq!(edit.selection, Selection::caret(4));
    }

    // --- insert_at_cursor ---

    #[test]
    fn test_insert_at_cursor_places_caret_after_text() {
        let edit = insert_at_cursor("ac", Selection::caret(1), "b");
        assert_eq!(edit.text, "abc");
        assert_eq!(edit.selection, Selection::caret(2));
    }

    #[test]
    fn test_insert_at_cursor_replaces_selection() {
        let edit = insert_at_cursor("one two three", Selection::new(4, 7), "2");
        assert_eq!(edit.text, "one 2 three");
        assert_eq!(edit.selection, Selection::caret(5));
    }

    // --- prefix_current_line ---

    #[test]
    fn test_prefix_current_line_second_line() {
        let edit = prefix_current_line("line1\nline2", Selection::caret(7), "# ");
        assert_eq!(edit.text, "line1\n# line2");
        assert_eq!(edit.selection, Selection::caret(9));
    }

    #[test]
    fn test_prefix_current_line_first_line() {
        let edit = prefix_current_line("one\ntwo", Selection::caret(2), "> ");
        assert_eq!(edit.text, "> one\ntwo");
        assert_eq!(edit.selection, Selection::caret(4));
    }

    #[test]
    fn test_prefix_current_line_empty_line() {
        let edit = prefix_current_line("a\n\nb", Selection::caret(2), "- ");
        assert_eq!(edit.text, "a\n- \nb");
        assert_eq!(edit.selection, Selection::caret(4));
    }

    #[test]
    fn test_prefix_current_line_caret_on_line_break_belongs_to_previous_line() {
        // Offset 5 is the '\n' after "line1"; the caret sits at the end of line 1.
        let edit = prefix_current_line("line1\nline2", Selection::caret(5), "# ");
        assert_eq!(edit.text, "# line1\nline2");
    }

    #[test]
    fn test_prefix_current_line_is_not_idempotent() {
        let once = prefix_current_line("x", Selection::caret(0), "#");
        let twice = prefix_current_line(&once.text, once.selection, "#");
        assert_eq!(twice.text, "##x");
    }

    // --- wrap_line_containing_marker ---

    #[test]
    fn test_wrap_marker_finds_line_above() {
        let text = "intro\n🖼️[Image 1]\ncaption\n";
        let edit =
            wrap_line_containing_marker(text, Selection::caret(text.len()), &["🖼️["], Alignment::Center)
                .unwrap();
        assert_eq!(
            edit.text,
            "intro\n<div style=\"text-align: center;\">\n🖼️[Image 1]\n</div>\ncaption\n"
        );
        assert!(edit.text[edit.selection.start..].starts_with("\ncaption"));
    }

    #[test]
    fn test_wrap_marker_on_cursor_line() {
        let edit =
            wrap_line_containing_marker("![a](b.png)", Selection::caret(0), &["!["], Alignment::Right)
                .unwrap();
        assert_eq!(
            edit.text,
            "<div style=\"text-align: right;\">\n![a](b.png)\n</div>"
        );
        assert_eq!(edit.selection, Selection::caret(edit.text.len()));
    }

    #[test]
    fn test_wrap_marker_ignores_lines_below_cursor() {
        let err = wrap_line_containing_marker("top\n![x](y)", Selection::caret(1), &["!["], Alignment::Left)
            .unwrap_err();
        assert!(matches!(err, EditError::NoMarker { .. }));
    }

    #[test]
    fn test_wrap_marker_replaces_existing_wrapper() {
        let text = "intro\n🖼️[Image 1]\ncaption";
        let first =
            wrap_line_containing_marker(text, Selection::caret(text.len()), &["🖼️["], Alignment::Center)
                .unwrap();
        let second = wrap_line_containing_marker(
            &first.text,
            first.selection,
            &["🖼️["],
            Alignment::Right,
        )
        .unwrap();
        assert_eq!(
            second.text,
            "intro\n<div style=\"text-align: right;\">\n🖼️[Image 1]\n</div>\ncaption"
        );
        assert!(second.text[second.selection.start..].starts_with("\ncaption"));
    }

    #[test]
    fn test_wrap_marker_ignores_unrelated_div_above() {
        let text = "<div>\n![a](b.png)\n</div>";
        let edit =
            wrap_line_containing_marker(text, Selection::caret(8), &["!["], Alignment::Left).unwrap();
        assert_eq!(
            edit.text,
            "<div>\n<div style=\"text-align: left;\">\n![a](b.png)\n</div>\n</div>"
        );
    }

    #[test]
    fn test_wrap_marker_not_found_in_empty_buffer() {
        let result = wrap_line_containing_marker("", Selection::caret(0), &["!["], Alignment::Left);
        assert!(result.is_err());
    }

    // --- align_selection ---

    #[test]
    fn test_align_selection_wraps_and_reselects() {
        let edit = align_selection("a title b", Selection::new(2, 7), Alignment::Center).unwrap();
        assert_eq!(
            edit.text,
            "a <div style=\"text-align: center;\">\ntitle\n</div> b"
        );
        assert_eq!(&edit.text[edit.selection.range()], "title");
    }

    #[test]
    fn test_align_selection_rejects_blank_selection() {
        assert_eq!(
            align_selection("a   b", Selection::new(1, 4), Alignment::Left),
            Err(EditError::EmptySelection)
        );
    }

    // --- set_alignment ---

    #[test]
    fn test_set_alignment_on_current_line() {
        let edit = set_alignment("one\ntwo\nthree", Selection::caret(5), Some(Alignment::Right));
        assert_eq!(edit.text, "one\n<right>two</right>\nthree");
        assert_eq!(edit.selection, Selection::caret(22));
    }

    #[test]
    fn test_set_alignment_replaces_existing_tags() {
        let edit = set_alignment("<center>x</center>", Selection::caret(0), Some(Alignment::Left));
        assert_eq!(edit.text, "<left>x</left>");
    }

    #[test]
    fn test_set_alignment_none_removes_tags() {
        let text = "<left>hi</left>";
        let edit = set_alignment(text, Selection::new(0, text.len()), None);
        assert_eq!(edit.text, "hi");
        assert_eq!(edit.selection, Selection::new(0, 2));
    }

    // --- line_bounds ---

    #[test]
    fn test_line_bounds_last_line_without_break() {
        assert_eq!(line_bounds("a\nbc", 3), 2..4);
        assert_eq!(line_bounds("a\nbc", 4), 2..4);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn wrap_selection_length_and_brackets(
                text in ".{0,40}",
                a in 0..60usize,
                b in 0..60usize,
                prefix in "[*_$`]{0,3}",
                suffix in "[*_$`]{0,3}",
            ) {
                let sel = Selection::new(a, b).normalize(&text);
                let edit = wrap_selection(&text, sel, &prefix, &suffix);
                prop_assert_eq!(edit.text.len(), text.len() + prefix.len() + suffix.len());
                prop_assert_eq!(&edit.text[sel.start..sel.start + prefix.len()], prefix.as_str());
                let tail = sel.end + prefix.len();
                prop_assert_eq!(&edit.text[tail..tail + suffix.len()], suffix.as_str());
                prop_assert!(edit.selection.is_valid_for(&edit.text));
            }

            #[test]
            fn prefix_only_touches_cursor_line(
                lines in proptest::collection::vec("[a-z ]{0,8}", 1..6),
                pick in 0..6usize,
                prefix in "[#>-] ?",
            ) {
                let text = lines.join("\n");
                let idx = pick % lines.len();
                let offset: usize = lines[..idx].iter().map(|l| l.len() + 1).sum();
                let edit = prefix_current_line(&text, Selection::caret(offset), &prefix);
                let after: Vec<&str> = edit.text.split('\n').collect();
                prop_assert_eq!(after.len(), lines.len());
                for (i, line) in after.iter().enumerate() {
                    if i == idx {
                        prop_assert_eq!(line.to_string(), format!("{prefix}{}", lines[i]));
                    } else {
                        prop_assert_eq!(*line, lines[i].as_str());
                    }
                }
                prop_assert_eq!(edit.selection, Selection::caret(offset + prefix.len()));
            }

            #[test]
            fn ops_are_total(text in "(.|\n){0,30}", a in 0..64usize, b in 0..64usize) {
                let sel = Selection::new(a, b);
                let wrapped = wrap_selection(&text, sel, "(", ")");
                prop_assert!(wrapped.selection.is_valid_for(&wrapped.text));
                let ins = insert_at_cursor(&text, sel, "x");
                prop_assert!(ins.selection.is_valid_for(&ins.text));
                let pre = prefix_current_line(&text, sel, "# ");
                prop_assert!(pre.selection.is_valid_for(&pre.text));
                if let Ok(edit) = wrap_line_containing_marker(&text, sel, &["!"], Alignment::Center) {
                    prop_assert!(edit.selection.is_valid_for(&edit.text));
                }
                let aligned = set_alignment(&text, sel, Some(Alignment::Left));
                prop_assert!(aligned.selection.is_valid_for(&aligned.text));
            }
        }
    }
}
