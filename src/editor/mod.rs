//! Selection-aware text buffer operations.
//!
//! Every operation is a pure function of `(buffer, selection)` returning an
//! [`Edit`]: the new buffer plus a selection that is valid for the *new*
//! buffer. Offsets are UTF-8 byte offsets. Nothing here touches the host;
//! callers apply the edit through the editing context.

mod ops;
mod selection;

pub use ops::{
    Alignment, Edit, EditError, align_selection, insert_at_cursor, line_bounds,
    prefix_current_line, set_alignment, wrap_line_containing_marker, wrap_selection,
};
pub use selection::Selection;
