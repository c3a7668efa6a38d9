//! Image embedding.
//!
//! Inserted images are stored as `data:` URIs in an [`ImageMap`] and appear in
//! the buffer as a two-line placeholder (see [`codec`]). Loading strips the
//! payload lines and rebuilds the map; saving re-attaches them.

pub mod codec;
mod store;

pub use codec::{
    CodecError, Decoded, ImageLabel, ImageMap, Placeholder, data_uri, decode, embed, encode,
    encode_uri, payload_bytes, resolve_for_preview,
};
pub use store::ImageStore;

/// Substrings that identify an image reference line in the buffer.
///
/// Covers both embedded placeholders and ordinary Markdown images.
pub const IMAGE_MARKERS: &[&str] = &["🖼️[Image ", "🖼[Image ", "!["];
