//! Placeholder encoding for embedded images.
//!
//! Each embedded image is a two-line unit in the buffer:
//!
//! ```text
//! 🖼️[Image 1]
//! <!-- Image 1: data:image/png;base64,iVBORw0KGgo... -->
//! ```
//!
//! The first line is what the user edits around; the second carries the
//! payload and is stripped on load, then re-attached on save.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use base64::Engine;
use regex::Regex;

const LABEL_WORD: &str = "Image";
const LABEL_ICON: &str = "🖼️";
const FALLBACK_MIME: &str = "application/octet-stream";

static LABEL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^🖼\x{FE0F}?\[Image (\d+)\]$").expect("label pattern is valid")
});

static PAYLOAD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<!-- Image (\d+): (data:\S+) -->$").expect("payload pattern is valid")
});

/// Errors from turning a payload back into bytes or parsing labels.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("not a data URI: {0}")]
    NotDataUri(String),
    #[error("data URI is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid image label: {0:?}")]
    InvalidLabel(String),
}

/// Sequential image label, displayed as `Image N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageLabel(u32);

impl ImageLabel {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> u32 {
        self.0
    }

    /// The label line shown in the buffer, e.g. `🖼️[Image 3]`.
    pub fn token(self) -> String {
        format!("{LABEL_ICON}[{self}]")
    }

    /// The comment line carrying `uri`.
    pub fn payload_line(self, uri: &str) -> String {
        format!("<!-- {self}: {uri} -->")
    }
}

impl fmt::Display for ImageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{LABEL_WORD} {}", self.0)
    }
}

impl FromStr for ImageLabel {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(LABEL_WORD)
            .and_then(|rest| rest.strip_prefix(' '))
            .and_then(|n| n.parse().ok())
            .map(Self)
            .ok_or_else(|| CodecError::InvalidLabel(s.to_string()))
    }
}

/// Label → data-URI map, ordered by label number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMap {
    entries: BTreeMap<ImageLabel, String>,
}

impl ImageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, label: ImageLabel) -> Option<&str> {
        self.entries.get(&label).map(String::as_str)
    }

    pub fn contains(&self, label: ImageLabel) -> bool {
        self.entries.contains_key(&label)
    }

    pub fn insert(&mut self, label: ImageLabel, uri: impl Into<String>) {
        self.entries.insert(label, uri.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (ImageLabel, &str)> {
        self.entries.iter().map(|(label, uri)| (*label, uri.as_str()))
    }

    /// The next free label: `Image {len + 1}`, bumped past any label already taken.
    pub fn next_label(&self) -> ImageLabel {
        let mut index = u32::try_from(self.entries.len()).unwrap_or(u32::MAX - 1) + 1;
        while self.contains(ImageLabel(index)) {
            index += 1;
        }
        ImageLabel(index)
    }
}

/// Output of [`encode`]: the assigned label and the two-line placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub label: ImageLabel,
    /// Label line and payload line joined by `\n`, without a trailing newline.
    pub text: String,
}

/// Output of [`decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The buffer with payload lines stripped.
    pub text: String,
    /// A map rebuilt from scratch out of the payload lines.
    pub images: ImageMap,
}

/// Encode raw bytes as a `data:` URI, sniffing the MIME type.
pub fn data_uri(bytes: &[u8]) -> String {
    let mime = image::guess_format(bytes).map_or(FALLBACK_MIME, |format| format.to_mime_type());
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{payload}")
}

/// Decode a base64 `data:` URI back into its bytes.
///
/// # Errors
/// Fails if `uri` is not a base64 data URI.
pub fn payload_bytes(uri: &str) -> Result<Vec<u8>, CodecError> {
    let (header, payload) = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| CodecError::NotDataUri(uri.chars().take(32).collect()))?;
    if !header.ends_with(";base64") {
        return Err(CodecError::NotBase64);
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

/// Store `bytes` under the next label and return its placeholder.
pub fn encode(map: &mut ImageMap, bytes: &[u8]) -> Placeholder {
    encode_uri(map, data_uri(bytes))
}

/// Like [`encode`] for a payload that is already a data URI.
pub fn encode_uri(map: &mut ImageMap, uri: String) -> Placeholder {
    let label = map.next_label();
    let text = format!("{}\n{}", label.token(), label.payload_line(&uri));
    map.insert(label, uri);
    Placeholder { label, text }
}

/// Strip payload lines out of `text` and rebuild the image map from them.
///
/// Non-image lines are kept verbatim and in order. A payload line that does
/// not directly follow its label line is still recorded, and its label line
/// takes its place so the image stays visible in the buffer.
pub fn decode(text: &str) -> Decoded {
    let mut images = ImageMap::new();
    let mut out: Vec<Cow<'_, str>> = Vec::new();

    for line in text.split('\n') {
        let Some((label, uri)) = parse_payload_line(line) else {
            out.push(Cow::Borrowed(line));
            continue;
        };
        images.insert(label, uri);
        let follows_label = out
            .last()
            .and_then(|prev| parse_label_line(prev))
            .is_some_and(|prev| prev == label);
        if !follows_label {
            out.push(Cow::Owned(label.token()));
        }
    }

    Decoded {
        text: out.join("\n"),
        images,
    }
}

/// Re-attach payload lines after each label line that has a map entry.
///
/// The save-side inverse of [`decode`]: `embed(decode(b).text, decode(b).images) == b`
/// for buffers built from [`encode`] placeholders.
pub fn embed(text: &str, images: &ImageMap) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        out.push((*line).to_string());
        let Some(label) = parse_label_line(line) else {
            continue;
        };
        let Some(uri) = images.get(label) else {
            continue;
        };
        let already_embedded = lines
            .get(i + 1)
            .and_then(|next| parse_payload_line(next))
            .is_some_and(|(next, _)| next == label);
        if !already_embedded {
            out.push(label.payload_line(uri));
        }
    }
    out.join("\n")
}

/// Rewrite label lines as `<img>` tags so a renderer can show them.
///
/// Raw HTML keeps the image visible inside HTML blocks such as alignment
/// wrappers, where Markdown image syntax is not parsed. Labels without a map
/// entry are left untouched.
pub fn resolve_for_preview(text: &str, images: &ImageMap) -> String {
    text.split('\n')
        .map(|line| {
            parse_label_line(line)
                .and_then(|label| images.get(label).map(|uri| img_tag(label, uri)))
                .unwrap_or_else(|| line.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn img_tag(label: ImageLabel, uri: &str) -> String {
    format!("<img src=\"{}\" alt=\"{label}\" />", uri.replace('"', "%22"))
}

fn parse_label_line(line: &str) -> Option<ImageLabel> {
    let caps = LABEL_LINE.captures(line.trim_end_matches('\r'))?;
    caps[1].parse().ok().map(ImageLabel)
}

fn parse_payload_line(line: &str) -> Option<(ImageLabel, String)> {
    let caps = PAYLOAD_LINE.captures(line.trim_end_matches('\r'))?;
    let index = caps[1].parse().ok()?;
    Some((ImageLabel(index), caps[2].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_label_display_and_parse() {
        let label = ImageLabel::new(3);
        assert_eq!(label.to_string(), "Image 3");
        assert_eq!("Image 3".parse::<ImageLabel>().unwrap(), label);
        assert!("Picture 3".parse::<ImageLabel>().is_err());
    }

    #[test]
    fn test_data_uri_sniffs_png() {
        let uri = data_uri(PNG_MAGIC);
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_data_uri_falls_back_to_octet_stream() {
        assert_eq!(data_uri(b"hi"), "data:application/octet-stream;base64,aGk=");
    }

    #[test]
    fn test_payload_bytes_roundtrip() {
        assert_eq!(payload_bytes(&data_uri(PNG_MAGIC)).unwrap(), PNG_MAGIC);
    }

    #[test]
    fn test_payload_bytes_rejects_plain_urls() {
        assert!(matches!(
            payload_bytes("https://example.com/a.png"),
            Err(CodecError::NotDataUri(_))
        ));
        assert!(matches!(
            payload_bytes("data:text/plain,hello"),
            Err(CodecError::NotBase64)
        ));
    }

    #[test]
    fn test_encode_assigns_sequential_labels() {
        let mut map = ImageMap::new();
        let first = encode(&mut map, b"a");
        let second = encode(&mut map, b"b");
        assert_eq!(first.label, ImageLabel::new(1));
        assert_eq!(second.label, ImageLabel::new(2));
        assert_eq!(
            first.text,
            "🖼️[Image 1]\n<!-- Image 1: data:application/octet-stream;base64,YQ== -->"
        );
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_next_label_skips_taken_labels() {
        let mut map = ImageMap::new();
        map.insert(ImageLabel::new(2), "data:x;base64,");
        assert_eq!(map.next_label(), ImageLabel::new(3));
    }

    #[test]
    fn test_decode_without_images_is_identity() {
        let text = "# Title\n\nplain <!-- comment -->\n";
        let decoded = decode(text);
        assert_eq!(decoded.text, text);
        assert!(decoded.images.is_empty());
    }

    #[test]
    fn test_decode_strips_payload_lines_and_keeps_labels() {
        let mut map = ImageMap::new();
        let placeholder = encode(&mut map, PNG_MAGIC);
        let text = format!("before\n{}\nafter\n", placeholder.text);

        let decoded = decode(&text);
        assert_eq!(decoded.text, "before\n🖼️[Image 1]\nafter\n");
        assert_eq!(decoded.images, map);
    }

    #[test]
    fn test_decode_records_standalone_payload() {
        let text = "x\n<!-- Image 4: data:image/gif;base64,R0lG -->\ny";
        let decoded = decode(text);
        assert_eq!(decoded.text, "x\n🖼️[Image 4]\ny");
        assert_eq!(
            decoded.images.get(ImageLabel::new(4)),
            Some("data:image/gif;base64,R0lG")
        );
    }

    #[test]
    fn test_decode_rebuilds_instead_of_merging() {
        let mut map = ImageMap::new();
        let one = encode(&mut map, b"one");
        let decoded = decode(&one.text);
        let again = decode("no images here");
        assert_eq!(decoded.images.len(), 1);
        assert!(again.images.is_empty());
    }

    #[test]
    fn test_embed_restores_encoded_buffer() {
        let mut map = ImageMap::new();
        let a = encode(&mut map, b"first");
        let b = encode(&mut map, PNG_MAGIC);
        let original = format!("intro\n{}\nmiddle\n{}\n", a.text, b.text);

        let decoded = decode(&original);
        assert_eq!(embed(&decoded.text, &decoded.images), original);
    }

    #[test]
    fn test_embed_does_not_duplicate_payloads() {
        let mut map = ImageMap::new();
        let placeholder = encode(&mut map, b"x");
        assert_eq!(embed(&placeholder.text, &map), placeholder.text);
    }

    #[test]
    fn test_resolve_for_preview_rewrites_known_labels() {
        let mut map = ImageMap::new();
        map.insert(ImageLabel::new(1), "data:image/png;base64,AA==");
        let text = "🖼️[Image 1]\n🖼️[Image 2]";
        assert_eq!(
            resolve_for_preview(text, &map),
            "<img src=\"data:image/png;base64,AA==\" alt=\"Image 1\" />\n🖼️[Image 2]"
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn decode_restores_encoded_payload(
                prefix in "[a-z #\n]{0,40}",
                payload in proptest::collection::vec(any::<u8>(), 1..256),
            ) {
                let mut map = ImageMap::new();
                let placeholder = encode(&mut map, &payload);
                let text = format!("{prefix}\n{}", placeholder.text);

                let decoded = decode(&text);
                let uri = decoded.images.get(placeholder.label).unwrap();
                prop_assert_eq!(payload_bytes(uri).unwrap(), payload);
                prop_assert_eq!(decoded.text, format!("{prefix}\n{}", placeholder.label.token()));
            }

            #[test]
            fn decode_is_identity_without_payloads(text in "[a-z <>!\\-\n]{0,80}") {
                let decoded = decode(&text);
                prop_assert_eq!(decoded.text, text);
                prop_assert!(decoded.images.is_empty());
            }
        }
    }
}
