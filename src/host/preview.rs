//! Preview handoff: the buffer travels in the fragment of the companion
//! view's address, so no network round-trip is needed.

/// Errors decoding a preview fragment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FragmentError {
    #[error("malformed percent escape at byte {0}")]
    BadEscape(usize),
    #[error("fragment does not decode to UTF-8")]
    NotUtf8,
}

/// `base#<percent-encoded markdown>`.
pub fn preview_url(base: &str, markdown: &str) -> String {
    format!("{base}#{}", encode_component(markdown))
}

/// Percent-encode everything except the URI-component unreserved set
/// (`A-Z a-z 0-9 - _ . ! ~ * ' ( )`).
pub fn encode_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        if byte.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&byte) {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Decode the fragment of a preview address (the part after `#`, or a whole
/// address containing one) back into the markdown.
///
/// # Errors
/// Fails on truncated or non-hex escapes and on invalid UTF-8.
pub fn decode_fragment(fragment: &str) -> Result<String, FragmentError> {
    let encoded = fragment.split_once('#').map_or(fragment, |(_, f)| f);
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let (hi, lo) = match bytes.get(i + 1..i + 3) {
                Some(&[hi, lo]) => (hex_value(hi), hex_value(lo)),
                _ => (None, None),
            };
            let (Some(hi), Some(lo)) = (hi, lo) else {
                return Err(FragmentError::BadEscape(i));
            };
            out.push((hi << 4) | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| FragmentError::NotUtf8)
}

fn hex_value(byte: u8) -> Option<u8> {
    char::from(byte).to_digit(16).and_then(|d| u8::try_from(d).ok())
}
