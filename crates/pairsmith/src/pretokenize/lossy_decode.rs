//! # Lossy UTF-8 Decoding
//!
//! Corpus byte ranges are not guaranteed to be valid UTF-8. Training never
//! fails on them; invalid sequences are dropped (or replaced), and the
//! lost bytes are accepted data loss.

use std::borrow::Cow;

/// Controls how invalid UTF-8 sequences in the corpus are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecodePolicy {
    /// Drop invalid sequences.
    #[default]
    Ignore,

    /// Replace each invalid sequence with U+FFFD.
    Replace,
}

/// Decode bytes as UTF-8 under a [`DecodePolicy`].
///
/// Valid input is borrowed, not copied.
pub fn decode_lossy(
    bytes: &[u8],
    policy: DecodePolicy,
) -> Cow<'_, str> {
    match policy {
        DecodePolicy::Replace => String::from_utf8_lossy(bytes),
        DecodePolicy::Ignore => decode_ignoring_invalid(bytes),
    }
}

fn decode_ignoring_invalid(mut bytes: &[u8]) -> Cow<'_, str> {
    let mut buf = String::new();
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                if buf.is_empty() {
                    return Cow::Borrowed(valid);
                }
                buf.push_str(valid);
                return Cow::Owned(buf);
            }
            Err(err) => {
                let (valid, rest) = bytes.split_at(err.valid_up_to());
                buf.push_str(std::str::from_utf8(valid).unwrap_or_default());

                // `None` is a truncated sequence at the end of input.
                let skip = err.error_len().unwrap_or(rest.len());
                bytes = &rest[skip..];
                if bytes.is_empty() {
                    return Cow::Owned(buf);
                }
            }
        }
    }
}
