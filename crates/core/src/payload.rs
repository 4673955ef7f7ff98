//! Data URI payload decoding.
//!
//! Attachments arrive with their bytes embedded in the `href` field as
//! `data:<mime>[;param=value]*;base64,<payload>`. Only the base64 form is
//! accepted; percent-encoded data URIs are rejected.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// MIME type assumed when the data URI leaves it empty.
pub const DEFAULT_MIME: &str = "text/plain";

/// Why a data URI could not be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUriError {
    /// The string does not start with `data:`.
    #[error("missing `data:` scheme")]
    MissingScheme,

    /// No comma separates the header from the payload.
    #[error("missing `,` between header and payload")]
    MissingPayload,

    /// The header does not end with the `;base64` encoding marker.
    #[error("missing `;base64` encoding marker")]
    MissingEncoding,

    /// The payload segment is not valid base64.
    #[error("payload is not valid base64: {0}")]
    InvalidBase64(String),
}

/// A decoded data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    /// Lower-cased MIME type from the URI header, parameters stripped.
    pub mime_type: String,
    /// Raw payload bytes.
    pub bytes: Vec<u8>,
}

impl DecodedPayload {
    /// Number of decoded bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload decoded to zero bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decodes a base64 data URI into its MIME type and bytes.
///
/// ASCII whitespace inside the payload is skipped so that line-wrapped
/// payloads decode.
pub fn decode(data_uri: &str) -> Result<DecodedPayload, DataUriError> {
    let rest = strip_prefix_ignore_case(data_uri.trim(), "data:")
        .ok_or(DataUriError::MissingScheme)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUriError::MissingPayload)?;

    let mut parts = header.split(';');
    let mime = parts.next().unwrap_or_default().trim();
    let is_base64 = parts
        .last()
        .is_some_and(|marker| marker.trim().eq_ignore_ascii_case("base64"));
    if !is_base64 {
        return Err(DataUriError::MissingEncoding);
    }

    let compact: Vec<u8> = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| DataUriError::InvalidBase64(e.to_string()))?;

    let mime_type = if mime.is_empty() {
        DEFAULT_MIME.to_string()
    } else {
        mime.to_ascii_lowercase()
    };

    Ok(DecodedPayload { mime_type, bytes })
}

/// Builds a base64 data URI for `bytes`.
#[must_use]
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Decoded size of a data URI, computed without decoding.
///
/// Whitespace and trailing `=` padding are not counted, so the result is exact
/// for well-formed payloads and an upper bound otherwise.
#[must_use]
pub fn estimated_decoded_len(data_uri: &str) -> u64 {
    let Some((_, payload)) = data_uri.split_once(',') else {
        return 0;
    };

    let (symbols, padding) = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .fold((0u64, 0u64), |(symbols, padding), b| {
            (symbols + 1, if b == b'=' { padding + 1 } else { 0 })
        });
    (symbols.div_ceil(4) * 3).saturating_sub(padding.min(2))
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_decode_tar_uri() {
        let decoded = decode("data:application/x-tar;base64,dG1wLw==").expect("valid uri");
        assert_eq!(decoded.mime_type, "application/x-tar");
        assert_eq!(decoded.bytes, b"tmp/");
    }

    #[test]
    fn test_decode_ignores_parameters_and_case() {
        let decoded = decode("DATA:Text/Plain;charset=utf-8;BASE64,aGVsbG8=").expect("valid uri");
        assert_eq!(decoded.mime_type, "text/plain");
        assert_eq!(decoded.bytes, b"hello");
    }

    #[test]
    fn test_decode_empty_mime_defaults() {
        let decoded = decode("data:;base64,aGk=").expect("valid uri");
        assert_eq!(decoded.mime_type, DEFAULT_MIME);
    }

    #[test]
    fn test_decode_skips_whitespace() {
        let decoded =
            decode("data:image/png;base64,aGVs\nbG8g\r\nd29y bGQ=").expect("valid uri");
        assert_eq!(decoded.bytes, b"hello world");
    }

    #[test]
    fn test_decode_empty_payload() {
        let decoded = decode("data:application/x-tar;base64,").expect("valid uri");
        assert!(decoded.is_empty());
    }

    #[rstest]
    #[case("application/x-tar;base64,dG1wLw==", DataUriError::MissingScheme)]
    #[case("data:application/x-tar;base64", DataUriError::MissingPayload)]
    #[case("data:application/x-tar,dG1wLw==", DataUriError::MissingEncoding)]
    #[case("data:application/x-tar;charset=x,dG1wLw==", DataUriError::MissingEncoding)]
    fn test_decode_malformed(#[case] uri: &str, #[case] expected: DataUriError) {
        assert_eq!(decode(uri), Err(expected));
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = decode("data:application/x-tar;base64,@@@@").unwrap_err();
        assert!(matches!(err, DataUriError::InvalidBase64(_)));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(100)]
    #[case(1024)]
    fn test_estimated_decoded_len_is_exact(#[case] len: usize) {
        let uri = encode("application/pdf", &vec![7u8; len]);
        assert_eq!(estimated_decoded_len(&uri), len as u64);
    }

    #[test]
    fn test_estimated_decoded_len_skips_whitespace() {
        let decoded = decode("data:image/png;base64,aGVs\nbG8g\r\nd29y bGQ=").expect("valid uri");
        let estimate =
            estimated_decoded_len("data:image/png;base64,aGVs\nbG8g\r\nd29y bGQ=");
        assert_eq!(estimate, decoded.len() as u64);
    }

    #[test]
    fn test_estimated_decoded_len_without_payload() {
        assert_eq!(estimated_decoded_len("data:application/pdf;base64"), 0);
    }

    proptest! {
        #[test]
        fn prop_encode_decode_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let decoded = decode(&encode("application/octet-stream", &bytes))
                .expect("encoded uri should decode");
            prop_assert_eq!(decoded.mime_type, "application/octet-stream");
            prop_assert_eq!(decoded.bytes, bytes);
        }

        #[test]
        fn prop_estimate_matches_decoded_len(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let uri = encode("application/octet-stream", &bytes);
            prop_assert_eq!(estimated_decoded_len(&uri), bytes.len() as u64);
        }
    }
}
