//! Text decoding for collected source files.
//!
//! Files are read once into memory and decoded with:
//! - BOM detection (UTF-8, UTF-16 LE/BE)
//! - a strict UTF-8 fast path
//! - a chardetng guess for everything else, decoded with replacement characters

use anyhow::{Context, Result};
use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use std::path::Path;

const DETECTION_SAMPLE_SIZE: usize = 8192;

/// Read a file fully and decode it to a `String`.
///
/// Only I/O failures are errors; undecodable bytes become U+FFFD.
pub fn read_source_text(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(decode_bytes(&bytes))
}

/// Decode raw bytes using BOM sniffing, then UTF-8, then detection.
pub fn decode_bytes(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (decoded, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return decoded.into_owned();
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let sample = &bytes[..bytes.len().min(DETECTION_SAMPLE_SIZE)];
    let mut detector = EncodingDetector::new();
    detector.feed(sample, sample.len() == bytes.len());
    let encoding = detector.guess(None, true);
    tracing::debug!("Decoding non-UTF-8 content as {}", encoding.name());
    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_plain_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all("Test content 🚀".as_bytes()).unwrap();
        file.flush().unwrap();

        assert_eq!(read_source_text(file.path()).unwrap(), "Test content 🚀");
    }

    #[test]
    fn strips_utf8_bom() {
        let mut bytes = vec![0xef, 0xbb, 0xbf];
        bytes.extend_from_slice(b"print('hi')");
        assert_eq!(decode_bytes(&bytes), "print('hi')");
    }

    #[test]
    fn decodes_utf16_le_with_bom() {
        let mut bytes = vec![0xff, 0xfe];
        for unit in "go".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_bytes(&bytes), "go");
    }

    #[test]
    fn latin1_bytes_do_not_fail() {
        // "café" in windows-1252
        let text = decode_bytes(&[0x63, 0x61, 0x66, 0xe9]);
        assert!(text.starts_with("caf"));
        assert_eq!(text.chars().count(), 4);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(read_source_text(&dir.path().join("nope.py")).is_err());
    }
}
