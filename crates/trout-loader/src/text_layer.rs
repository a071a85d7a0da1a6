//! PDF text layer decoding
//!
//! Uses `pdf-extract` (pure Rust). The decoder can panic on malformed
//! documents, so it runs under `catch_unwind` and a panic becomes a
//! [`LoaderError::TextLayer`].

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::{LoaderError, Result};

/// Decode the text layer of `pdf` into lines, in page order.
pub fn pdf_text_lines(pdf: &[u8]) -> Result<Vec<String>> {
    let decoded = catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(pdf)));

    match decoded {
        Ok(Ok(text)) => Ok(split_lines(&text)),
        Ok(Err(e)) => Err(LoaderError::text_layer(e.to_string())),
        Err(_) => Err(LoaderError::text_layer("PDF decoder panicked (malformed PDF)")),
    }
}

/// Split decoded text into lines.
///
/// `\r\n`, lone `\r` and form feeds (page breaks) all end a line; trailing
/// whitespace is trimmed, leading whitespace is kept.
pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split(['\n', '\r', '\x0c'])
        .map(|line| line.trim_end().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_mixed_endings() {
        let lines = split_lines("a  \r\nb\rc\n\x0cd");
        assert_eq!(lines, vec!["a", "b", "c", "", "d"]);
    }

    #[test]
    fn test_split_lines_keeps_leading_space() {
        let lines = split_lines("   12/15/2025   Forsyth   Lanier Tailwater   ");
        assert_eq!(lines, vec!["   12/15/2025   Forsyth   Lanier Tailwater"]);
    }

    #[test]
    fn test_garbage_is_text_layer_error() {
        let result = pdf_text_lines(b"%PDF-1.7\nthis is not really a pdf");
        assert!(matches!(result, Err(LoaderError::TextLayer(_))));
    }
}
