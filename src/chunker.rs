//! Fixed-length chunking.
//!
//! The document is cut every `L` bytes, with no overlap, so each chunk can be
//! sent to the model on its own and the answers stitched back together in order.
//!
//! ## How It Works
//!
//! ```text
//! length = 10
//!
//! Document: "abcdefghijklmnopqrstuvwxyz"
//!
//! Chunk 0: "abcdefghij"   [0..10]
//! Chunk 1: "klmnopqrst"   [10..20]
//! Chunk 2: "uvwxyz"       [20..26]  <- final chunk may be shorter
//! ```
//!
//! ## Multi-byte Text
//!
//! Lengths are measured in UTF-8 bytes, but a cut never lands inside a
//! character. When `start + L` falls in the middle of a character the cut moves
//! back to the character's first byte, so that chunk comes out slightly short:
//!
//! ```text
//! length = 4
//!
//! Document: "ab日本"  (a, b, then two 3-byte characters)
//!
//! Chunk 0: "ab"       [0..2]   <- byte 4 is inside '日'
//! Chunk 1: "日"       [2..5]
//! Chunk 2: "本"       [5..8]
//! ```
//!
//! If the length is smaller than a single character, that character becomes a
//! chunk on its own. Either way, concatenating the chunks reproduces the
//! document byte for byte.

use crate::{Chunk, Error, Result};

/// Default chunk length in bytes.
pub const DEFAULT_CHUNK_LENGTH: usize = 6000;

/// Fixed-length, non-overlapping chunker.
///
/// ## Example
///
/// ```rust
/// use pagesift::FixedChunker;
///
/// let chunker = FixedChunker::new(100).unwrap();
/// let text = "A".repeat(250);
/// let chunks = chunker.chunk(&text);
///
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(chunks[0].len(), 100);
/// assert_eq!(chunks[1].start, 100);
/// assert_eq!(chunks[2].len(), 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedChunker {
    max_length: usize,
}

impl FixedChunker {
    /// Create a new chunker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChunkLength`] if `max_length == 0`.
    pub fn new(max_length: usize) -> Result<Self> {
        if max_length == 0 {
            return Err(Error::InvalidChunkLength(max_length));
        }
        Ok(Self { max_length })
    }

    /// Maximum chunk length in bytes.
    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    /// Split `text` into ordered chunks.
    ///
    /// An empty document yields no chunks.
    #[must_use]
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return vec![];
        }

        let mut chunks = Vec::with_capacity(self.estimate_chunks(text.len()));
        let mut start = 0;

        while start < text.len() {
            let mut end = (start + self.max_length).min(text.len());

            // Replaces text.floor_char_boundary(end) for MSRV < 1.80 compatibility
            while !text.is_char_boundary(end) {
                end -= 1;
            }

            // Length is narrower than the character at `start`
            if end == start {
                end = start + 1;
                while !text.is_char_boundary(end) {
                    end += 1;
                }
            }

            chunks.push(Chunk::new(&text[start..end], start, end, chunks.len()));
            start = end;
        }

        chunks
    }

    /// Number of chunks an ASCII document of `text_len` bytes produces.
    ///
    /// Exact for ASCII; a lower bound when boundaries have to move around
    /// multi-byte characters.
    #[must_use]
    pub fn estimate_chunks(&self, text_len: usize) -> usize {
        text_len.div_ceil(self.max_length)
    }
}

impl Default for FixedChunker {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_CHUNK_LENGTH,
        }
    }
}

/// Split `document` into chunk strings of at most `max_length` bytes.
///
/// Convenience over [`FixedChunker`] when offsets are not needed.
///
/// ```rust
/// let chunks = pagesift::split("abcdefghij", 4).unwrap();
/// assert_eq!(chunks, ["abcd", "efgh", "ij"]);
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidChunkLength`] if `max_length == 0`.
pub fn split(document: &str, max_length: usize) -> Result<Vec<String>> {
    let chunker = FixedChunker::new(max_length)?;
    Ok(chunker
        .chunk(document)
        .into_iter()
        .map(|chunk| chunk.text)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_chunking() {
        let chunker = FixedChunker::new(10).unwrap();
        let chunks = chunker.chunk("abcdefghijklmnopqrstuvwxyz");

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "abcdefghij");
        assert_eq!(chunks[0].span(), 0..10);
        assert_eq!(chunks[1].text, "klmnopqrst");
        assert_eq!(chunks[2].text, "uvwxyz");
        assert_eq!(chunks[2].index, 2);
    }

    #[test]
    fn test_empty_text() {
        let chunker = FixedChunker::new(10).unwrap();
        assert!(chunker.chunk("").is_empty());
    }

    #[test]
    fn test_text_smaller_than_chunk() {
        let chunker = FixedChunker::new(100).unwrap();
        let chunks = chunker.chunk("small");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "small");
    }

    #[test]
    fn test_exact_multiple() {
        let chunks = split(&"x".repeat(30), 10).unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() == 10));
    }

    #[test]
    fn test_unicode_boundaries() {
        let chunker = FixedChunker::new(4).unwrap();
        let chunks = chunker.chunk("ab日本");

        let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["ab", "日", "本"]);
    }

    #[test]
    fn test_length_narrower_than_char() {
        let chunker = FixedChunker::new(1).unwrap();
        let chunks = chunker.chunk("a日b");

        let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["a", "日", "b"]);
    }

    #[test]
    fn test_zero_length_rejected() {
        assert!(matches!(
            FixedChunker::new(0),
            Err(Error::InvalidChunkLength(0))
        ));
        assert!(split("anything", 0).is_err());
    }

    #[test]
    fn test_default_length() {
        assert_eq!(FixedChunker::default().max_length(), 6000);
    }
}
