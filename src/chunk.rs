//! The Chunk type: one slice of a document with position metadata.

/// A contiguous piece of a document, ready to be sent to a model.
///
/// ## Byte Offsets
///
/// `start` and `end` are byte offsets into the original document, not character
/// indices. This matches Rust's string slicing semantics:
///
/// ```rust
/// use pagesift::Chunk;
///
/// let document = "Hello, world!";
/// let chunk = Chunk::new("world", 7, 12, 0);
///
/// assert_eq!(&document[chunk.span()], "world");
/// ```
///
/// Chunks produced by one split never overlap, so the `end` of chunk `i` is the
/// `start` of chunk `i + 1`:
///
/// ```text
/// Document: "abcdefghij"   (length 4)
/// Chunk 0:  "abcd"  [0..4]
/// Chunk 1:  "efgh"  [4..8]
/// Chunk 2:  "ij"    [8..10]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk text.
    pub text: String,
    /// Byte offset where this chunk starts in the original document.
    pub start: usize,
    /// Byte offset where this chunk ends (exclusive) in the original document.
    pub end: usize,
    /// Zero-based index of this chunk in the sequence.
    pub index: usize,
}

impl Chunk {
    /// Create a new chunk.
    #[must_use]
    pub fn new(text: impl Into<String>, start: usize, end: usize, index: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            index,
        }
    }

    /// The length of this chunk in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether this chunk is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The byte span of this chunk in the original document.
    #[must_use]
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl AsRef<str> for Chunk {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
