//! Chunk budget: how many chunks a run may send to the model.
//!
//! ## The Problem
//!
//! Every chunk costs one model round-trip. A very long page can produce dozens
//! of chunks, and the run time and bill grow with it:
//!
//! ```text
//! 100 000-byte page / 6000-byte chunks = 17 calls
//! ```
//!
//! ## The Policy
//!
//! `ChunkBudget` keeps a prefix of the chunk list and drops the rest. Earliest
//! content wins: the start of a page is usually where the material an extraction
//! prompt is after lives. Nothing is sampled or reordered, so applying the same
//! budget twice changes nothing.

/// Default maximum number of chunks sent per run.
pub const DEFAULT_MAX_CHUNKS: usize = 16;

/// Upper bound on the number of chunks processed in one run.
///
/// # Examples
///
/// ```rust
/// use pagesift::ChunkBudget;
///
/// let chunks = ["a", "b", "c", "d"];
///
/// let budget = ChunkBudget::new(2);
/// assert_eq!(budget.select(&chunks), ["a", "b"]);
/// assert_eq!(budget.dropped(chunks.len()), 2);
///
/// // A budget larger than the input keeps everything
/// assert_eq!(ChunkBudget::new(10).select(&chunks), chunks);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkBudget {
    max_chunks: usize,
}

impl ChunkBudget {
    /// Create a budget of at most `max_chunks` chunks.
    ///
    /// A budget of zero is valid and selects nothing.
    #[must_use]
    pub const fn new(max_chunks: usize) -> Self {
        Self { max_chunks }
    }

    /// The maximum number of chunks.
    #[must_use]
    pub const fn max_chunks(&self) -> usize {
        self.max_chunks
    }

    /// The leading `min(chunks.len(), max_chunks)` items, in order.
    #[must_use]
    pub fn select<'a, T>(&self, chunks: &'a [T]) -> &'a [T] {
        &chunks[..self.admitted(chunks.len())]
    }

    /// How many of `total` chunks fit in the budget.
    #[must_use]
    pub fn admitted(&self, total: usize) -> usize {
        total.min(self.max_chunks)
    }

    /// How many of `total` chunks the budget drops.
    #[must_use]
    pub fn dropped(&self, total: usize) -> usize {
        total.saturating_sub(self.max_chunks)
    }
}

impl Default for ChunkBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHUNKS)
    }
}

impl From<usize> for ChunkBudget {
    fn from(max_chunks: usize) -> Self {
        Self::new(max_chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_selection() {
        let chunks: Vec<usize> = (0..20).collect();
        let batch = ChunkBudget::default().select(&chunks);
        assert_eq!(batch.len(), 16);
        assert_eq!(batch, &chunks[..16]);
    }

    #[test]
    fn test_under_budget_unchanged() {
        let chunks = ["x", "y", "z"];
        assert_eq!(ChunkBudget::new(16).select(&chunks), chunks);
        assert_eq!(ChunkBudget::new(16).dropped(3), 0);
    }

    #[test]
    fn test_zero_budget() {
        let chunks = ["x", "y"];
        assert!(ChunkBudget::new(0).select(&chunks).is_empty());
        assert_eq!(ChunkBudget::new(0).dropped(2), 2);
    }

    #[test]
    fn test_idempotent() {
        let chunks: Vec<usize> = (0..40).collect();
        let budget = ChunkBudget::new(7);
        let once = budget.select(&chunks);
        let twice = budget.select(once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_from_usize() {
        assert_eq!(ChunkBudget::from(3).max_chunks(), 3);
    }
}
