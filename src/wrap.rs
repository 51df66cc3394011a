//! Fixed-width line wrapping for terminal output.
//!
//! Greedy and blind to words: every line takes the next `width` units, and
//! whatever is left at the end becomes the last line.
//!
//! ```text
//! width = 4
//!
//! "abcdefghij"  ->  "abcd\n"
//!                   "efgh\n"
//!                   "ij\n"
//! ```
//!
//! A unit is an extended grapheme cluster (UAX #29), so a line never ends in
//! the middle of a multi-byte character or between a letter and its combining
//! accent. Newlines already in the text count as ordinary units.

use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, Result};

/// Default display width in graphemes.
pub const DEFAULT_LINE_WIDTH: usize = 80;

/// Wrap `text` into lines of at most `width` graphemes, each ending in `\n`.
///
/// Empty text gives an empty string.
///
/// ```rust
/// assert_eq!(pagesift::wrap("abcdefghij", 4).unwrap(), "abcd\nefgh\nij\n");
/// assert_eq!(pagesift::wrap("short", 80).unwrap(), "short\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidLineWidth`] if `width == 0`.
pub fn wrap(text: &str, width: usize) -> Result<String> {
    if width == 0 {
        return Err(Error::InvalidLineWidth(width));
    }

    let mut wrapped = String::with_capacity(text.len() + text.len() / width + 1);
    let mut column = 0;

    for grapheme in text.graphemes(true) {
        if column == width {
            wrapped.push('\n');
            column = 0;
        }
        wrapped.push_str(grapheme);
        column += 1;
    }

    if column > 0 {
        wrapped.push('\n');
    }

    Ok(wrapped)
}
