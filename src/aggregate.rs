//! Joining per-chunk answers back into one.

/// Join per-chunk results with `\n`, keeping their order.
///
/// ```rust
/// assert_eq!(pagesift::aggregate(&["OK-1", "OK-2", "OK-3"]), "OK-1\nOK-2\nOK-3");
/// assert_eq!(pagesift::aggregate::<&str>(&[]), "");
/// ```
#[must_use]
pub fn aggregate<S: AsRef<str>>(results: &[S]) -> String {
    let capacity = results
        .iter()
        .map(|result| result.as_ref().len() + 1)
        .sum::<usize>();
    let mut combined = String::with_capacity(capacity);

    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            combined.push('\n');
        }
        combined.push_str(result.as_ref());
    }

    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_result_unchanged() {
        assert_eq!(aggregate(&["only"]), "only");
    }

    #[test]
    fn test_empty_results_keep_their_slot() {
        assert_eq!(aggregate(&["a", "", "c"]), "a\n\nc");
    }

    #[test]
    fn test_owned_strings() {
        let results = vec![String::from("x"), String::from("y")];
        assert_eq!(aggregate(&results), "x\ny");
    }
}
