//! Fragment selection grammar: `"1-3,5"` style index lists.

/// Parse a selection expression over a book with `len` fragments.
///
/// The grammar is comma-separated tokens, each either a single 1-based index
/// or an inclusive `start-end` range. Out-of-bounds indices and malformed
/// tokens are silently dropped; an empty (or all-whitespace) expression
/// selects every fragment. The result is deduplicated, ascending, 0-based.
pub fn parse_selection(input: &str, len: usize) -> Vec<usize> {
    if input.trim().is_empty() {
        return (0..len).collect();
    }

    let mut selected: Vec<usize> = Vec::new();

    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if let Some((start_s, end_s)) = token.split_once('-') {
            if let (Ok(start), Ok(end)) = (start_s.trim().parse::<usize>(), end_s.trim().parse::<usize>()) {
                for index in start..=end {
                    if index >= 1 && index <= len {
                        selected.push(index - 1);
                    }
                }
            }
        } else if let Ok(index) = token.parse::<usize>()
            && index >= 1
            && index <= len
        {
            selected.push(index - 1);
        }
    }

    selected.sort_unstable();
    selected.dedup();
    selected
}
