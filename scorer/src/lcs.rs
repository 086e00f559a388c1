//! @ai:module:intent Longest common subsequence length for ROUGE-L
//! @ai:module:layer domain
//! @ai:module:public_api lcs_length
//! @ai:module:stateless true

/// @ai:intent Length of the longest common subsequence of two sequences
/// @ai:post result <= min(a.len(), b.len()); lcs_length(a, b) == lcs_length(b, a)
/// @ai:effects pure
pub fn lcs_length<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    // Columns run over the shorter sequence so the rows stay O(min(|a|, |b|)).
    let (rows, cols) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if cols.is_empty() {
        return 0;
    }

    let mut previous = vec![0usize; cols.len() + 1];
    let mut current = vec![0usize; cols.len() + 1];

    for row_item in rows {
        for (j, col_item) in cols.iter().enumerate() {
            current[j + 1] = if row_item == col_item {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[cols.len()]
}
