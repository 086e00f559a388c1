//! @ai:module:intent N-gram extraction and clipped overlap counting for ROUGE-N
//! @ai:module:layer domain
//! @ai:module:public_api NgramCounts, extract_ngrams, clipped_overlap
//! @ai:module:stateless true

use std::collections::HashMap;

/// @ai:intent Multiset of n-grams borrowed from a token sequence
#[derive(Debug, Clone)]
pub struct NgramCounts<'a, T> {
    counts: HashMap<&'a [T], usize>,
    total: usize,
}

impl<'a, T: Eq + std::hash::Hash> NgramCounts<'a, T> {
    /// @ai:intent Total number of n-grams, counted with multiplicity
    pub fn total(&self) -> usize {
        self.total
    }

    /// @ai:intent Number of distinct n-grams
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// @ai:intent Occurrences of a specific n-gram
    pub fn count(&self, ngram: &[T]) -> usize {
        self.counts.get(ngram).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// @ai:intent Iterate over distinct n-grams and their counts
    pub fn iter(&self) -> impl Iterator<Item = (&'a [T], usize)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }
}

/// @ai:intent Build the multiset of contiguous n-grams of order n
/// @ai:post total() == max(0, tokens.len() - n + 1); n == 0 yields an empty multiset
/// @ai:effects pure
pub fn extract_ngrams<T: Eq + std::hash::Hash>(tokens: &[T], n: usize) -> NgramCounts<'_, T> {
    let mut ngrams = NgramCounts {
        counts: HashMap::new(),
        total: 0,
    };

    if n == 0 || tokens.len() < n {
        return ngrams;
    }

    for window in tokens.windows(n) {
        *ngrams.counts.entry(window).or_insert(0) += 1;
        ngrams.total += 1;
    }

    ngrams
}

/// @ai:intent Sum over distinct n-grams of min(hyp count, ref count)
/// @ai:effects pure
pub fn clipped_overlap<T: Eq + std::hash::Hash>(
    hyp: &NgramCounts<'_, T>,
    reference: &NgramCounts<'_, T>,
) -> usize {
    let (smaller, larger) = if hyp.distinct() <= reference.distinct() {
        (hyp, reference)
    } else {
        (reference, hyp)
    };

    smaller
        .iter()
        .map(|(ngram, count)| count.min(larger.count(ngram)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_extract_unigrams_and_bigrams() {
        let tokens = tokenize("the cat sat on the mat");

        let unigrams = extract_ngrams(&tokens, 1);
        assert_eq!(unigrams.total(), 6);
        assert_eq!(unigrams.distinct(), 5);
        assert_eq!(unigrams.count(&["the".to_string()]), 2);

        let bigrams = extract_ngrams(&tokens, 2);
        assert_eq!(bigrams.total(), 5);
        assert_eq!(bigrams.count(&["on".to_string(), "the".to_string()]), 1);
    }

    #[test]
    fn test_sequence_shorter_than_n_is_empty() {
        let tokens = tokenize("solo");
        assert!(extract_ngrams(&tokens, 2).is_empty());
        assert!(extract_ngrams(&tokens, 0).is_empty());

        let none: Vec<String> = vec![];
        assert_eq!(extract_ngrams(&none, 1).total(), 0);
    }

    #[test]
    fn test_clipped_overlap_caps_repeats() {
        let hyp = tokenize("the the the the");
        let reference = tokenize("the cat sat on the mat");

        let overlap = clipped_overlap(&extract_ngrams(&hyp, 1), &extract_ngrams(&reference, 1));
        assert_eq!(overlap, 2);
    }

    #[test]
    fn test_clipped_overlap_is_symmetric_in_value() {
        let a = tokenize("a b a c a");
        let b = tokenize("a a b b d");
        let (na, nb) = (extract_ngrams(&a, 1), extract_ngrams(&b, 1));

        assert_eq!(clipped_overlap(&na, &nb), 3);
        assert_eq!(clipped_overlap(&nb, &na), 3);
    }

    #[test]
    fn test_self_overlap_equals_total() {
        let tokens = tokenize("one two one two three one");
        for n in 1..=4 {
            let ngrams = extract_ngrams(&tokens, n);
            assert_eq!(clipped_overlap(&ngrams, &ngrams), ngrams.total());
        }
    }
}
