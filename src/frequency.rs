use std::collections::BTreeMap;

/// Occurrence count per byte. Ordered so that everything derived from it is
/// deterministic for a given input.
pub type Frequencies = BTreeMap<u8, u64>;

pub fn count_frequencies(data: &[u8]) -> Frequencies {
    let mut freq_map = Frequencies::new();
    for &byte in data {
        *freq_map.entry(byte).or_insert(0) += 1;
    }
    freq_map
}

/// Folds a partial count (e.g. from one chunk of a larger input) into `into`.
pub fn merge_frequencies(into: &mut Frequencies, from: &Frequencies) {
    for (&byte, &count) in from {
        *into.entry(byte).or_insert(0) += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_symbol() {
        let freqs = count_frequencies(b"aaabbc");
        assert_eq!(freqs.len(), 3);
        assert_eq!(freqs[&b'a'], 3);
        assert_eq!(freqs[&b'b'], 2);
        assert_eq!(freqs[&b'c'], 1);
    }

    #[test]
    fn empty_input_gives_empty_map() {
        assert!(count_frequencies(b"").is_empty());
    }

    #[test]
    fn sum_matches_input_length() {
        let data = b"asmaa atef with file";
        let freqs = count_frequencies(data);
        assert_eq!(freqs.values().sum::<u64>(), data.len() as u64);
        assert!(freqs.values().all(|&count| count >= 1));
    }

    #[test]
    fn merged_chunks_equal_whole_count() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let (head, tail) = data.split_at(17);

        let mut merged = count_frequencies(head);
        merge_frequencies(&mut merged, &count_frequencies(tail));

        assert_eq!(merged, count_frequencies(data));
    }
}
