use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn stable_index<T: Hash>(value: &T, buckets: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    (hasher.finish() % buckets.max(1) as u64) as usize
}

pub fn wrapped_line_count(text: &str, chars_per_line: usize) -> usize {
    if text.is_empty() {
        return 0;
    }

    text.chars().count().div_ceil(chars_per_line.max(1))
}

pub fn wrapped_lines(text: &str, chars_per_line: usize) -> Vec<String> {
    let chars = text.chars().collect::<Vec<_>>();
    chars
        .chunks(chars_per_line.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_index_is_deterministic_and_bounded() {
        for value in 0u64..200 {
            let first = stable_index(&value, 8);
            let second = stable_index(&value, 8);
            assert_eq!(first, second);
            assert!(first < 8);
        }
    }

    #[test]
    fn wrapped_line_count_rounds_up() {
        assert_eq!(wrapped_line_count("", 10), 0);
        assert_eq!(wrapped_line_count("short", 10), 1);
        assert_eq!(wrapped_line_count("exactly ten", 11), 1);
        assert_eq!(wrapped_line_count("just over the line", 10), 2);
    }

    #[test]
    fn wrapped_lines_cover_all_text() {
        let lines = wrapped_lines("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }
}
