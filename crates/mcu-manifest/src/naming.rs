//! Unique name generation for alias files

use rand::Rng;
use std::collections::VecDeque;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of generated alias suffixes.
pub const NAME_LENGTH: usize = 16;

/// Source of collision-resistant suffixes for alias file names.
pub trait UniqueNameProvider {
    fn next_name(&mut self) -> String;
}

/// Random `[0-9A-Z]` names of a fixed length
#[derive(Debug, Clone, Copy)]
pub struct RandomNames {
    length: usize,
}

impl RandomNames {
    pub fn new(length: usize) -> Self {
        RandomNames { length }
    }
}

impl Default for RandomNames {
    fn default() -> Self {
        RandomNames::new(NAME_LENGTH)
    }
}

impl UniqueNameProvider for RandomNames {
    fn next_name(&mut self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
            .collect()
    }
}

/// Deterministic provider: yields the given names in order, then a zero-padded counter.
#[derive(Debug, Clone, Default)]
pub struct SequenceNames {
    queue: VecDeque<String>,
    counter: u64,
}

impl SequenceNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SequenceNames {
            queue: names.into_iter().map(Into::into).collect(),
            counter: 0,
        }
    }
}

impl UniqueNameProvider for SequenceNames {
    fn next_name(&mut self) -> String {
        if let Some(name) = self.queue.pop_front() {
            return name;
        }
        self.counter += 1;
        format!("{:0width$}", self.counter, width = NAME_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_names_alphabet() {
        let mut names = RandomNames::default();
        let name = names.next_name();
        assert_eq!(name.len(), NAME_LENGTH);
        assert!(name
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase()));
    }

    #[test]
    fn test_sequence_then_counter() {
        let mut names = SequenceNames::new(["AAAA", "BBBB"]);
        assert_eq!(names.next_name(), "AAAA");
        assert_eq!(names.next_name(), "BBBB");
        assert_eq!(names.next_name(), "0000000000000001");
        assert_eq!(names.next_name(), "0000000000000002");
    }
}
