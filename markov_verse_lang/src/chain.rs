// Reverse word-adjacency Markov chain.
//
// A forward chain picks a start word and walks toward an ending it can't
// control. Poems need the opposite: the end word is fixed first (so it can
// rhyme) and the line is grown leftward from it. The table is therefore
// keyed by the *successor* word and maps each preceding word to how often it
// appeared directly before it:
//
//   "How are you are you good"
//     are  -> {how: 1, you: 1}
//     you  -> {are: 2}
//     good -> {you: 1}
//
// Transitions are learned from each text block's flattened token stream, so
// a chain may cross a line break within a block. Line endings are collected
// per line, since they seed rhyming positions and must be real line ends.
//
// Both tables use `BTreeMap`/`Vec` so iteration order, and with it every
// seeded sample, is identical across runs and platforms.
//
// The model is built once and then only read. `composer.rs` borrows it
// immutably, so one model can back any number of concurrent poems.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, info};
use markov_verse_prng::VerseRng;
use serde::{Deserialize, Serialize};

use crate::corpus::CorpusSource;
use crate::error::VerseError;

/// Preceding word -> number of times it appeared before the key word.
pub type PredecessorCounts = BTreeMap<String, u64>;

/// Result of looking up a word's predecessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predecessor<'a> {
    Found(&'a str),
    /// The word never appeared after another word in the corpus.
    NotFound,
}

/// Word-pair statistics indexed by successor, plus every observed line end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseChain {
    /// Invariant: no entry has an empty predecessor map.
    transitions: BTreeMap<String, PredecessorCounts>,
    /// Lower-cased last token of every non-empty line. Duplicates are kept so
    /// common endings are drawn proportionally more often.
    line_endings: Vec<String>,
}

impl ReverseChain {
    /// Build a chain from in-memory text blocks (poems or stanzas).
    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
        let mut chain = ReverseChain::default();
        for text in texts {
            chain.learn_block(text.as_ref());
        }
        info!(
            "built reverse chain: {} words with predecessors, {} line endings",
            chain.transitions.len(),
            chain.line_endings.len()
        );
        chain
    }

    /// Build a chain from one or more corpus sources, each split into blocks
    /// at blank lines.
    pub fn from_sources(sources: &[&dyn CorpusSource]) -> Result<Self, VerseError> {
        let mut blocks = Vec::new();
        for source in sources {
            let mut source_blocks = source.blocks()?;
            debug!("corpus {}: {} blocks", source.name(), source_blocks.len());
            blocks.append(&mut source_blocks);
        }
        Ok(Self::from_texts(&blocks))
    }

    fn learn_block(&mut self, text: &str) {
        let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
        for pair in words.windows(2) {
            let (prev, word) = (&pair[0], &pair[1]);
            *self
                .transitions
                .entry(word.clone())
                .or_default()
                .entry(prev.clone())
                .or_insert(0) += 1;
        }

        for line in text.lines() {
            if let Some(last) = line.split_whitespace().next_back() {
                self.line_endings.push(last.to_lowercase());
            }
        }
    }

    /// The full successor -> predecessor-count table.
    pub fn transitions(&self) -> &BTreeMap<String, PredecessorCounts> {
        &self.transitions
    }

    pub fn predecessors(&self, word: &str) -> Option<&PredecessorCounts> {
        self.transitions.get(word)
    }

    /// Whether `word` appeared after some other word, i.e. a line can be grown
    /// backward from it without falling back.
    pub fn contains_word(&self, word: &str) -> bool {
        self.transitions.contains_key(word)
    }

    pub fn line_endings(&self) -> &[String] {
        &self.line_endings
    }

    /// True when the chain can't produce a line: no transitions to walk or no
    /// endings to start from.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty() || self.line_endings.is_empty()
    }

    /// Sample a word that preceded `word`, weighted by occurrence count.
    pub fn sample_predecessor(&self, word: &str, rng: &mut VerseRng) -> Predecessor<'_> {
        let Some(counts) = self.transitions.get(word) else {
            return Predecessor::NotFound;
        };
        let weights: Vec<u64> = counts.values().copied().collect();
        match rng.weighted_index(&weights) {
            Some(i) => counts
                .keys()
                .nth(i)
                .map_or(Predecessor::NotFound, |w| Predecessor::Found(w.as_str())),
            None => Predecessor::NotFound,
        }
    }

    /// Uniformly pick any word that has recorded predecessors.
    pub fn random_word(&self, rng: &mut VerseRng) -> Option<&str> {
        let idx = rng.choose_index(self.transitions.len())?;
        self.transitions.keys().nth(idx).map(String::as_str)
    }

    /// Uniformly pick an observed line ending (duplicates weigh in).
    pub fn random_ending(&self, rng: &mut VerseRng) -> Option<&str> {
        let idx = rng.choose_index(self.line_endings.len())?;
        Some(self.line_endings[idx].as_str())
    }

    /// Generate a line of exactly `length` words ending in `end`.
    ///
    /// Walks backward from `end`, sampling a predecessor at each step. When a
    /// word has no predecessor the walk continues from a uniformly random
    /// known word instead, so the line always reaches full length. Errors
    /// only if that fallback is needed and the table is empty.
    pub fn generate_sentence(
        &self,
        end: &str,
        length: usize,
        rng: &mut VerseRng,
    ) -> Result<Vec<String>, VerseError> {
        let mut sentence = Vec::with_capacity(length);
        let mut current = end.to_string();
        for step in 0..length {
            if step > 0 {
                current = match self.sample_predecessor(&current, rng) {
                    Predecessor::Found(prev) => prev.to_string(),
                    Predecessor::NotFound => {
                        let fallback = self.random_word(rng).ok_or(VerseError::EmptyModel)?;
                        debug!("no predecessor for '{current}', restarting from '{fallback}'");
                        fallback.to_string()
                    }
                };
            }
            sentence.push(current.clone());
        }
        sentence.reverse();
        Ok(sentence)
    }

    /// Load a previously saved chain from JSON.
    pub fn load(path: &Path) -> Result<Self, VerseError> {
        let data = std::fs::read_to_string(path).map_err(|source| VerseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Save the chain as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), VerseError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| VerseError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> PredecessorCounts {
        pairs.iter().map(|&(w, n)| (w.to_string(), n)).collect()
    }

    #[test]
    fn builds_reversed_transitions() {
        let chain = ReverseChain::from_texts(&["How are you are you good"]);
        let expected: BTreeMap<String, PredecessorCounts> = [
            ("are".to_string(), counts(&[("how", 1), ("you", 1)])),
            ("you".to_string(), counts(&[("are", 2)])),
            ("good".to_string(), counts(&[("you", 1)])),
        ]
        .into_iter()
        .collect();
        assert_eq!(chain.transitions(), &expected);
        assert_eq!(chain.line_endings(), ["good"]);
    }

    #[test]
    fn transitions_cross_lines_but_endings_do_not() {
        let chain = ReverseChain::from_texts(&["The moon\nIs bright,\n\nand  cold"]);
        // "moon" -> "is" crosses the first line break.
        assert_eq!(chain.predecessors("is"), Some(&counts(&[("moon", 1)])));
        assert_eq!(chain.line_endings(), ["moon", "bright,", "cold"]);
        // Punctuation stays attached.
        assert!(chain.contains_word("bright,"));
        assert!(!chain.contains_word("bright"));
    }

    #[test]
    fn blocks_do_not_chain_into_each_other() {
        let chain = ReverseChain::from_texts(&["one two", "three four"]);
        assert!(!chain.contains_word("three"));
        assert_eq!(chain.line_endings(), ["two", "four"]);
    }

    #[test]
    fn whitespace_only_lines_are_not_endings() {
        let chain = ReverseChain::from_texts(&["a b\n   \r\nc d\r\n"]);
        assert_eq!(chain.line_endings(), ["b", "d"]);
    }

    #[test]
    fn no_empty_predecessor_maps() {
        let chain = ReverseChain::from_texts(&["x", "a b c a b", "\n\n"]);
        assert!(chain.transitions().values().all(|m| !m.is_empty()));
    }

    #[test]
    fn sample_predecessor_not_found() {
        let chain = ReverseChain::from_texts(&["How are you"]);
        let mut rng = VerseRng::new(1);
        assert_eq!(chain.sample_predecessor("how", &mut rng), Predecessor::NotFound);
        assert_eq!(chain.sample_predecessor("zebra", &mut rng), Predecessor::NotFound);
        assert_eq!(
            chain.sample_predecessor("you", &mut rng),
            Predecessor::Found("are")
        );
    }

    #[test]
    fn sample_predecessor_is_weighted() {
        // "c" is preceded by "a" three times and "b" once.
        let chain = ReverseChain::from_texts(&["a c a c a c b c"]);
        let mut rng = VerseRng::new(99);
        let n = 8000;
        let mut a = 0;
        for _ in 0..n {
            if chain.sample_predecessor("c", &mut rng) == Predecessor::Found("a") {
                a += 1;
            }
        }
        let pct = a as f64 / n as f64;
        assert!((0.70..0.80).contains(&pct), "expected ~75% 'a', got {pct}");
    }

    #[test]
    fn generate_sentence_has_exact_length_and_end() {
        let chain = ReverseChain::from_texts(&["the cat sat on the mat\nand the dog sat too"]);
        for seed in 0..50 {
            let mut rng = VerseRng::new(seed);
            for length in 1..10 {
                let line = chain.generate_sentence("sat", length, &mut rng).unwrap();
                assert_eq!(line.len(), length);
                assert_eq!(line.last().map(String::as_str), Some("sat"));
            }
        }
    }

    #[test]
    fn generate_sentence_falls_back_when_stuck() {
        // "alpha" has no predecessor, so every step past it must fall back.
        let chain = ReverseChain::from_texts(&["alpha beta"]);
        let mut rng = VerseRng::new(5);
        let line = chain.generate_sentence("beta", 6, &mut rng).unwrap();
        assert_eq!(line.len(), 6);
        assert_eq!(line[5], "beta");
        assert!(line.iter().all(|w| w == "alpha" || w == "beta"));
    }

    #[test]
    fn generate_sentence_from_unknown_end_word() {
        let chain = ReverseChain::from_texts(&["alpha beta gamma"]);
        let mut rng = VerseRng::new(5);
        let line = chain.generate_sentence("zeta", 3, &mut rng).unwrap();
        assert_eq!(line.len(), 3);
        assert_eq!(line[2], "zeta");
    }

    #[test]
    fn generate_sentence_on_empty_model_errors() {
        let chain = ReverseChain::from_texts(&["lonely"]);
        let mut rng = VerseRng::new(5);
        assert!(matches!(
            chain.generate_sentence("lonely", 2, &mut rng),
            Err(VerseError::EmptyModel)
        ));
        // A single word needs no predecessor.
        assert_eq!(
            chain.generate_sentence("lonely", 1, &mut rng).unwrap(),
            vec!["lonely".to_string()]
        );
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let chain = ReverseChain::from_texts(&["a b c d e f g a c e g b d f"]);
        let mut r1 = VerseRng::new(77);
        let mut r2 = VerseRng::new(77);
        for _ in 0..20 {
            assert_eq!(
                chain.generate_sentence("g", 5, &mut r1).unwrap(),
                chain.generate_sentence("g", 5, &mut r2).unwrap()
            );
        }
    }

    #[test]
    fn is_empty_needs_both_tables() {
        assert!(ReverseChain::from_texts::<&str>(&[]).is_empty());
        assert!(ReverseChain::from_texts(&["single"]).is_empty());
        assert!(!ReverseChain::from_texts(&["two words"]).is_empty());
    }

    #[test]
    fn save_and_load() {
        let chain = ReverseChain::from_texts(&["How are you are you good"]);
        let path = std::env::temp_dir().join(format!(
            "markov_verse_chain_{}.json",
            std::process::id()
        ));
        chain.save(&path).unwrap();
        let restored = ReverseChain::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(chain, restored);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = ReverseChain::load(Path::new("/nonexistent/markov_verse/model.json")).unwrap_err();
        assert!(matches!(err, VerseError::Io { .. }));
    }
}
