// Rhyme resolution: normalizing words for rhyme matching and choosing a
// rhyming end word for a later line.
//
// The rhyme data itself comes from an external word-relation service. The
// core only sees it through the narrow `RhymeLookup` trait, so the choice
// policy below can be tested against a stub and the HTTP client lives in its
// own crate (`markov_verse_datamuse`).
//
// Policy (`get_rhyme`): normalize the source word, ask for strict rhymes,
// then near rhymes, and take the first candidate in service rank order that
// the chain can grow a line from and that hasn't already ended a line in
// this poem. Lookup failures are logged and treated as "no candidates"; an
// exhausted search returns `None` and the dependent line just gets a random
// ending.

use std::collections::BTreeSet;
use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::chain::ReverseChain;

/// Kind of word relation to ask the rhyme service for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RhymeRelation {
    /// Perfect rhyme ("moon" / "june").
    Strict,
    /// Approximate rhyme ("moon" / "tomb").
    Near,
}

impl RhymeRelation {
    /// Query order used when resolving a rhyme.
    pub const PRIORITY: [RhymeRelation; 2] = [RhymeRelation::Strict, RhymeRelation::Near];
}

impl fmt::Display for RhymeRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RhymeRelation::Strict => write!(f, "strict rhyme"),
            RhymeRelation::Near => write!(f, "near rhyme"),
        }
    }
}

/// One candidate returned by the rhyme service, best-ranked first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RhymeCandidate {
    pub word: String,
}

impl RhymeCandidate {
    pub fn new(word: impl Into<String>) -> Self {
        RhymeCandidate { word: word.into() }
    }
}

/// A rhyme lookup that could not be completed (network, HTTP status, bad
/// payload). Never escapes `get_rhyme`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhymeLookupError {
    pub message: String,
}

impl RhymeLookupError {
    pub fn new(message: impl Into<String>) -> Self {
        RhymeLookupError {
            message: message.into(),
        }
    }
}

impl fmt::Display for RhymeLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rhyme lookup failed: {}", self.message)
    }
}

impl std::error::Error for RhymeLookupError {}

/// Capability to fetch ranked rhyme candidates for a word.
pub trait RhymeLookup {
    fn lookup_rhymes(
        &self,
        relation: RhymeRelation,
        word: &str,
    ) -> Result<Vec<RhymeCandidate>, RhymeLookupError>;
}

/// A lookup that never has candidates. Every rhymed line falls back to a
/// random ending; useful offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRhymes;

impl RhymeLookup for NoRhymes {
    fn lookup_rhymes(
        &self,
        _relation: RhymeRelation,
        _word: &str,
    ) -> Result<Vec<RhymeCandidate>, RhymeLookupError> {
        Ok(Vec::new())
    }
}

/// Normalize a word for rhyme queries and repetition checks.
///
/// Strips surrounding ASCII punctuation, drops a contracted "'st", expands a
/// trailing "'d"/"'n" to "ed"/"en", expands "o'er"/"e'er" to "over"/"ever",
/// then keeps only ASCII letters. `"warm'd"` becomes `"warmed"`.
pub fn clean_for_rhyme(word: &str) -> String {
    let mut word = word
        .trim_matches(|c: char| c.is_ascii_punctuation())
        .to_string();

    // know'st -> know. Not a perfect rhyme form but close enough to query.
    if let Some(stripped) = word.strip_suffix("'st") {
        word = stripped.to_string();
    }

    if word.ends_with("'d") || word.ends_with("'n") {
        let split = word.len() - 2;
        word = format!("{}e{}", &word[..split], &word[split + 1..]);
    }

    let word = word.replace("o'e", "ove").replace("e'e", "eve");

    word.chars().filter(char::is_ascii_alphabetic).collect()
}

/// Pick a word to end a later line so that it rhymes with `word`.
///
/// Returns `None` when the word normalizes to nothing, when the service has
/// no usable candidate, or when every lookup fails.
pub fn get_rhyme<L: RhymeLookup + ?Sized>(
    word: &str,
    chain: &ReverseChain,
    used_rhyme_roots: &BTreeSet<String>,
    lookup: &L,
) -> Option<String> {
    let query = clean_for_rhyme(word);
    if query.is_empty() {
        debug!("'{word}' has no letters to rhyme on");
        return None;
    }

    for relation in RhymeRelation::PRIORITY {
        let candidates = match lookup.lookup_rhymes(relation, &query) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("{relation} lookup for '{query}': {e}");
                continue;
            }
        };
        let accepted = candidates
            .into_iter()
            .find(|c| chain.contains_word(&c.word) && !used_rhyme_roots.contains(&c.word));
        if let Some(candidate) = accepted {
            debug!("{relation} for '{query}': '{}'", candidate.word);
            return Some(candidate.word);
        }
    }

    debug!("no usable rhyme for '{query}'");
    None
}
