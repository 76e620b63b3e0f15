// Markov Verse language crate: rhyming, metered poems from a reverse Markov
// chain.
//
// Lines are built right to left. A line's end word is fixed first (either a
// random corpus line ending or a rhyme for an earlier line), then earlier
// words are sampled from word-pair statistics learned in reverse. The rhyme
// scheme decides how long each line is, where stanzas break, and which line
// hands a rhyme to which.
//
// Architecture:
// - `scheme.rs`: Rhyme scheme parsing and `PoemSettings` (line lengths,
//   stanza breaks, rhyme successor map)
// - `chain.rs`: `ReverseChain` — successor -> predecessor counts, line
//   endings, weighted backward sampling, sentence generation
// - `rhyme.rs`: `clean_for_rhyme` normalization, the `RhymeLookup` capability,
//   and the `get_rhyme` candidate policy
// - `composer.rs`: `ComposerSession` per-poem state and the lazy `Poem`
//   iterator driven by `PoemComposer`
// - `corpus.rs`: Corpus sources (files, built-in texts) and blank-line block
//   splitting
// - `config.rs`: `PoemConfig`, loaded from JSON
// - `error.rs`: `VerseError`
//
// Determinism constraint: all randomness goes through a caller-supplied
// `markov_verse_prng::VerseRng`, and every table iterates in sorted order.
// Given the same corpus, seed, and rhyme answers, output is identical.

pub mod chain;
pub mod composer;
pub mod config;
pub mod corpus;
pub mod error;
pub mod rhyme;
pub mod scheme;

// Re-export key types at crate root for convenience.
pub use chain::{Predecessor, ReverseChain};
pub use composer::{ComposerSession, Poem, PoemComposer, PoemItem, format_line};
pub use config::{PoemConfig, RhymeServiceConfig};
pub use corpus::{BuiltinCorpus, CorpusSource, FileCorpus};
pub use error::VerseError;
pub use rhyme::{
    NoRhymes, RhymeCandidate, RhymeLookup, RhymeLookupError, RhymeRelation, clean_for_rhyme,
    get_rhyme,
};
pub use scheme::{LineLengths, PoemSettings, RhymeScheme, parse_rhyme_scheme};
