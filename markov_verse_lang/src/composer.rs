// Poem composition: walks the lines of a `PoemSettings` layout in order,
// choosing each line's end word and growing the line backward from it.
//
// Per line:
// 1. Emit a stanza break first if the layout asks for one.
// 2. End word: the rhyme an earlier line left for this one, or else a random
//    corpus line ending.
// 3. Record the end word's rhyme root so no later rhyme repeats it.
// 4. Grow the line with `ReverseChain::generate_sentence`.
// 5. If a later line rhymes with this one, resolve a rhyme for this line's
//    last word and leave it for that line. No rhyme found means that line
//    gets a random ending.
//
// Lines must be produced strictly in order: step 5 writes what step 2 of a
// later line reads. All mutable state for one poem lives in a
// `ComposerSession`, which is created fresh per poem and threaded through
// `compose_line` explicitly. The chain and settings are only borrowed, so
// several poems can be composed at once from one model as long as each has
// its own session and RNG.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::debug;
use markov_verse_prng::VerseRng;

use crate::chain::ReverseChain;
use crate::error::VerseError;
use crate::rhyme::{RhymeLookup, clean_for_rhyme, get_rhyme};
use crate::scheme::PoemSettings;

/// One unit of poem output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoemItem {
    /// A blank line between stanzas.
    StanzaBreak,
    /// One line as lower-cased word tokens.
    Line(Vec<String>),
}

impl fmt::Display for PoemItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoemItem::StanzaBreak => Ok(()),
            PoemItem::Line(words) => write!(f, "{}", format_line(words)),
        }
    }
}

/// Join a line's words with single spaces and capitalize it for display.
pub fn format_line(words: &[String]) -> String {
    capitalize(&words.join(" "))
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => {
            let upper: String = c.to_uppercase().collect();
            format!("{}{}", upper, chars.as_str().to_lowercase())
        }
    }
}

/// Per-poem mutable state. Single use: start a new session for each poem.
#[derive(Debug, Clone, Default)]
pub struct ComposerSession {
    /// Line index -> end word an earlier line chose for it to rhyme with.
    pending_rhyme_words: BTreeMap<usize, String>,
    /// Normalized end words already placed in this poem.
    used_rhyme_roots: BTreeSet<String>,
}

impl ComposerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_rhyme_words(&self) -> &BTreeMap<usize, String> {
        &self.pending_rhyme_words
    }

    pub fn used_rhyme_roots(&self) -> &BTreeSet<String> {
        &self.used_rhyme_roots
    }

    /// Compose line `line_num` of the layout. Callers must go through the
    /// lines in ascending order for rhymes to carry forward.
    pub fn compose_line<L: RhymeLookup + ?Sized>(
        &mut self,
        line_num: usize,
        chain: &ReverseChain,
        settings: &PoemSettings,
        lookup: &L,
        rng: &mut VerseRng,
    ) -> Result<Vec<String>, VerseError> {
        let end = match self.pending_rhyme_words.remove(&line_num) {
            Some(rhyme) => rhyme,
            None => chain
                .random_ending(rng)
                .ok_or(VerseError::EmptyModel)?
                .to_string(),
        };
        self.used_rhyme_roots.insert(clean_for_rhyme(&end));

        let length = settings.line_lengths.get(line_num).copied().unwrap_or(0);
        let line = chain.generate_sentence(&end, length, rng)?;

        if let (Some(&next), Some(last)) = (settings.rhyme_map.get(&line_num), line.last()) {
            match get_rhyme(last, chain, &self.used_rhyme_roots, lookup) {
                Some(rhyme) => {
                    debug!("line {next} will end with '{rhyme}' to rhyme with '{last}'");
                    self.pending_rhyme_words.insert(next, rhyme);
                }
                None => debug!("line {next} gets a random ending; nothing rhymes with '{last}'"),
            }
        }

        Ok(line)
    }
}

/// Composes poems of one layout from one chain using one rhyme lookup.
pub struct PoemComposer<'a, L: ?Sized> {
    chain: &'a ReverseChain,
    settings: &'a PoemSettings,
    lookup: &'a L,
}

impl<L: ?Sized> Clone for PoemComposer<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: ?Sized> Copy for PoemComposer<'_, L> {}

impl<'a, L: RhymeLookup + ?Sized> PoemComposer<'a, L> {
    pub fn new(chain: &'a ReverseChain, settings: &'a PoemSettings, lookup: &'a L) -> Self {
        PoemComposer {
            chain,
            settings,
            lookup,
        }
    }

    /// Start a new poem. Lines are generated lazily as the returned iterator
    /// is advanced.
    ///
    /// Fails with `EmptyModel` if the layout has lines but the chain has
    /// nothing to sample from.
    pub fn poem<'r>(&self, rng: &'r mut VerseRng) -> Result<Poem<'a, 'r, L>, VerseError> {
        if self.settings.line_count() > 0 && self.chain.is_empty() {
            return Err(VerseError::EmptyModel);
        }
        Ok(Poem {
            composer: *self,
            rng,
            session: ComposerSession::new(),
            next_line: 0,
            break_emitted: false,
            failed: false,
        })
    }

    /// Generate a whole poem eagerly.
    pub fn compose(&self, rng: &mut VerseRng) -> Result<Vec<PoemItem>, VerseError> {
        self.poem(rng)?.collect()
    }
}

/// A poem being generated. Yields stanza breaks and lines in order, then
/// ends. Stops after the first error.
pub struct Poem<'a, 'r, L: ?Sized> {
    composer: PoemComposer<'a, L>,
    rng: &'r mut VerseRng,
    session: ComposerSession,
    next_line: usize,
    /// Whether the break before `next_line` has already been yielded.
    break_emitted: bool,
    failed: bool,
}

impl<L: ?Sized> Poem<'_, '_, L> {
    /// State of the poem so far.
    pub fn session(&self) -> &ComposerSession {
        &self.session
    }
}

impl<L: RhymeLookup + ?Sized> Iterator for Poem<'_, '_, L> {
    type Item = Result<PoemItem, VerseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let settings = self.composer.settings;
        if self.failed || self.next_line >= settings.line_count() {
            return None;
        }

        let line_num = self.next_line;
        if settings.break_lines.contains(&line_num) && !self.break_emitted {
            self.break_emitted = true;
            return Some(Ok(PoemItem::StanzaBreak));
        }

        let result = self.session.compose_line(
            line_num,
            self.composer.chain,
            settings,
            self.composer.lookup,
            self.rng,
        );
        self.next_line += 1;
        self.break_emitted = false;
        match result {
            Ok(line) => Some(Ok(PoemItem::Line(line))),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
