// Rhyme scheme parsing and per-poem layout settings.
//
// A scheme string assigns each poem line to a rhyme group by label: every
// character other than `/` is a label and consumes one line slot; `/` inserts
// a stanza break before the next line and consumes nothing. "aabb/ccdd" is
// eight lines in two stanzas of couplets.
//
// Rhyme groups become a forward chain, not a clique: for a label at lines
// i1 < i2 < ... < ik the map holds i1 -> i2, i2 -> i3, ... . The composer
// only ever asks "which later line should rhyme with the line I just wrote",
// so each line hands its obligation to exactly one successor.
//
// `PoemSettings` combines a parsed scheme with line lengths and is the
// read-only layout the composer walks (see `composer.rs`).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::VerseError;

/// Marks a stanza break before the next line.
pub const STANZA_BREAK: char = '/';

/// The structure of a rhyme scheme string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RhymeScheme {
    /// Total number of lines (count of non-`/` characters).
    pub line_count: usize,
    /// Line index -> next line index in the same rhyme group.
    pub rhyme_map: BTreeMap<usize, usize>,
    /// Line indices that are preceded by a blank line.
    pub break_lines: BTreeSet<usize>,
}

/// Parse a compact rhyme scheme string. Pure and infallible: any character
/// is a valid label, and the empty string is a zero-line poem.
pub fn parse_rhyme_scheme(scheme: &str) -> RhymeScheme {
    let mut line_num = 0usize;
    let mut groups: BTreeMap<char, Vec<usize>> = BTreeMap::new();
    let mut break_lines = BTreeSet::new();

    for c in scheme.chars() {
        if c == STANZA_BREAK {
            break_lines.insert(line_num);
            continue;
        }
        groups.entry(c).or_default().push(line_num);
        line_num += 1;
    }

    let mut rhyme_map = BTreeMap::new();
    for lines in groups.values() {
        for pair in lines.windows(2) {
            rhyme_map.insert(pair[0], pair[1]);
        }
    }

    RhymeScheme {
        line_count: line_num,
        rhyme_map,
        break_lines,
    }
}

/// Words per line: one length for every line, or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineLengths {
    Uniform(usize),
    PerLine(Vec<usize>),
}

impl Default for LineLengths {
    fn default() -> Self {
        LineLengths::Uniform(7)
    }
}

impl LineLengths {
    /// Expand to one length per line.
    ///
    /// An explicit list must have exactly `line_count` entries; it is never
    /// truncated or padded.
    pub fn resolve(&self, line_count: usize) -> Result<Vec<usize>, VerseError> {
        let lengths = match self {
            LineLengths::Uniform(n) => vec![*n; line_count],
            LineLengths::PerLine(list) => {
                if list.len() != line_count {
                    return Err(VerseError::SchemeLengthMismatch {
                        expected: line_count,
                        actual: list.len(),
                    });
                }
                list.clone()
            }
        };
        if let Some(line) = lengths.iter().position(|&n| n == 0) {
            return Err(VerseError::ZeroLineLength { line });
        }
        Ok(lengths)
    }
}

/// Layout of one poem: how long each line is, where stanzas break, and which
/// lines pass a rhyme on to which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoemSettings {
    /// One entry per line; its length is the poem's line count.
    pub line_lengths: Vec<usize>,
    pub break_lines: BTreeSet<usize>,
    pub rhyme_map: BTreeMap<usize, usize>,
}

impl PoemSettings {
    /// Build settings from a scheme string and a line-length specification.
    pub fn from_rhyme_scheme(scheme: &str, lengths: &LineLengths) -> Result<Self, VerseError> {
        let parsed = parse_rhyme_scheme(scheme);
        let line_lengths = lengths.resolve(parsed.line_count)?;
        Ok(PoemSettings {
            line_lengths,
            break_lines: parsed.break_lines,
            rhyme_map: parsed.rhyme_map,
        })
    }

    pub fn line_count(&self) -> usize {
        self.line_lengths.len()
    }
}
