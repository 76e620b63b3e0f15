// Corpus sources: where training text comes from and how it is cut into
// blocks.
//
// A corpus file holds one or more poems separated by blank lines. Each poem
// (block) is handed to `ReverseChain` separately so word chains never run
// from the end of one poem into the start of the next.
//
// `CorpusSource` is the pluggable seam: files on disk (`FileCorpus`), texts
// compiled into the binary (`BuiltinCorpus`), or anything a caller provides.
// The built-in corpora are embedded with `include_str!` so the CLI and tests
// can generate poems without any data files present.

use std::path::{Path, PathBuf};

use crate::error::VerseError;

/// Names of the corpora compiled into the crate.
pub const BUILTIN_CORPORA: &[&str] = &["shakespeare", "blake"];

/// A provider of raw corpus text, already split into blocks.
pub trait CorpusSource {
    /// Human-readable name for logs.
    fn name(&self) -> String;

    fn blocks(&self) -> Result<Vec<String>, VerseError>;
}

/// Split text into blocks at blank lines. A blank line is one that is empty
/// apart from a trailing `\r`; runs of them count as a single delimiter.
pub fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        if line.trim_end_matches('\r').is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }
    blocks
}

/// A UTF-8 text file of blank-line-separated poems.
#[derive(Debug, Clone)]
pub struct FileCorpus {
    pub path: PathBuf,
}

impl FileCorpus {
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileCorpus {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CorpusSource for FileCorpus {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn blocks(&self) -> Result<Vec<String>, VerseError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| VerseError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(split_blocks(&text))
    }
}

/// One of the corpora embedded at compile time.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinCorpus {
    name: &'static str,
    text: &'static str,
}

impl BuiltinCorpus {
    /// Look up a built-in corpus by case-insensitive name.
    pub fn named(name: &str) -> Option<Self> {
        let text = match name.to_lowercase().as_str() {
            "shakespeare" => include_str!("../../data/corpora/shakespeare.txt"),
            "blake" => include_str!("../../data/corpora/blake.txt"),
            _ => return None,
        };
        let name = BUILTIN_CORPORA
            .iter()
            .copied()
            .find(|n| n.eq_ignore_ascii_case(name))?;
        Some(BuiltinCorpus { name, text })
    }
}

impl CorpusSource for BuiltinCorpus {
    fn name(&self) -> String {
        format!("builtin:{}", self.name)
    }

    fn blocks(&self) -> Result<Vec<String>, VerseError> {
        Ok(split_blocks(self.text))
    }
}
