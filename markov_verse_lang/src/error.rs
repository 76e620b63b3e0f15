// Error taxonomy for configuration-time failures.
//
// Only contract violations the caller can act on are surfaced here: a scheme
// whose explicit line lengths don't match its line count, a model that has
// nothing to sample from, and the I/O or JSON failures of loading corpora,
// configs, and saved models. Conditions that generation recovers from on its
// own (a word with no predecessor, a rhyme service that is down or has no
// usable answer) never become a `VerseError`; see `chain.rs` and `rhyme.rs`.

use std::fmt;
use std::path::PathBuf;

/// Errors surfaced to callers of the poem-generation API.
#[derive(Debug)]
pub enum VerseError {
    /// An explicit per-line length list doesn't match the scheme's line count.
    SchemeLengthMismatch { expected: usize, actual: usize },
    /// A line was configured with zero words. Every line needs at least its
    /// end word.
    ZeroLineLength { line: usize },
    /// The model has no transitions or no line endings, so there is nothing
    /// to sample a line from.
    EmptyModel,
    /// A named corpus has neither configured files nor a built-in text.
    UnknownCorpus(String),
    /// Reading or writing a file failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A config or saved model was not valid JSON for its type.
    Json(serde_json::Error),
}

impl fmt::Display for VerseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerseError::SchemeLengthMismatch { expected, actual } => write!(
                f,
                "rhyme scheme has {expected} lines but {actual} line lengths were given"
            ),
            VerseError::ZeroLineLength { line } => {
                write!(f, "line {line} has a length of zero words")
            }
            VerseError::EmptyModel => write!(
                f,
                "model has no word transitions or no line endings to generate from"
            ),
            VerseError::UnknownCorpus(name) => write!(f, "unknown corpus '{name}'"),
            VerseError::Io { path, source } => {
                write!(f, "I/O error on {}: {source}", path.display())
            }
            VerseError::Json(e) => write!(f, "invalid JSON: {e}"),
        }
    }
}

impl std::error::Error for VerseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VerseError::Io { source, .. } => Some(source),
            VerseError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for VerseError {
    fn from(e: serde_json::Error) -> Self {
        VerseError::Json(e)
    }
}
