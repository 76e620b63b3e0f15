// Construction-time configuration for poem generation.
//
// `PoemConfig` is loaded from JSON (every field optional, missing fields take
// their defaults) and names which corpora to train on, the rhyme scheme, the
// line lengths, the seed, and where the rhyme service lives. Nothing here is
// consulted once generation has started.
//
// Named corpora resolve to configured files first and fall back to the
// texts compiled into the crate (see `corpus.rs`), so the default config
// works without any data on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chain::ReverseChain;
use crate::corpus::{BuiltinCorpus, CorpusSource, FileCorpus};
use crate::error::VerseError;
use crate::scheme::{LineLengths, PoemSettings};

/// Default Datamuse endpoint for rhyme lookups.
pub const DEFAULT_RHYME_SERVICE_URL: &str = "https://api.datamuse.com";

/// Where rhyme candidates come from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhymeServiceConfig {
    /// When false, every rhymed line gets a random ending.
    pub enabled: bool,
    /// Base URL of a Datamuse-compatible `/words` API.
    pub base_url: String,
}

impl Default for RhymeServiceConfig {
    fn default() -> Self {
        RhymeServiceConfig {
            enabled: true,
            base_url: DEFAULT_RHYME_SERVICE_URL.to_string(),
        }
    }
}

/// Top-level poem configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoemConfig {
    /// Named corpus -> files holding it. Names absent here resolve to the
    /// built-in corpora.
    pub corpora: BTreeMap<String, Vec<PathBuf>>,
    /// Corpora to combine into one model.
    pub corpus: Vec<String>,
    pub scheme: String,
    pub line_lengths: LineLengths,
    /// Fixed seed for reproducible output. `None` lets the caller pick one.
    pub seed: Option<u64>,
    pub rhyme_service: RhymeServiceConfig,
}

impl Default for PoemConfig {
    fn default() -> Self {
        PoemConfig {
            corpora: BTreeMap::new(),
            corpus: vec!["shakespeare".to_string()],
            scheme: "aaaa/bbbb/cccc".to_string(),
            line_lengths: LineLengths::default(),
            seed: None,
            rhyme_service: RhymeServiceConfig::default(),
        }
    }
}

impl PoemConfig {
    pub fn from_json(json: &str) -> Result<Self, VerseError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, VerseError> {
        let data = std::fs::read_to_string(path).map_err(|source| VerseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    /// Layout for the configured scheme and line lengths.
    pub fn settings(&self) -> Result<PoemSettings, VerseError> {
        PoemSettings::from_rhyme_scheme(&self.scheme, &self.line_lengths)
    }

    /// Resolve the selected corpus names to sources.
    pub fn corpus_sources(&self) -> Result<Vec<Box<dyn CorpusSource>>, VerseError> {
        let mut sources: Vec<Box<dyn CorpusSource>> = Vec::new();
        for name in &self.corpus {
            match self.corpora.get(name) {
                Some(paths) => {
                    for path in paths {
                        sources.push(Box::new(FileCorpus::new(path)));
                    }
                }
                None => {
                    let builtin = BuiltinCorpus::named(name)
                        .ok_or_else(|| VerseError::UnknownCorpus(name.clone()))?;
                    sources.push(Box::new(builtin));
                }
            }
        }
        Ok(sources)
    }

    /// Build the model from the selected corpora.
    pub fn build_chain(&self) -> Result<ReverseChain, VerseError> {
        let sources = self.corpus_sources()?;
        let refs: Vec<&dyn CorpusSource> = sources.iter().map(|s| s.as_ref()).collect();
        ReverseChain::from_sources(&refs)
    }
}
