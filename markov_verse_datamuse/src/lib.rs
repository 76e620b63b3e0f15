// markov_verse_datamuse — rhyme lookups against the Datamuse word API.
//
// Implements `markov_verse_lang::RhymeLookup` with a blocking HTTP client.
// Each lookup is one GET to `{base_url}/words?{relation}={word}`, where the
// relation code is `rel_rhy` for strict rhymes and `rel_nry` for near rhymes.
// The service answers with a JSON array of `{"word": ..., "score": ...}`
// objects ranked best first; only `word` is used and ranking is preserved.
//
// Every failure (connect error, non-2xx status, malformed body) comes back as
// a `RhymeLookupError`. The composer logs it and treats it as "no
// candidates", so a slow or missing service only costs rhyme quality. There
// is no retry and no timeout beyond the HTTP client's defaults.
//
// The base URL is configurable (`RhymeServiceConfig::base_url`) so tests can
// point the client at a local server.

use log::debug;
use markov_verse_lang::{RhymeCandidate, RhymeLookup, RhymeLookupError, RhymeRelation};
use reqwest::blocking::{Client, Request};
use serde::Deserialize;

/// One entry in a Datamuse `/words` response.
#[derive(Debug, Deserialize)]
struct DatamuseWord {
    word: String,
}

/// Query parameter naming the word relation to Datamuse.
pub fn relation_param(relation: RhymeRelation) -> &'static str {
    match relation {
        RhymeRelation::Strict => "rel_rhy",
        RhymeRelation::Near => "rel_nry",
    }
}

/// Parse a `/words` response body into ranked candidates.
pub fn parse_words(body: &str) -> Result<Vec<RhymeCandidate>, serde_json::Error> {
    let words: Vec<DatamuseWord> = serde_json::from_str(body)?;
    Ok(words
        .into_iter()
        .map(|w| RhymeCandidate::new(w.word))
        .collect())
}

/// Blocking Datamuse client.
#[derive(Debug, Clone)]
pub struct DatamuseClient {
    client: Client,
    base_url: String,
}

impl DatamuseClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("markov_verse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(DatamuseClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the GET request for one relation query.
    pub fn request(&self, relation: RhymeRelation, word: &str) -> Result<Request, reqwest::Error> {
        self.client
            .get(format!("{}/words", self.base_url))
            .query(&[(relation_param(relation), word)])
            .build()
    }
}

impl RhymeLookup for DatamuseClient {
    fn lookup_rhymes(
        &self,
        relation: RhymeRelation,
        word: &str,
    ) -> Result<Vec<RhymeCandidate>, RhymeLookupError> {
        let request = self
            .request(relation, word)
            .map_err(|e| RhymeLookupError::new(e.to_string()))?;
        debug!("GET {}", request.url());

        let body = self
            .client
            .execute(request)
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| RhymeLookupError::new(e.to_string()))?;

        let candidates = parse_words(&body)
            .map_err(|e| RhymeLookupError::new(format!("bad response body: {e}")))?;
        debug!("{relation} for '{word}': {} candidates", candidates.len());
        Ok(candidates)
    }
}
