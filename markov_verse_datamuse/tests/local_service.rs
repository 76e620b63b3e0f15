// Integration tests against a local stand-in for the Datamuse API.
//
// A `tiny_http` server on 127.0.0.1 answers `/words` queries from a fixed
// table, or with an HTTP error, so the client and the composer's rhyme
// hand-off are exercised over real HTTP without touching the network.

use std::net::SocketAddr;
use std::thread::JoinHandle;

use markov_verse_datamuse::DatamuseClient;
use markov_verse_lang::{
    LineLengths, PoemComposer, PoemItem, PoemSettings, ReverseChain, RhymeLookup, RhymeRelation,
};
use markov_verse_prng::VerseRng;
use tiny_http::{Header, Response, Server};

/// Start a server that handles `requests` requests, answering each with
/// `respond(url)` as `(status, body)`. Returns its address and the handle
/// yielding every URL it saw.
fn serve<F>(requests: usize, respond: F) -> (SocketAddr, JoinHandle<Vec<String>>)
where
    F: Fn(&str) -> (u16, String) + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = std::thread::spawn(move || {
        let mut seen = Vec::new();
        for _ in 0..requests {
            let request = server.recv().unwrap();
            let url = request.url().to_string();
            let (status, body) = respond(&url);
            let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
            request
                .respond(
                    Response::from_string(body)
                        .with_status_code(status)
                        .with_header(header),
                )
                .unwrap();
            seen.push(url);
        }
        seen
    });
    (addr, handle)
}

#[test]
fn fetches_ranked_candidates() {
    let (addr, handle) = serve(1, |_| {
        (
            200,
            r#"[{"word":"light","score":900},{"word":"bright","score":800}]"#.to_string(),
        )
    });
    let client = DatamuseClient::new(format!("http://{addr}")).unwrap();

    let words: Vec<String> = client
        .lookup_rhymes(RhymeRelation::Strict, "night")
        .unwrap()
        .into_iter()
        .map(|c| c.word)
        .collect();
    assert_eq!(words, vec!["light", "bright"]);

    let seen = handle.join().unwrap();
    assert_eq!(seen, vec!["/words?rel_rhy=night"]);
}

#[test]
fn http_error_is_lookup_error() {
    let (addr, handle) = serve(1, |_| (503, "unavailable".to_string()));
    let client = DatamuseClient::new(format!("http://{addr}")).unwrap();
    let err = client
        .lookup_rhymes(RhymeRelation::Near, "day")
        .unwrap_err();
    assert!(err.message.contains("503"), "{err}");
    handle.join().unwrap();
}

#[test]
fn malformed_body_is_lookup_error() {
    let (addr, handle) = serve(1, |_| (200, "not json".to_string()));
    let client = DatamuseClient::new(format!("http://{addr}")).unwrap();
    assert!(client.lookup_rhymes(RhymeRelation::Strict, "day").is_err());
    handle.join().unwrap();
}

#[test]
fn unreachable_service_is_lookup_error() {
    // Bind then drop a server so the port is very likely closed.
    let addr = {
        let server = Server::http("127.0.0.1:0").unwrap();
        server.server_addr().to_ip().unwrap()
    };
    let client = DatamuseClient::new(format!("http://{addr}")).unwrap();
    assert!(client.lookup_rhymes(RhymeRelation::Strict, "day").is_err());
}

#[test]
fn composer_uses_service_rhyme() {
    // Strict rhymes come back empty; near rhymes offer one corpus word.
    let (addr, handle) = serve(2, |url| {
        if url.contains("rel_rhy=") {
            (200, "[]".to_string())
        } else {
            (200, r#"[{"word":"moon"}]"#.to_string())
        }
    });
    let client = DatamuseClient::new(format!("http://{addr}")).unwrap();

    // Every line ending is "tune", so the first line always ends on it.
    let chain = ReverseChain::from_texts(&["a silver tune", "beneath the moon we hum a tune"]);
    let settings = PoemSettings::from_rhyme_scheme("aa", &LineLengths::Uniform(3)).unwrap();
    let mut rng = VerseRng::new(5);
    let items = PoemComposer::new(&chain, &settings, &client)
        .compose(&mut rng)
        .unwrap();

    let ends: Vec<&str> = items
        .iter()
        .filter_map(|item| match item {
            PoemItem::Line(words) => words.last().map(String::as_str),
            PoemItem::StanzaBreak => None,
        })
        .collect();
    assert_eq!(ends, vec!["tune", "moon"]);

    let seen = handle.join().unwrap();
    assert_eq!(seen, vec!["/words?rel_rhy=tune", "/words?rel_nry=tune"]);
}
