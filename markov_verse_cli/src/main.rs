// Markov Verse — CLI entry point.
//
// Builds a reverse Markov chain from one or more corpora and prints rhyming
// poems to stdout. Logs go to stderr so output can be piped.
// The pipeline: config + flags → model (built or loaded) → poem layout →
// composer with Datamuse (or offline) rhymes → capitalized lines.
//
// Usage:
//   cargo run -p markov_verse_cli -- [--config poem.json] [--corpus NAME]...
//     [--corpus-file PATH]... [--scheme "aabb/ccdd"] [--line-length N |
//     --line-lengths 4,5,6,...] [--seed N] [--poems N] [--offline]
//     [--rhyme-url URL] [--model PATH] [--save-model PATH] [--log-level LEVEL]
//
// Built-in corpora: shakespeare, blake

use std::io::Write;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use markov_verse_datamuse::DatamuseClient;
use markov_verse_lang::{
    LineLengths, NoRhymes, PoemComposer, PoemConfig, ReverseChain, RhymeLookup,
};
use markov_verse_prng::VerseRng;

/// Corpus name used for files given with `--corpus-file`.
const CLI_FILES_CORPUS: &str = "files";

#[derive(Debug, Parser)]
#[command(name = "compose")]
#[command(about = "Generate rhyming poems from a reverse Markov chain")]
struct Args {
    /// JSON config file; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named corpus to train on (repeatable)
    #[arg(long)]
    corpus: Vec<String>,

    /// Corpus text file to train on (repeatable)
    #[arg(long)]
    corpus_file: Vec<PathBuf>,

    /// Rhyme scheme, e.g. "aabb/ccdd"
    #[arg(long)]
    scheme: Option<String>,

    /// Words per line, for every line
    #[arg(long, conflicts_with = "line_lengths")]
    line_length: Option<usize>,

    /// Words per line, one entry per line
    #[arg(long, value_delimiter = ',')]
    line_lengths: Option<Vec<usize>>,

    /// Seed for reproducible poems (default: from the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of poems to generate
    #[arg(long, default_value_t = 1)]
    poems: usize,

    /// Skip the rhyme service; rhymed lines get random endings
    #[arg(long)]
    offline: bool,

    /// Base URL of the rhyme service
    #[arg(long)]
    rhyme_url: Option<String>,

    /// Load a saved model instead of building one from corpora
    #[arg(long)]
    model: Option<PathBuf>,

    /// Save the model as JSON after building it
    #[arg(long)]
    save_model: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    let config = load_config(&args)?;
    let settings = config.settings().context("invalid poem layout")?;

    let chain = match &args.model {
        Some(path) => ReverseChain::load(path)
            .with_context(|| format!("failed to load model from {}", path.display()))?,
        None => config.build_chain().context("failed to build model")?,
    };
    if let Some(path) = &args.save_model {
        chain
            .save(path)
            .with_context(|| format!("failed to save model to {}", path.display()))?;
        info!("saved model to {}", path.display());
    }

    let seed = config.seed.unwrap_or_else(clock_seed);
    info!("seed: {seed}");
    let mut rng = VerseRng::new(seed);

    let lookup: Box<dyn RhymeLookup> = if config.rhyme_service.enabled {
        let client = DatamuseClient::new(config.rhyme_service.base_url.clone())
            .context("failed to create rhyme service client")?;
        Box::new(client)
    } else {
        Box::new(NoRhymes)
    };

    let composer = PoemComposer::new(&chain, &settings, lookup.as_ref());
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for i in 0..args.poems {
        if i > 0 {
            writeln!(out)?;
            writeln!(out)?;
        }
        for item in composer.poem(&mut rng)? {
            writeln!(out, "{}", item?)?;
        }
    }
    Ok(())
}

/// Start from the config file (or defaults) and apply flag overrides.
fn load_config(args: &Args) -> Result<PoemConfig> {
    let mut config = match &args.config {
        Some(path) => PoemConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PoemConfig::default(),
    };
    apply_overrides(&mut config, args);
    Ok(config)
}

fn apply_overrides(config: &mut PoemConfig, args: &Args) {
    let mut selected = args.corpus.clone();
    if !args.corpus_file.is_empty() {
        config
            .corpora
            .insert(CLI_FILES_CORPUS.to_string(), args.corpus_file.clone());
        selected.push(CLI_FILES_CORPUS.to_string());
    }
    if !selected.is_empty() {
        config.corpus = selected;
    }
    if let Some(scheme) = &args.scheme {
        config.scheme = scheme.clone();
    }
    if let Some(n) = args.line_length {
        config.line_lengths = LineLengths::Uniform(n);
    }
    if let Some(lengths) = &args.line_lengths {
        config.line_lengths = LineLengths::PerLine(lengths.clone());
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.offline {
        config.rhyme_service.enabled = false;
    }
    if let Some(url) = &args.rhyme_url {
        config.rhyme_service.base_url = url.clone();
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
