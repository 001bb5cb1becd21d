//! voiceprintd - Speaker verification service.
//!
//! Enrolls speaker voiceprints and matches audio against them. Embedding
//! extraction is delegated to an encoder sidecar; this service owns decode,
//! storage, and cosine-similarity matching.

mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use scribegear_voiceprint::{DirStore, Matcher, RemoteEncoder};

/// Speaker verification service.
#[derive(Parser, Debug)]
#[command(name = "voiceprintd")]
#[command(about = "Speaker verification service")]
struct Args {
    /// Listen address (e.g. :8091 or 127.0.0.1:8091)
    #[arg(long, default_value = ":8091")]
    addr: String,

    /// Voiceprint storage directory (default: $SCRIBEGEAR_DATA or ./voiceprints)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Base URL of the speaker encoder sidecar
    #[arg(long, default_value = "http://127.0.0.1:8200")]
    encoder_url: String,

    /// Embedding dimension the encoder produces
    #[arg(long, default_value_t = 256)]
    encoder_dim: usize,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("SCRIBEGEAR_DATA").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("./voiceprints"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let dir = data_dir(args.data_dir);
    let store = DirStore::open(&dir)?;
    tracing::info!("voiceprintd: storing voiceprints under {}", dir.display());

    let encoder = RemoteEncoder::new(&args.encoder_url).with_dimension(args.encoder_dim);
    let matcher = Arc::new(Matcher::new(Arc::new(encoder), Arc::new(store)));

    server::serve(&args.addr, matcher).await
}
