use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use torrent_codec::config::Config;
use torrent_codec::engine;

#[derive(Parser)]
#[command(name = "torrent-codec", version, about = "Inspect bencoded data and torrent files")]
struct Cli {
    /// Configuration file, created with defaults when missing
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a bencoded string and print it as JSON
    Decode { value: String },
    /// Print a bencoded file as JSON
    DumpJson { file: PathBuf },
    /// Summarise a torrent file
    Info {
        file: PathBuf,
        /// List every piece with its size and hash
        #[arg(long)]
        show_piece_hash: bool,
    },
    /// Ask a tracker for peers
    Peers {
        file: PathBuf,
        /// Index into the torrent's tracker list, 0 being `announce`
        #[arg(long, default_value_t = 0)]
        tracker: usize,
    },
    /// Check a file or folder against the torrent's piece hashes
    Verify { file: PathBuf, path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("unable to load configuration")?;
    let options = engine::load_options(&config);
    let mut out = io::stdout();

    match cli.command {
        Command::Decode { value } => engine::decode(&value, &mut out),
        Command::DumpJson { file } => engine::dump_json(&file, &mut out),
        Command::Info { file, show_piece_hash } => engine::info(&file, options, show_piece_hash, &mut out),
        Command::Peers { file, tracker } => engine::peers(&file, tracker, &config, &mut out).await,
        Command::Verify { file, path } => engine::verify(&file, &path, options, None, &mut out).map(|_| ()),
    }
}
