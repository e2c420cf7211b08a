//! Digest files concurrently and print their SHA-256 hashes.
//!
//! Reads every file named on the command line across a fixed number of
//! concurrent chunks, then prints `<hex digest>  <path>` lines in the order
//! the paths were given. A single unreadable file fails the whole run and
//! cancels any reads still in flight.

use clap::{value_parser, Arg, ArgAction, Command};
use parcel::Fanout;
use sha2::{Digest, Sha256};
use std::{num::NonZeroUsize, path::PathBuf, process};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
enum Error {
    #[error("read {}: {}", path.display(), source)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Encode bytes as lowercase hex.
fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

async fn run(paths: Vec<PathBuf>, chunks: NonZeroUsize) -> Result<(), Error> {
    let fanout = Fanout::new(chunks);
    debug!(files = paths.len(), chunks = chunks.get(), "digesting");
    let digests = fanout
        .try_map(&paths, |path| async move {
            let bytes = tokio::fs::read(&path).await.map_err(|source| Error::Read {
                path: path.clone(),
                source,
            })?;
            Ok((path, Sha256::digest(&bytes)))
        })
        .await?;

    for (path, digest) in digests {
        println!("{}  {}", hex(&digest), path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let matches = Command::new("parcel-digest")
        .about("Hash files concurrently and print their SHA-256 digests")
        .arg(
            Arg::new("files")
                .value_parser(value_parser!(PathBuf))
                .num_args(1..)
                .required(true)
                .help("Files to digest"),
        )
        .arg(
            Arg::new("chunks")
                .long("chunks")
                .value_parser(value_parser!(usize))
                .help("Number of concurrent chunks (defaults to available CPUs)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .get_matches();

    // Initialize logging
    let level = if matches.get_flag("verbose") {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();
    let paths: Vec<PathBuf> = matches
        .get_many::<PathBuf>("files")
        .unwrap()
        .cloned()
        .collect();
    let chunks = match matches.get_one::<usize>("chunks") {
        Some(&chunks) => match NonZeroUsize::new(chunks) {
            Some(chunks) => chunks,
            None => {
                eprintln!("--chunks must be at least 1");
                process::exit(1);
            }
        },
        None => Fanout::default().chunks(),
    };

    if let Err(err) = run(paths, chunks).await {
        eprintln!("{err}");
        process::exit(1);
    }
}
