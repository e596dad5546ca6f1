//! persistfs CLI
//!
//! Command-line interface for inspecting and editing a storage directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use persistfs::{Config, FilesystemStorage, TextEncoding};
use tracing_subscriber::{fmt, EnvFilter};

/// persistfs CLI
#[derive(Parser, Debug)]
#[command(name = "persistfs-cli")]
#[command(about = "CLI for a persistfs storage directory")]
#[command(version)]
struct Args {
    /// Storage directory (defaults to <documents>/persistStore)
    #[arg(short, long)]
    storage_path: Option<PathBuf>,

    /// Text encoding of stored values (utf8, ascii)
    #[arg(short, long, default_value = "utf8")]
    encoding: TextEncoding,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// List all keys
    Keys,

    /// Delete every key
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,persistfs=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut builder = Config::builder().encoding(args.encoding);
    if let Some(path) = args.storage_path {
        builder = builder.storage_path(path);
    }
    let config = builder.build();

    tracing::debug!("persistfs CLI v{}", persistfs::VERSION);
    tracing::debug!("Storage directory: {:?}", config.storage_path);

    let store = FilesystemStorage::new(config);

    let outcome = match args.command {
        Commands::Get { key } => store.get_item(&key).await.map(|value| match value {
            Some(value) => {
                println!("{}", value);
                ExitCode::SUCCESS
            }
            None => ExitCode::FAILURE,
        }),
        Commands::Set { key, value } => store.set_item(&key, &value).await.map(|_| ExitCode::SUCCESS),
        Commands::Del { key } => store.remove_item(&key).await.map(|_| ExitCode::SUCCESS),
        Commands::Keys => store.get_all_keys().await.map(|keys| {
            for key in keys {
                println!("{}", key);
            }
            ExitCode::SUCCESS
        }),
        Commands::Clear => store.clear().await.map(|cleared| {
            if !cleared {
                tracing::info!("Nothing to clear");
            }
            ExitCode::SUCCESS
        }),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
