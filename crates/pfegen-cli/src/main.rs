use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pfegen_core::storage::FileStore;
use pfegen_core::PfeConfig;

/// pfegen: fill in a PFE report request, generate it on the report
/// service, preview the result and download the PDF.
///
/// The last successful request is kept locally so it can be regenerated
/// in a later session.
#[derive(Parser, Debug)]
#[command(name = "pfegen", version, about)]
struct Cli {
    /// Base URL of the report service (overrides the config file).
    #[arg(short, long)]
    server: Option<String>,

    /// Path of the local storage file (overrides the config file).
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // The TUI owns the terminal, so logs go to a file or nowhere.
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pfegen");
    let _ = std::fs::create_dir_all(&log_dir);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("pfegen.log"));

    match log_file {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
                )
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        Err(_) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("off"))
                .with_writer(std::io::sink)
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = PfeConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
        PfeConfig::default()
    });
    if let Some(server) = cli.server {
        config.server.base_url = server;
    }
    if let Some(storage) = cli.storage {
        config.storage.path = Some(storage);
    }

    let storage_path = match config.storage.path.clone() {
        Some(path) => path,
        None => FileStore::default_path()?,
    };

    tracing::info!(
        "Starting pfegen v{} against {} (storage: {})",
        env!("CARGO_PKG_VERSION"),
        config.server.base_url,
        storage_path.display()
    );

    let mut app = pfegen_tui::App::new(config, FileStore::new(storage_path));
    app.run().await?;

    tracing::info!("pfegen exited cleanly");
    Ok(())
}
