//! Command-line interface.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::browser::{self, Profile};
use crate::bridge;
use crate::controller::Controller;
use crate::relay::{ConfigStore, Relay};

#[derive(Parser)]
#[command(name = "leadscout")]
#[command(about = "Import social leads into your CRM pipeline while you browse")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Launch a browser session with import buttons injected
    Run {
        /// Page to open first
        #[arg(long, default_value = "https://www.facebook.com")]
        url: String,
        /// Use a throwaway browser profile instead of the persistent one
        #[arg(long)]
        ephemeral: bool,
    },

    /// Save the CRM API key (keys start with "pk_")
    Connect {
        /// API key issued by the CRM
        key: String,
    },

    /// Show whether an API key is configured
    Key,

    /// Show or change the CRM server base URL
    Server {
        /// New base URL; omit to print the current one
        url: Option<String>,
    },

    /// Show the current configuration
    Status,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { url, ephemeral } => cmd_run(&url, ephemeral).await,
        Commands::Connect { key } => cmd_connect(&key),
        Commands::Key => cmd_key(),
        Commands::Server { url } => cmd_server(url.as_deref()),
        Commands::Status => cmd_status(),
    }
}

fn open_store() -> Result<ConfigStore> {
    let path = ConfigStore::default_path()?;
    ConfigStore::open(path)
}

async fn cmd_run(url: &str, ephemeral: bool) -> Result<()> {
    let store = open_store()?;
    if store.api_key().is_none() {
        println!("Note: no API key configured. Imports will fail until you run `leadscout connect <key>`.");
    }

    let (bridge, rx) = bridge::channel(16);
    let relay = Relay::new(store).spawn(rx);

    let profile = if ephemeral {
        Profile::Ephemeral
    } else {
        Profile::Persistent
    };
    let mut wrapper = browser::launch(profile).await?;
    let page = wrapper.open_page(url).await?;

    println!("Browser launched. Log in and browse; import buttons appear on supported pages.");
    println!("Close the browser window (or press Ctrl-C) to end the session.");

    let controller = Controller::new(page, bridge);
    tokio::select! {
        result = controller.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, shutting down");
        }
    }

    relay.abort();
    wrapper.cleanup_temp_dir();
    Ok(())
}

fn cmd_connect(key: &str) -> Result<()> {
    let mut store = open_store()?;
    store
        .set_api_key(key)
        .context("failed to save the API key")?;
    println!("API key saved.");
    Ok(())
}

fn cmd_key() -> Result<()> {
    let store = open_store()?;
    match store.api_key() {
        Some(key) => println!("API key configured: {}", mask_key(key)),
        None => println!("No API key configured. Run `leadscout connect <key>` to add one."),
    }
    Ok(())
}

/// Show just enough of the key to recognize it.
fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(7).collect();
    format!("{visible}...")
}

fn cmd_server(url: Option<&str>) -> Result<()> {
    let mut store = open_store()?;
    match url {
        Some(url) => {
            store
                .set_server_base(url)
                .context("failed to save the server URL")?;
            println!("Server base URL set to {}", store.server_base_url());
        }
        None => println!("Server base URL: {}", store.server_base_url()),
    }
    Ok(())
}

fn cmd_status() -> Result<()> {
    let path = ConfigStore::default_path()?;
    let store = ConfigStore::open(&path)?;
    println!("Config file:  {}", path.display());
    println!(
        "API key:      {}",
        if store.api_key().is_some() {
            "configured"
        } else {
            "not set"
        }
    );
    println!("Server:       {}", store.server_base_url());
    Ok(())
}
