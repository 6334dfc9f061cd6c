//! Curator - video catalog operations for Riff.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use curator::{
    api::{self, ApiState},
    config::{self, NodeConfig},
    identity::{self, Identity, IdentityError},
    ledger::VideoLedger,
    store::{ContentStore, HttpStore, MemoryStore},
    upload::UploadCoordinator,
};

/// Video catalog tool for Riff.
#[derive(Parser)]
#[command(name = "curator", about = "Video catalog operations for Riff")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API daemon.
    Daemon {
        /// Address to bind the API server.
        #[arg(long, default_value = "0.0.0.0:7979", env = "CURATOR_BIND")]
        bind: String,

        /// Content store URL for payload uploads.
        #[arg(long, env = "STORE_URL", default_value = "http://localhost:8080")]
        store_url: String,

        /// Gateway base for playback addresses.
        #[arg(long, env = "GATEWAY_URL", default_value = "https://cdn.riff.cc/ipfs")]
        gateway_url: String,

        /// Data directory for the identity key.
        #[arg(long, env = "CURATOR_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Hold payloads in process memory instead of a remote store.
        /// Local development only; nothing survives a restart.
        #[arg(long)]
        memory_store: bool,
    },

    /// Generate the node identity key.
    Init {
        /// Data directory for the identity key.
        #[arg(long, env = "CURATOR_DATA_DIR")]
        data_dir: Option<PathBuf>,
    },

    /// Show daemon status.
    Status {
        /// Curator API URL.
        #[arg(long, env = "CURATOR_API_URL", default_value = "http://localhost:7979")]
        api_url: String,
    },

    /// List the catalog, newest first.
    Catalog {
        /// Curator API URL.
        #[arg(long, env = "CURATOR_API_URL", default_value = "http://localhost:7979")]
        api_url: String,
    },

    /// Upload a video file.
    Upload {
        /// Path to the video file.
        file: PathBuf,

        /// Title for the catalog entry.
        #[arg(long)]
        title: String,

        /// Curator API URL.
        #[arg(long, env = "CURATOR_API_URL", default_value = "http://localhost:7979")]
        api_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curator=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Daemon {
            bind,
            store_url,
            gateway_url,
            data_dir,
            memory_store,
        } => {
            run_daemon(&bind, store_url, gateway_url, data_dir, memory_store).await?;
        }

        Commands::Init { data_dir } => {
            init_identity(data_dir)?;
        }

        Commands::Status { api_url } => {
            show_status(&api_url).await?;
        }

        Commands::Catalog { api_url } => {
            show_catalog(&api_url).await?;
        }

        Commands::Upload {
            file,
            title,
            api_url,
        } => {
            upload_file(&api_url, &file, &title).await?;
        }
    }

    Ok(())
}

/// Run the API daemon.
async fn run_daemon(
    bind: &str,
    store_url: String,
    gateway_url: String,
    data_dir: Option<PathBuf>,
    memory_store: bool,
) -> Result<()> {
    tracing::info!("Starting curator daemon...");

    let mut config = NodeConfig::new(store_url, gateway_url);
    if let Some(dir) = data_dir {
        config = config.with_data_dir(dir);
    }

    // Load the node identity; generate one on first start.
    let key_path = identity::key_path(&config.data_dir);
    let identity = match Identity::load(&key_path) {
        Ok(identity) => identity,
        Err(IdentityError::NoKey(_)) => {
            tracing::info!(path = %key_path.display(), "No identity key found, generating one");
            Identity::init(&key_path)?
        }
        Err(e) => return Err(e.into()),
    };
    let author = identity.public_key();
    tracing::info!(author = %author, "curator identity loaded");

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;

    let store: Arc<dyn ContentStore> = if memory_store {
        tracing::warn!("Using in-memory content store; payloads will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(HttpStore::new(
            client,
            config.store_url.clone(),
            Some(identity),
        ))
    };

    let ledger = Arc::new(VideoLedger::new());
    let coordinator = UploadCoordinator::new(store, Arc::clone(&ledger));

    let state = Arc::new(ApiState::new(
        ledger,
        coordinator,
        author,
        config.gateway_url.clone(),
        config.store_url.clone(),
    ));

    api::serve(state, bind).await?;

    Ok(())
}

/// Generate the identity key.
fn init_identity(data_dir: Option<PathBuf>) -> Result<()> {
    let dir = data_dir.unwrap_or_else(config::default_data_dir);
    let key_path = identity::key_path(&dir);

    let identity = Identity::init(&key_path)?;

    println!("Identity created.");
    println!("Key:    {}", key_path.display());
    println!("Author: {}", identity.public_key());

    Ok(())
}

/// Show daemon status via API.
async fn show_status(api_url: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let url = format!("{}/api/v1/status", api_url);

    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("Failed to get status: {}", response.status());
    }

    let status: serde_json::Value = response.json().await?;

    println!("Curator Status");
    println!("==============");
    println!("Status:    {}", status["status"]);
    println!("Author:    {}", status["author"]);
    println!("Videos:    {}", status["videos"]);
    println!("Store:     {}", status["store_url"]);
    println!(
        "Uploading: {}",
        status["upload_in_flight"].as_bool().unwrap_or(false)
    );

    Ok(())
}

/// List the catalog via API.
async fn show_catalog(api_url: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let url = format!("{}/api/v1/videos", api_url);

    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("Failed to list catalog: {}", response.status());
    }

    let catalog: serde_json::Value = response.json().await?;
    let videos = catalog["videos"].as_array().cloned().unwrap_or_default();

    if videos.is_empty() {
        println!("Catalog is empty.");
        return Ok(());
    }

    println!("{:<6} {:<32} {:<24} {}", "ID", "TITLE", "AUTHOR", "PLAYBACK");
    println!("{}", "-".repeat(96));

    for video in &videos {
        let author = video["author"].as_str().unwrap_or("?");
        println!(
            "{:<6} {:<32} {:<24} {}",
            video["id"],
            video["title"].as_str().unwrap_or("?"),
            &author[..24.min(author.len())],
            video["playback_url"].as_str().unwrap_or("?"),
        );
    }

    if let Some(selected) = catalog["selected"].as_object() {
        println!();
        println!(
            "Selected: #{} {}",
            selected["id"],
            selected["title"].as_str().unwrap_or("?")
        );
    }

    Ok(())
}

/// Upload a video file via API.
async fn upload_file(api_url: &str, file: &PathBuf, title: &str) -> Result<()> {
    let bytes = tokio::fs::read(file).await?;
    tracing::info!(file = %file.display(), size = bytes.len(), "Uploading");

    let client = reqwest::Client::new();
    let url = format!("{}/api/v1/videos", api_url);

    let response = client
        .post(&url)
        .query(&[("title", title)])
        .body(bytes)
        .send()
        .await?;

    if !response.status().is_success() {
        let error_text = response.text().await?;
        anyhow::bail!("Upload failed: {}", error_text);
    }

    let video: serde_json::Value = response.json().await?;

    println!("Upload complete!");
    println!("ID:       {}", video["id"]);
    println!("Title:    {}", video["title"].as_str().unwrap_or("?"));
    println!("Content:  {}", video["content_id"].as_str().unwrap_or("?"));
    println!("Playback: {}", video["playback_url"].as_str().unwrap_or("?"));

    Ok(())
}
