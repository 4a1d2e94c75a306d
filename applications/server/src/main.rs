/// Trackvault Server - audio library ingestion and streaming
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use trackvault_core::{blob::BlobStore, error::VaultError, types::TrackId};
use trackvault_server::{api, config::ServerConfig, state::AppState};
use trackvault_storage::{Catalog, CatalogLock, FsBlobStore, SnapshotFile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "trackvault-server")]
#[command(about = "Audio library ingestion and streaming server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "TRACKVAULT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Print library statistics
    Stats {
        /// Number of most played tracks to show
        #[arg(short, long)]
        top: Option<usize>,
    },
    /// List tracks, most recently added first
    List {
        /// Number of tracks to show
        #[arg(short, long, default_value_t = 10)]
        recent: usize,
    },
    /// Delete a track and its audio file
    Delete {
        /// Track ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "trackvault_server=info,trackvault_storage=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = ServerConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Serve => serve(config).await?,
        Commands::Stats { top } => {
            let top_n = top.unwrap_or(config.stats.top_n);
            print_stats(&config, top_n).await?;
        }
        Commands::List { recent } => list_recent(&config, recent).await?,
        Commands::Delete { id } => delete_track(&config, &id).await?,
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Trackvault Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);
    tracing::info!("Data directory: {:?}", config.storage.data_dir);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    let (app_state, ingest_worker) = AppState::initialize(config).await?;
    tracing::info!("Catalog holds {} tracks", app_state.catalog.len().await);
    // Outlive the router so the draining worker still owns the catalog
    let _catalog_lock = Arc::clone(&app_state.catalog_lock);

    let app = api::router(app_state);

    tracing::info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router owned the last queue handle, so the worker drains and exits
    if let Err(e) = ingest_worker.await {
        tracing::error!("Ingestion worker ended abnormally: {}", e);
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Open the catalog directly for the maintenance commands
///
/// Read-only commands skip the lock: the snapshot is only ever replaced
/// atomically, so they see a consistent if possibly stale library.
async fn open_catalog(config: &ServerConfig) -> anyhow::Result<Catalog> {
    let blob_store = FsBlobStore::new(config.storage.blob_path());
    let blobs: Arc<dyn BlobStore> = Arc::new(blob_store);
    let snapshot = SnapshotFile::new(config.storage.snapshot_path());
    Ok(Catalog::open(snapshot, blobs).await?)
}

async fn print_stats(config: &ServerConfig, top_n: usize) -> anyhow::Result<()> {
    let catalog = open_catalog(config).await?;
    let stats = catalog.stats(top_n).await;

    println!("Tracks: {}", stats.total_tracks);
    println!("Plays:  {}", stats.total_plays);
    if !stats.top_tracks.is_empty() {
        println!();
        println!("Most played:");
        for (rank, track) in stats.top_tracks.iter().enumerate() {
            println!(
                "  {:>2}. {} - {} ({} plays) [{}]",
                rank + 1,
                track.artist,
                track.title,
                track.play_count,
                track.id
            );
        }
    }

    Ok(())
}

async fn list_recent(config: &ServerConfig, n: usize) -> anyhow::Result<()> {
    let catalog = open_catalog(config).await?;
    let tracks = catalog.recent(n).await;

    if tracks.is_empty() {
        println!("Library is empty");
        return Ok(());
    }

    println!("Recent tracks:");
    for track in tracks {
        println!(
            "  {}  {} - {}  ({})",
            track.id,
            track.artist,
            track.title,
            track.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

async fn delete_track(config: &ServerConfig, id: &str) -> anyhow::Result<()> {
    let lock_path = SnapshotFile::new(config.storage.snapshot_path()).lock_path();
    let _lock = match CatalogLock::acquire(lock_path).await {
        Ok(lock) => lock,
        Err(e @ VaultError::CatalogLocked { .. }) => anyhow::bail!(
            "{}. Stop the server first or send DELETE /api/track/{} to it",
            e,
            id
        ),
        Err(e) => return Err(e.into()),
    };
    let catalog = open_catalog(config).await?;
    let track_id = TrackId::new(id);

    if catalog.delete(&track_id).await? {
        println!("Deleted track {}", track_id);
    } else {
        anyhow::bail!("Track not found: {}", track_id);
    }

    Ok(())
}
