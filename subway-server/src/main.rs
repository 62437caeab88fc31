use std::path::Path;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use subway_server::config::ServerConfig;
use subway_server::service::{LineService, ServiceError};
use subway_server::stations::{StationError, StationRegistry};
use subway_server::store::{AnyLineStore, FileLineStore, MemoryLineStore};
use subway_server::web::{AppState, create_router};

const DEFAULT_FILTER: &str = "subway_server=info,tower_http=info";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let (stations, store) = match &config.data_dir {
        Some(dir) => match open_on_disk(dir).await {
            Ok(opened) => {
                info!(dir = %dir.display(), "storing lines and stations on disk");
                opened
            }
            Err(e) => {
                error!("failed to open data directory: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => {
            info!("storing lines and stations in memory");
            (
                StationRegistry::new(),
                AnyLineStore::Memory(MemoryLineStore::new()),
            )
        }
    };

    let lines = LineService::new(stations.clone(), store, &config.cache);

    // Lines keep copies of their stations; make sure the registry knows them
    let restored = async {
        let referenced = lines.referenced_stations().await?;
        stations.restore(referenced).await?;
        Ok::<_, ServiceError>(())
    }
    .await;
    if let Err(e) = restored {
        error!("failed to load stored lines: {e}");
        return ExitCode::FAILURE;
    }

    let app = create_router(AppState::new(stations, lines));

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.addr, "failed to bind: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(addr = %config.addr, "subway server listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Open the line files and the station registry kept beside them.
async fn open_on_disk(dir: &Path) -> Result<(StationRegistry, AnyLineStore), StationError> {
    let store = FileLineStore::open(dir).await?;
    let stations = StationRegistry::open(store.stations_path()).await?;
    Ok((stations, AnyLineStore::File(store)))
}
