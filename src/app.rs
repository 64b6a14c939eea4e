//! Process wiring: configuration, bootstrap, tracing, shutdown.

use crate::storage::JsonSnapshot;
use crate::store::UserStore;
use crate::web::{SharedStore, build_router};
use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
pub struct AppConfig {
    bind_addr: SocketAddr,
    data_file: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = env_string("USERSTORE_BIND_ADDR", "127.0.0.1:8080")
            .parse::<SocketAddr>()
            .context("USERSTORE_BIND_ADDR must be valid host:port")?;

        let data_file = PathBuf::from(env_string("USERSTORE_DATA_FILE", "users.json"));

        Ok(Self {
            bind_addr,
            data_file,
        })
    }

    pub fn for_testing(data_file: PathBuf) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".parse().expect("valid loopback address"),
            data_file,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Loads the persisted collection and wires it behind the router. A
/// malformed backing store fails here, before the process starts serving.
pub fn bootstrap(config: &AppConfig) -> Result<Router> {
    info!(
        bind = %config.bind_addr,
        data_file = %config.data_file.display(),
        "bootstrapping user store"
    );

    let snapshot = JsonSnapshot::new(&config.data_file);
    let store = UserStore::open(snapshot)
        .context("failed to load persisted users; refusing to serve with unknown state")?;
    info!(users = store.len(), "user collection loaded");

    let store: SharedStore = Arc::new(Mutex::new(store));
    Ok(build_router(store))
}

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("userstore=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
