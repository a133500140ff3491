use std::{str::FromStr, time::Duration};

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::watch;
use tracing::{error, info};

use crate::error::AppError;

pub type DbPool = SqlitePool;

/// Connection state of the store, as last observed by the connect task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "store", rename_all = "snake_case")]
pub enum StoreStatus {
    Connecting,
    Connected,
    Failed { error: String },
}

impl StoreStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, StoreStatus::Connected)
    }
}

/// Builds the pool without touching the database. Only a malformed address
/// fails here; reachability is checked by [`spawn_connect`].
pub fn init_pool(database_url: &str) -> Result<DbPool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|err| AppError::Config(format!("invalid DATABASE_URL: {err}")))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy_with(options);
    Ok(pool)
}

/// Opens the first connection and creates the trips collection if needed.
pub async fn connect(pool: &DbPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Runs [`connect`] in the background and publishes the outcome. The HTTP
/// surface starts independently of the result.
pub fn spawn_connect(pool: DbPool) -> watch::Receiver<StoreStatus> {
    let (tx, rx) = watch::channel(StoreStatus::Connecting);
    tokio::spawn(async move {
        let status = match connect(&pool).await {
            Ok(()) => {
                info!("store connected");
                StoreStatus::Connected
            }
            Err(err) => {
                error!("store connection failed: {err}");
                StoreStatus::Failed {
                    error: err.to_string(),
                }
            }
        };
        // Nobody listening is fine, the state may already be dropped.
        let _ = tx.send(status);
    });
    rx
}
