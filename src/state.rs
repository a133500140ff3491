use tokio::sync::watch;

use crate::{
    db::{DbPool, StoreStatus},
    error::AppError,
    services::trips::TripStore,
};

#[derive(Clone)]
pub struct AppState {
    pub trips: TripStore,
    pub store_status: watch::Receiver<StoreStatus>,
}

impl AppState {
    pub fn new(db: DbPool, store_status: watch::Receiver<StoreStatus>) -> Self {
        Self {
            trips: TripStore::new(db),
            store_status,
        }
    }

    /// Fails while the first connection is still being opened, before the
    /// trips collection is guaranteed to exist. A failed connect does not
    /// block requests; they reach the store and report its error.
    pub fn ensure_store_started(&self) -> Result<(), AppError> {
        if *self.store_status.borrow() == StoreStatus::Connecting {
            return Err(AppError::BadRequest("store is still connecting".into()));
        }
        Ok(())
    }
}
