use chrono::Utc;
use serde_json::Value;
use sqlx::Row;
use tracing::{debug, info};

use crate::{
    db::DbPool,
    error::AppError,
    models::{patch::TripPatch, trip::Trip},
};

/// The trips collection. Each row keeps one trip as a JSON document keyed by
/// its id; every write goes through the schema checks on [`Trip`].
#[derive(Clone)]
pub struct TripStore {
    db: DbPool,
}

impl TripStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, body: Value) -> Result<Trip, AppError> {
        let patch = TripPatch::from_json(body)?;
        let trip = Trip::create(patch, Utc::now())?;

        sqlx::query("INSERT INTO trips (id, document) VALUES (?1, ?2)")
            .bind(&trip.id)
            .bind(encode(&trip)?)
            .execute(&self.db)
            .await?;

        info!(trip_id = %trip.id, vehicle_no = %trip.vehicle_no, "trip created");
        Ok(trip)
    }

    /// Every stored trip, in whatever order the store yields them.
    pub async fn list(&self) -> Result<Vec<Trip>, AppError> {
        let rows = sqlx::query("SELECT document FROM trips")
            .fetch_all(&self.db)
            .await?;
        let trips = rows
            .iter()
            .map(|row| decode(row.get::<&str, _>("document")))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = trips.len(), "trips listed");
        Ok(trips)
    }

    /// Merges `body` into the stored trip. Concurrent updates to the same id
    /// are last-write-wins.
    pub async fn update(&self, id: &str, body: Value) -> Result<Trip, AppError> {
        let patch = TripPatch::from_json(body)?;

        let row = sqlx::query("SELECT document FROM trips WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        let Some(row) = row else {
            return Err(AppError::NotFound);
        };
        let current = decode(row.get::<&str, _>("document"))?;
        let updated = current.updated(patch, Utc::now())?;

        let result = sqlx::query("UPDATE trips SET document = ?1 WHERE id = ?2")
            .bind(encode(&updated)?)
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        info!(trip_id = %id, "trip updated");
        Ok(updated)
    }
}

fn encode(trip: &Trip) -> Result<String, AppError> {
    serde_json::to_string(trip).map_err(|err| AppError::Other(err.into()))
}

fn decode(document: &str) -> Result<Trip, AppError> {
    serde_json::from_str(document).map_err(|err| AppError::Other(err.into()))
}
