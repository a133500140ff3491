use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::error::ValidationError;

use super::patch::{DriverPatch, MaintenancePatch, TripPatch};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    #[default]
    NotDelivered,
    Delivered,
    LateDelivered,
    LateUnload,
}

impl TripStatus {
    pub const ALL: [TripStatus; 4] = [
        TripStatus::NotDelivered,
        TripStatus::Delivered,
        TripStatus::LateDelivered,
        TripStatus::LateUnload,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::NotDelivered => "not_delivered",
            TripStatus::Delivered => "delivered",
            TripStatus::LateDelivered => "late_delivered",
            TripStatus::LateUnload => "late_unload",
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("`{s}` is not a valid status"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Maintenance {
    #[serde(rename = "servicingCost")]
    pub servicing_cost: f64,
    #[serde(rename = "servicingComment")]
    pub servicing_comment: String,
    #[serde(rename = "tyreCost")]
    pub tyre_cost: f64,
    #[serde(rename = "tyreComment")]
    pub tyre_comment: String,
    #[serde(rename = "roadMaintenance")]
    pub road_maintenance: f64,
    #[serde(rename = "roadMaintenanceComment")]
    pub road_maintenance_comment: String,
    #[serde(rename = "roadRTO")]
    pub road_rto: f64,
    #[serde(rename = "roadRTOComment")]
    pub road_rto_comment: String,
    #[serde(rename = "fixedRTO")]
    pub fixed_rto: f64,
    #[serde(rename = "fixedRTOComment")]
    pub fixed_rto_comment: String,
}

impl Maintenance {
    fn apply(&mut self, patch: MaintenancePatch) {
        set(&mut self.servicing_cost, patch.servicing_cost);
        set(&mut self.servicing_comment, patch.servicing_comment);
        set(&mut self.tyre_cost, patch.tyre_cost);
        set(&mut self.tyre_comment, patch.tyre_comment);
        set(&mut self.road_maintenance, patch.road_maintenance);
        set(
            &mut self.road_maintenance_comment,
            patch.road_maintenance_comment,
        );
        set(&mut self.road_rto, patch.road_rto);
        set(&mut self.road_rto_comment, patch.road_rto_comment);
        set(&mut self.fixed_rto, patch.fixed_rto);
        set(&mut self.fixed_rto_comment, patch.fixed_rto_comment);
    }
}

/// Payments handed to the driver for one trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DriverPayments {
    pub driver_account: f64,
    pub driver_account_comment: String,
    pub fuel: f64,
    pub fuel_comment: String,
    pub tags: f64,
    pub tags_comment: String,
}

impl DriverPayments {
    fn apply(&mut self, patch: DriverPatch) {
        set(&mut self.driver_account, patch.driver_account);
        set(&mut self.driver_account_comment, patch.driver_account_comment);
        set(&mut self.fuel, patch.fuel);
        set(&mut self.fuel_comment, patch.fuel_comment);
        set(&mut self.tags, patch.tags);
        set(&mut self.tags_comment, patch.tags_comment);
    }
}

/// One transport job as stored and as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub date: String,
    pub vehicle_no: String,
    pub luggage_company: String,
    pub from: String,
    pub to: String,
    pub advance: f64,
    pub advance_sal: f64,
    pub advance_tags: f64,
    pub advance_fuel: f64,
    pub distance: f64,
    pub trip_days: f64,
    pub cost_to_customer: f64,
    pub maintenance: Maintenance,
    pub driver: DriverPayments,
    pub status: TripStatus,
    pub penalty: f64,
    pub transporter_advance: f64,
    pub transporter_remaining: f64,
    pub bonus: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    /// Builds a new record with a fresh id from client-supplied fields.
    /// Anything the patch leaves out keeps its default.
    pub fn create(patch: TripPatch, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let mut trip = Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            ..Self::default()
        };
        trip.apply(patch);
        trip.validate()?;
        Ok(trip)
    }

    /// Returns a copy of `self` with `patch` merged in and `updatedAt`
    /// moved forward. `self` is left untouched if validation fails.
    pub fn updated(&self, patch: TripPatch, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        next.apply(patch);
        next.validate()?;
        // Clock granularity must not let an update look older than its input.
        next.updated_at = now.max(self.updated_at + Duration::microseconds(1));
        Ok(next)
    }

    fn apply(&mut self, patch: TripPatch) {
        set(&mut self.date, patch.date);
        set(&mut self.vehicle_no, patch.vehicle_no);
        set(&mut self.luggage_company, patch.luggage_company);
        set(&mut self.from, patch.from);
        set(&mut self.to, patch.to);
        set(&mut self.advance, patch.advance);
        set(&mut self.advance_sal, patch.advance_sal);
        set(&mut self.advance_tags, patch.advance_tags);
        set(&mut self.advance_fuel, patch.advance_fuel);
        set(&mut self.distance, patch.distance);
        set(&mut self.trip_days, patch.trip_days);
        set(&mut self.cost_to_customer, patch.cost_to_customer);
        set(&mut self.status, patch.status);
        set(&mut self.penalty, patch.penalty);
        set(&mut self.transporter_advance, patch.transporter_advance);
        set(&mut self.transporter_remaining, patch.transporter_remaining);
        set(&mut self.bonus, patch.bonus);
        if let Some(maintenance) = patch.maintenance {
            self.maintenance.apply(maintenance);
        }
        if let Some(driver) = patch.driver {
            self.driver.apply(driver);
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        for (path, value) in [
            ("date", &self.date),
            ("vehicleNo", &self.vehicle_no),
            ("luggageCompany", &self.luggage_company),
            ("from", &self.from),
            ("to", &self.to),
        ] {
            if value.is_empty() {
                errors.push(path, "is required");
            }
        }
        errors.into_result()
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}
