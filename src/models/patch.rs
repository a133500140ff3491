//! Client-supplied trip fields.
//!
//! A patch holds only what the request body carried. Values are coerced the
//! way the collection schema allows (numeric strings become numbers, scalars
//! become text) and `null` resets a field to its default. Keys the schema
//! does not know about, and the store-managed `id`, `createdAt` and
//! `updatedAt`, are ignored.

use serde_json::{Map, Number, Value};

use crate::error::ValidationError;

use super::trip::TripStatus;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaintenancePatch {
    pub servicing_cost: Option<f64>,
    pub servicing_comment: Option<String>,
    pub tyre_cost: Option<f64>,
    pub tyre_comment: Option<String>,
    pub road_maintenance: Option<f64>,
    pub road_maintenance_comment: Option<String>,
    pub road_rto: Option<f64>,
    pub road_rto_comment: Option<String>,
    pub fixed_rto: Option<f64>,
    pub fixed_rto_comment: Option<String>,
}

impl MaintenancePatch {
    fn read(fields: &mut FieldReader<'_>) -> Self {
        Self {
            servicing_cost: fields.number("servicingCost"),
            servicing_comment: fields.text("servicingComment"),
            tyre_cost: fields.number("tyreCost"),
            tyre_comment: fields.text("tyreComment"),
            road_maintenance: fields.number("roadMaintenance"),
            road_maintenance_comment: fields.text("roadMaintenanceComment"),
            road_rto: fields.number("roadRTO"),
            road_rto_comment: fields.text("roadRTOComment"),
            fixed_rto: fields.number("fixedRTO"),
            fixed_rto_comment: fields.text("fixedRTOComment"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverPatch {
    pub driver_account: Option<f64>,
    pub driver_account_comment: Option<String>,
    pub fuel: Option<f64>,
    pub fuel_comment: Option<String>,
    pub tags: Option<f64>,
    pub tags_comment: Option<String>,
}

impl DriverPatch {
    fn read(fields: &mut FieldReader<'_>) -> Self {
        Self {
            driver_account: fields.number("driverAccount"),
            driver_account_comment: fields.text("driverAccountComment"),
            fuel: fields.number("fuel"),
            fuel_comment: fields.text("fuelComment"),
            tags: fields.number("tags"),
            tags_comment: fields.text("tagsComment"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripPatch {
    pub date: Option<String>,
    pub vehicle_no: Option<String>,
    pub luggage_company: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub advance: Option<f64>,
    pub advance_sal: Option<f64>,
    pub advance_tags: Option<f64>,
    pub advance_fuel: Option<f64>,
    pub distance: Option<f64>,
    pub trip_days: Option<f64>,
    pub cost_to_customer: Option<f64>,
    pub maintenance: Option<MaintenancePatch>,
    pub driver: Option<DriverPatch>,
    pub status: Option<TripStatus>,
    pub penalty: Option<f64>,
    pub transporter_advance: Option<f64>,
    pub transporter_remaining: Option<f64>,
    pub bonus: Option<f64>,
}

impl TripPatch {
    /// Reads a request body. Every field that cannot be coerced is reported,
    /// not just the first one.
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        let Value::Object(map) = value else {
            return Err(ValidationError::single(
                "body",
                "expected a JSON object",
            ));
        };

        let mut errors = ValidationError::default();
        let mut fields = FieldReader::new(&map, "", &mut errors);
        let patch = Self {
            date: fields.text("date"),
            vehicle_no: fields.text("vehicleNo"),
            luggage_company: fields.text("luggageCompany"),
            from: fields.text("from"),
            to: fields.text("to"),
            advance: fields.number("advance"),
            advance_sal: fields.number("advanceSal"),
            advance_tags: fields.number("advanceTags"),
            advance_fuel: fields.number("advanceFuel"),
            distance: fields.number("distance"),
            trip_days: fields.number("tripDays"),
            cost_to_customer: fields.number("costToCustomer"),
            maintenance: fields.nested("maintenance", MaintenancePatch::read),
            driver: fields.nested("driver", DriverPatch::read),
            status: fields.status("status"),
            penalty: fields.number("penalty"),
            transporter_advance: fields.number("transporterAdvance"),
            transporter_remaining: fields.number("transporterRemaining"),
            bonus: fields.number("bonus"),
        };

        errors.into_result().map(|()| patch)
    }
}

struct FieldReader<'a> {
    map: &'a Map<String, Value>,
    prefix: &'a str,
    errors: &'a mut ValidationError,
}

impl<'a> FieldReader<'a> {
    fn new(map: &'a Map<String, Value>, prefix: &'a str, errors: &'a mut ValidationError) -> Self {
        Self {
            map,
            prefix,
            errors,
        }
    }

    fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.prefix)
        }
    }

    fn reject(&mut self, key: &str, reason: String) {
        let path = self.path(key);
        self.errors.push(path, reason);
    }

    fn text(&mut self, key: &str) -> Option<String> {
        let map = self.map;
        match map.get(key)? {
            Value::Null => Some(String::new()),
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(number_text(n)),
            Value::Bool(b) => Some(b.to_string()),
            other => {
                self.reject(key, format!("expected text, got {}", kind(other)));
                None
            }
        }
    }

    fn number(&mut self, key: &str) -> Option<f64> {
        let map = self.map;
        let parsed = match map.get(key)? {
            Value::Null => Some(0.0),
            Value::Number(n) => n.as_f64(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) if s.trim().is_empty() => Some(0.0),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            other => {
                self.reject(key, format!("expected a number, got {}", kind(other)));
                return None;
            }
        };
        match parsed.filter(|n| n.is_finite()) {
            Some(n) => Some(n),
            None => {
                let raw = map.get(key).map(Value::to_string).unwrap_or_default();
                self.reject(key, format!("cannot read {raw} as a number"));
                None
            }
        }
    }

    fn status(&mut self, key: &str) -> Option<TripStatus> {
        let map = self.map;
        match map.get(key)? {
            Value::Null => Some(TripStatus::default()),
            Value::String(s) => match s.parse() {
                Ok(status) => Some(status),
                Err(reason) => {
                    self.reject(key, reason);
                    None
                }
            },
            other => {
                self.reject(key, format!("expected a status name, got {}", kind(other)));
                None
            }
        }
    }

    fn nested<T>(&mut self, key: &str, read: impl FnOnce(&mut FieldReader<'_>) -> T) -> Option<T> {
        let map = self.map;
        match map.get(key)? {
            Value::Object(inner) => {
                let path = self.path(key);
                let mut nested = FieldReader::new(inner, &path, self.errors);
                Some(read(&mut nested))
            }
            other => {
                self.reject(key, format!("expected an object, got {}", kind(other)));
                None
            }
        }
    }
}

/// Integers keep their digits; floats print without exponent or a trailing
/// `.0`, so `1.0` reads as `1` and `1e20` as `100000000000000000000`.
fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
