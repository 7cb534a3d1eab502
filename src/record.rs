// Maintenance record model, inputs for add/edit, and field validation

use crate::error::{Error, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Format used for record dates on the command line and on disk
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One maintenance event for a car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub id: u64,
    pub car: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub mileage: Option<u64>,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaintenanceRecord {
    /// Apply the fields present in `patch`, leaving the rest untouched.
    ///
    /// Every supplied field is validated before anything is written, so a
    /// rejected patch leaves the record exactly as it was.
    pub fn apply(&mut self, patch: &RecordPatch, now: DateTime<Utc>) -> Result<()> {
        if patch.is_empty() {
            return Err(Error::NoChanges);
        }

        let car = patch.car.as_deref().map(|c| required_text("car", c)).transpose()?;
        let service_type = patch
            .service_type
            .as_deref()
            .map(|t| required_text("type", t))
            .transpose()?;
        let date = patch.date.as_deref().map(parse_date).transpose()?;
        let cost = patch.cost.map(validate_cost).transpose()?;

        if let Some(car) = car {
            self.car = car;
        }
        if let Some(date) = date {
            self.date = date;
        }
        if let Some(mileage) = patch.mileage {
            self.mileage = Some(mileage);
        }
        if let Some(service_type) = service_type {
            self.service_type = service_type;
        }
        if let Some(cost) = cost {
            self.cost = cost;
        }
        if let Some(notes) = &patch.notes {
            self.notes = normalize_notes(Some(notes.clone()));
        }

        self.updated_at = now.max(self.created_at);
        Ok(())
    }
}

/// Fields supplied when adding a record
#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    pub car: String,
    /// `YYYY-MM-DD`; today's local date when absent
    pub date: Option<String>,
    pub mileage: Option<u64>,
    pub service_type: String,
    /// Defaults to zero
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

impl NewRecord {
    /// Validate the input and build the stored record
    pub fn into_record(self, id: u64, now: DateTime<Utc>) -> Result<MaintenanceRecord> {
        let car = required_text("car", &self.car)?;
        let service_type = required_text("type", &self.service_type)?;
        let date = match self.date.as_deref() {
            Some(raw) => parse_date(raw)?,
            None => now.with_timezone(&Local).date_naive(),
        };
        let cost = validate_cost(self.cost.unwrap_or(0.0))?;

        Ok(MaintenanceRecord {
            id,
            car,
            date,
            mileage: self.mileage,
            service_type,
            cost,
            notes: normalize_notes(self.notes),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update: `None` means "leave this field as it is"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub car: Option<String>,
    pub date: Option<String>,
    pub mileage: Option<u64>,
    pub service_type: Option<String>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.car.is_none()
            && self.date.is_none()
            && self.mileage.is_none()
            && self.service_type.is_none()
            && self.cost.is_none()
            && self.notes.is_none()
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(raw.to_string()))
}

fn required_text(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Validation(format!("Field '{}' cannot be empty", field)));
    }
    Ok(value.to_string())
}

fn validate_cost(cost: f64) -> Result<f64> {
    if !cost.is_finite() || cost < 0.0 {
        return Err(Error::Validation(format!(
            "Cost must be a non-negative amount, got {}",
            cost
        )));
    }
    Ok(cost)
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|n| !n.trim().is_empty())
}
