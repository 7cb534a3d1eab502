// Search criteria and record predicates

use crate::error::Result;
use crate::record::{MaintenanceRecord, parse_date};
use chrono::NaiveDate;

/// A single predicate over a record
///
/// Text filters compare case-insensitively and match on containment. Bounds on
/// optional fields never match a record where the field is absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    CarContains(String),
    TypeContains(String),
    /// mileage >= n
    MileageAtLeast(u64),
    /// mileage <= n
    MileageAtMost(u64),
    /// date > d
    After(NaiveDate),
    /// date < d
    Before(NaiveDate),
    NotesContain(String),
}

impl Filter {
    pub fn matches(&self, record: &MaintenanceRecord) -> bool {
        match self {
            Filter::CarContains(needle) => contains_ci(&record.car, needle),
            Filter::TypeContains(needle) => contains_ci(&record.service_type, needle),
            Filter::MileageAtLeast(min) => record.mileage.is_some_and(|m| m >= *min),
            Filter::MileageAtMost(max) => record.mileage.is_some_and(|m| m <= *max),
            Filter::After(date) => record.date > *date,
            Filter::Before(date) => record.date < *date,
            Filter::NotesContain(needle) => record.notes.as_deref().is_some_and(|n| contains_ci(n, needle)),
        }
    }
}

/// True when every filter matches; an empty list matches everything
pub fn matches_all(filters: &[Filter], record: &MaintenanceRecord) -> bool {
    filters.iter().all(|f| f.matches(record))
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::CarContains(s) => write!(f, "car contains '{}'", s),
            Filter::TypeContains(s) => write!(f, "type contains '{}'", s),
            Filter::MileageAtLeast(n) => write!(f, "mileage >= {}", n),
            Filter::MileageAtMost(n) => write!(f, "mileage <= {}", n),
            Filter::After(d) => write!(f, "date > {}", d),
            Filter::Before(d) => write!(f, "date < {}", d),
            Filter::NotesContain(s) => write!(f, "notes contain '{}'", s),
        }
    }
}

/// Raw search options as given on the command line
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    pub car: Option<String>,
    pub service_type: Option<String>,
    pub min_mileage: Option<u64>,
    pub max_mileage: Option<u64>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub notes_contains: Option<String>,
}

impl SearchCriteria {
    /// Turn the criteria into filters
    ///
    /// Date bounds are parsed here; one bad date fails the whole search with
    /// `Error::InvalidDate` instead of being ignored.
    pub fn filters(&self) -> Result<Vec<Filter>> {
        let mut filters = Vec::new();

        if let Some(car) = &self.car {
            filters.push(Filter::CarContains(car.clone()));
        }
        if let Some(service_type) = &self.service_type {
            filters.push(Filter::TypeContains(service_type.clone()));
        }
        if let Some(min) = self.min_mileage {
            filters.push(Filter::MileageAtLeast(min));
        }
        if let Some(max) = self.max_mileage {
            filters.push(Filter::MileageAtMost(max));
        }
        if let Some(after) = &self.after {
            filters.push(Filter::After(parse_date(after)?));
        }
        if let Some(before) = &self.before {
            filters.push(Filter::Before(parse_date(before)?));
        }
        if let Some(notes) = &self.notes_contains {
            filters.push(Filter::NotesContain(notes.clone()));
        }

        Ok(filters)
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
