// Human-readable record formatting and terminal styles

use crate::record::MaintenanceRecord;
use colored::{ColoredString, Colorize};

/// Shown in place of a missing value
pub const PLACEHOLDER: &str = "—";

/// Formats records as short text blocks
#[derive(Debug, Clone)]
pub struct Presenter {
    pub currency: String,
    pub distance_unit: String,
}

impl Default for Presenter {
    fn default() -> Self {
        Self {
            currency: "$".to_string(),
            distance_unit: "mi".to_string(),
        }
    }
}

impl Presenter {
    pub fn new(currency: impl Into<String>, distance_unit: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            distance_unit: distance_unit.into(),
        }
    }

    /// Render a record as:
    ///
    /// ```text
    /// #3   | 2024-05-01 | Civic | 55,000 mi
    ///      oil change - $49.99
    ///      Notes: synthetic
    /// ```
    ///
    /// The notes line is left out when there are no notes.
    pub fn format(&self, record: &MaintenanceRecord) -> String {
        let id = format!("#{}", record.id);
        let mut out = format!(
            "{:<4} | {} | {} | {}\n     {} - {}",
            id,
            record.date,
            record.car,
            self.mileage(record.mileage),
            record.service_type,
            self.cost(record.cost),
        );

        if let Some(notes) = record.notes.as_deref().filter(|n| !n.is_empty()) {
            out.push_str("\n     Notes: ");
            out.push_str(notes);
        }

        out
    }

    pub fn mileage(&self, mileage: Option<u64>) -> String {
        match mileage {
            Some(m) => format!("{} {}", group_thousands(m), self.distance_unit),
            None => PLACEHOLDER.to_string(),
        }
    }

    pub fn cost(&self, cost: f64) -> String {
        if cost.is_finite() {
            format!("{}{:.2}", self.currency, cost)
        } else {
            PLACEHOLDER.to_string()
        }
    }
}

/// 1234567 -> "1,234,567"
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub struct OutputStyle;

impl OutputStyle {
    pub fn success(text: &str) -> ColoredString {
        text.green()
    }

    pub fn error(text: &str) -> ColoredString {
        text.red()
    }

    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    pub fn header(text: &str) -> ColoredString {
        text.bold()
    }

    pub fn muted(text: &str) -> ColoredString {
        text.dimmed()
    }
}
