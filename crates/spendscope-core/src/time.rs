//! Month names and period handling for the date filter

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use spendscope_config::DEFAULT_MONTH_NAMES;

static LEADING_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+").expect("valid integer pattern"));

/// Ordered list of the twelve month names, January first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthNames {
    names: Vec<String>,
}

impl Default for MonthNames {
    fn default() -> Self {
        Self {
            names: DEFAULT_MONTH_NAMES.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl MonthNames {
    /// Build from a configured list; anything but 12 names falls back to English
    pub fn new(names: &[String]) -> Self {
        if names.len() == 12 {
            Self { names: names.to_vec() }
        } else {
            log::warn!(
                "Expected 12 month names, got {}; using English names",
                names.len()
            );
            Self::default()
        }
    }

    /// Resolve a month name to its zero-based index
    ///
    /// Matching is exact but case-insensitive; surrounding whitespace is ignored.
    pub fn index_of(&self, month: &str) -> Option<u32> {
        let wanted = month.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.names
            .iter()
            .position(|name| name.to_lowercase() == wanted)
            .map(|i| i as u32)
    }

    /// Name for a zero-based month index
    pub fn name(&self, month0: u32) -> Option<&str> {
        self.names.get(month0 as usize).map(String::as_str)
    }

    /// All names in calendar order
    pub fn all(&self) -> &[String] {
        &self.names
    }
}

/// Coerce a textual year to an integer
///
/// The leading integer part is used and the rest ignored, so `"2024.7"` and
/// `"2024abc"` both give 2024. Zero and input without leading digits are
/// treated as absent.
pub fn coerce_year(input: &str) -> Option<i32> {
    let digits = LEADING_INTEGER.find(input.trim())?;
    let year = digits.as_str().parse::<i32>().ok()?;
    (year != 0).then_some(year)
}

/// Month/year pair selected on the analysis page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Period {
    pub month: Option<String>,
    pub year: Option<i32>,
}

impl Period {
    /// Period covering the month containing `date`
    pub fn containing(date: NaiveDate, names: &MonthNames) -> Self {
        Self {
            month: names.name(date.month0()).map(str::to_string),
            year: Some(date.year()),
        }
    }

    /// Period covering today's month
    pub fn current(names: &MonthNames) -> Self {
        Self::containing(Utc::now().date_naive(), names)
    }

    /// Whether both parts are set and usable for filtering
    pub fn is_active(&self, names: &MonthNames) -> bool {
        let month_ok = self.month.as_deref().and_then(|m| names.index_of(m)).is_some();
        month_ok && self.year.map_or(false, |y| y != 0)
    }

    /// Human-readable description, e.g. "March 2024"
    pub fn label(&self, names: &MonthNames) -> String {
        if !self.is_active(names) {
            return "All time".to_string();
        }
        let month = self.month.as_deref().unwrap_or_default().trim();
        let display = self
            .month
            .as_deref()
            .and_then(|m| names.index_of(m))
            .and_then(|i| names.name(i))
            .unwrap_or(month);
        match self.year {
            Some(year) => format!("{} {}", display, year),
            None => display.to_string(),
        }
    }
}
