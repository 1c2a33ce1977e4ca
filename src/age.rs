// ⏳ Company Age - Calendar months since founding + age buckets

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound (inclusive) of the "new" bucket, in months
pub const NEW_MAX_MONTHS: i32 = 6;
/// Upper bound (inclusive) of the "growth" bucket, in months
pub const GROWTH_MAX_MONTHS: i32 = 18;
/// Upper bound (inclusive) of the "young" bucket, in months
pub const YOUNG_MAX_MONTHS: i32 = 36;

/// Parse a founding date in any of the forms the data file uses
pub fn parse_founded(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%d.%m.%Y").ok()
}

/// Whole calendar months between founding and the reference date
///
/// Only the year and month components count: 2024-01-31 → 2024-02-01 is one
/// month. Returns `None` when the date is missing or cannot be parsed.
pub fn months_since(founded: Option<&str>, reference: NaiveDate) -> Option<i32> {
    let founded = parse_founded(founded?)?;
    let years = reference.year() - founded.year();
    let months = reference.month() as i32 - founded.month() as i32;
    Some(years * 12 + months)
}

/// Human-readable age for popups
pub fn describe_age(months: Option<i32>) -> String {
    let months = match months {
        Some(m) => m,
        None => return "Unknown age".to_string(),
    };

    if months < 12 {
        return plural(months, "month");
    }

    let years = months / 12;
    let rest = months % 12;
    if rest == 0 {
        plural(years, "year")
    } else {
        format!("{}, {}", plural(years, "year"), plural(rest, "month"))
    }
}

fn plural(n: i32, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

// ============================================================================
// AGE BUCKET
// ============================================================================

/// Named range of months-since-founding
///
/// Bounds are inclusive on both sides, so a company exactly on a boundary
/// (6, 18 or 36 months) belongs to two adjacent buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeBucket {
    #[default]
    #[serde(rename = "all", alias = "any")]
    Any,
    New,
    Growth,
    Young,
    Established,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 5] = [
        AgeBucket::Any,
        AgeBucket::New,
        AgeBucket::Growth,
        AgeBucket::Young,
        AgeBucket::Established,
    ];

    /// Does a company of this age fall in the bucket?
    /// Unknown age only matches `Any`.
    pub fn contains(&self, months: Option<i32>) -> bool {
        if *self == AgeBucket::Any {
            return true;
        }
        let m = match months {
            Some(m) => m,
            None => return false,
        };

        match self {
            AgeBucket::Any => true,
            AgeBucket::New => m <= NEW_MAX_MONTHS,
            AgeBucket::Growth => (NEW_MAX_MONTHS..=GROWTH_MAX_MONTHS).contains(&m),
            AgeBucket::Young => (GROWTH_MAX_MONTHS..=YOUNG_MAX_MONTHS).contains(&m),
            AgeBucket::Established => m >= YOUNG_MAX_MONTHS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBucket::Any => "all",
            AgeBucket::New => "new",
            AgeBucket::Growth => "growth",
            AgeBucket::Young => "young",
            AgeBucket::Established => "established",
        }
    }

    /// Label for select boxes
    pub fn label(&self) -> &'static str {
        match self {
            AgeBucket::Any => "All ages",
            AgeBucket::New => "New (0-6 months)",
            AgeBucket::Growth => "Growth (6-18 months)",
            AgeBucket::Young => "Young (18-36 months)",
            AgeBucket::Established => "Established (3+ years)",
        }
    }

    /// Next bucket in select-box order, wrapping around
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|b| b == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | "any" => Ok(AgeBucket::Any),
            "new" => Ok(AgeBucket::New),
            "growth" => Ok(AgeBucket::Growth),
            "young" => Ok(AgeBucket::Young),
            "established" => Ok(AgeBucket::Established),
            other => Err(format!(
                "unknown age bucket '{}' (expected all, new, growth, young or established)",
                other
            )),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
