// 🏢 Business Records - Immutable dataset loaded once at startup
// Core fields mirror the static JSON document field for field

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

/// Status value that counts as "active" (absent status counts too)
pub const ACTIVE_STATUS: &str = "Active";

/// A single business as found in the data file
/// Never mutated after load
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct BusinessRecord {
    // ========================================================================
    // IDENTITY & DISPLAY
    // ========================================================================
    #[serde(default, deserialize_with = "de_text")]
    pub name: String,

    // ========================================================================
    // LOCATION (record is unmappable if either coordinate is absent)
    // ========================================================================
    #[serde(default, deserialize_with = "de_coordinate")]
    pub latitude: Option<f64>,

    #[serde(default, deserialize_with = "de_coordinate")]
    pub longitude: Option<f64>,

    // ========================================================================
    // CATEGORIES (used by the filters)
    // ========================================================================
    #[serde(default, deserialize_with = "de_optional_text")]
    pub industry: Option<String>,

    #[serde(default, deserialize_with = "de_optional_text")]
    pub company_type: Option<String>,

    #[serde(default, deserialize_with = "de_optional_text")]
    pub municipality: Option<String>,

    #[serde(default, deserialize_with = "de_optional_text")]
    pub status: Option<String>,

    /// Founding date, kept as written in the source
    #[serde(default, deserialize_with = "de_optional_text")]
    pub founded: Option<String>,

    // ========================================================================
    // DISPLAY-ONLY FIELDS
    // ========================================================================
    #[serde(default, deserialize_with = "de_optional_text")]
    pub employees: Option<String>,

    #[serde(default, deserialize_with = "de_optional_text")]
    pub address: Option<String>,

    #[serde(default, deserialize_with = "de_optional_text")]
    pub org_number: Option<String>,
}

impl BusinessRecord {
    /// Both coordinates present and numeric
    pub fn is_mappable(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Status absent or equal to "Active"
    pub fn is_active(&self) -> bool {
        match self.status.as_deref() {
            None => true,
            Some(status) => status == ACTIVE_STATUS,
        }
    }

    /// (lat, lon) when mappable
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Lowercased text the free-text search runs against
    /// Missing fields contribute empty strings
    pub fn search_text(&self) -> String {
        [
            self.name.as_str(),
            self.address.as_deref().unwrap_or(""),
            self.industry.as_deref().unwrap_or(""),
            self.company_type.as_deref().unwrap_or(""),
        ]
        .join(" ")
        .to_lowercase()
    }
}

// ============================================================================
// DATASET
// ============================================================================

/// The loaded record list plus where it came from
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<BusinessRecord>,

    /// Display form of the data source (path or URL)
    pub source: String,

    /// SHA-256 of the raw payload, hex encoded
    pub fingerprint: String,
}

impl Dataset {
    pub fn new(records: Vec<BusinessRecord>, source: impl Into<String>, raw: &[u8]) -> Self {
        Dataset {
            records,
            source: source.into(),
            fingerprint: compute_fingerprint(raw),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records that are active, regardless of any filter
    pub fn active_count(&self) -> usize {
        self.records.iter().filter(|b| b.is_active()).count()
    }

    pub fn mappable_count(&self) -> usize {
        self.records.iter().filter(|b| b.is_mappable()).count()
    }
}

/// Content hash used for cache validation (ETag) and the summary output
pub fn compute_fingerprint(raw: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw);
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// LENIENT FIELD DECODING
// The data file is produced by a scraper: numbers sometimes arrive as
// strings, empty strings mean "missing".
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(f64),
    Text(String),
    Bool(bool),
}

fn de_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Scalar> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Scalar::Number(n)) => Some(n).filter(|n| n.is_finite()),
        Some(Scalar::Text(s)) => parse_coordinate(&s),
        Some(Scalar::Bool(_)) | None => None,
    })
}

fn de_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Scalar> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Scalar::Text(s)) => clean_text(&s),
        Some(Scalar::Number(n)) => Some(format_number(n)),
        Some(Scalar::Bool(b)) => Some(b.to_string()),
        None => None,
    })
}

fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(de_optional_text(deserializer)?.unwrap_or_default())
}

/// Trimmed text, `None` when nothing is left
pub(crate) fn clean_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Finite number written as text, `None` otherwise
pub(crate) fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================
