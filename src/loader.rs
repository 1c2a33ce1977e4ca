// 📂 Data Loader - One-shot load of the business dataset
// Whole dataset or nothing: no retry, no partial results

use crate::business::{clean_text, parse_coordinate, BusinessRecord, Dataset};
use crate::error::{LoadError, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Where the dataset comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, DataSource::Url(_))
    }

    /// Load synchronously (CLI and TUI)
    pub fn load(&self) -> Result<Dataset> {
        match self {
            DataSource::File(path) => load_file(path),
            #[cfg(feature = "http")]
            DataSource::Url(url) => fetch_url_blocking(url),
            #[cfg(not(feature = "http"))]
            DataSource::Url(url) => Err(LoadError::RemoteDisabled { url: url.clone() }),
        }
    }

    /// Load from inside an async runtime (server)
    #[cfg(feature = "http")]
    pub async fn load_async(&self) -> Result<Dataset> {
        match self {
            DataSource::File(path) => load_file(path),
            DataSource::Url(url) => fetch_url(url).await,
        }
    }
}

impl FromStr for DataSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(DataSource::Url(s.to_string()))
        } else {
            Ok(DataSource::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => f.write_str(url),
        }
    }
}

// ============================================================================
// FILE SOURCES
// ============================================================================

/// Load a `.json` or `.csv` data file
pub fn load_file(path: &Path) -> Result<Dataset> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    let raw = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let source_name = path.display().to_string();

    let records = match extension.as_deref() {
        Some("json") => parse_json(&raw, &source_name)?,
        Some("csv") => parse_csv(&raw, &source_name)?,
        _ => {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    info!("Loaded {} businesses from {}", records.len(), source_name);
    Ok(Dataset::new(records, source_name, &raw))
}

/// Decode a JSON array of business objects
pub fn parse_json(raw: &[u8], source_name: &str) -> Result<Vec<BusinessRecord>> {
    serde_json::from_slice(raw).map_err(|source| LoadError::MalformedJson {
        source_name: source_name.to_string(),
        source,
    })
}

/// One CSV row with every cell kept as written
///
/// Cells are read as text so values like "007" or "012345678" survive;
/// the coordinate and empty-cell rules are applied afterwards.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    name: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    industry: Option<String>,
    company_type: Option<String>,
    municipality: Option<String>,
    status: Option<String>,
    founded: Option<String>,
    employees: Option<String>,
    address: Option<String>,
    org_number: Option<String>,
}

impl From<CsvRow> for BusinessRecord {
    fn from(row: CsvRow) -> Self {
        let text = |cell: Option<String>| cell.as_deref().and_then(clean_text);
        let coordinate = |cell: Option<String>| cell.as_deref().and_then(parse_coordinate);

        BusinessRecord {
            name: text(row.name).unwrap_or_default(),
            latitude: coordinate(row.latitude),
            longitude: coordinate(row.longitude),
            industry: text(row.industry),
            company_type: text(row.company_type),
            municipality: text(row.municipality),
            status: text(row.status),
            founded: text(row.founded),
            employees: text(row.employees),
            address: text(row.address),
            org_number: text(row.org_number),
        }
    }
}

/// Decode CSV with a header row using the JSON field names
pub fn parse_csv(raw: &[u8], source_name: &str) -> Result<Vec<BusinessRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw);

    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
        let record = BusinessRecord::from(row.map_err(|source| LoadError::MalformedCsv {
            source_name: source_name.to_string(),
            source,
        })?);
        debug!("csv row {} → {}", idx + 2, record.name);
        records.push(record);
    }
    Ok(records)
}

// ============================================================================
// REMOTE SOURCES
// ============================================================================

/// Plain GET of the JSON document; any non-success status is a failure
#[cfg(feature = "http")]
pub async fn fetch_url(url: &str) -> Result<Dataset> {
    let network = |source| LoadError::Network {
        url: url.to_string(),
        source,
    };

    let response = reqwest::get(url).await.map_err(network)?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let raw = response.bytes().await.map_err(network)?;
    let records = parse_json(&raw, url)?;

    info!("Loaded {} businesses from {}", records.len(), url);
    Ok(Dataset::new(records, url, &raw))
}

#[cfg(feature = "http")]
fn fetch_url_blocking(url: &str) -> Result<Dataset> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| LoadError::Io {
            path: PathBuf::from(url),
            source,
        })?;
    runtime.block_on(fetch_url(url))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_json_file() {
        let file = write_temp(
            ".json",
            r#"[
                {"name": "A", "latitude": 58.9, "longitude": 5.7, "status": "Active",
                 "industry": "Energi", "founded": "2024-01-01"},
                {"name": "B", "latitude": null, "longitude": null}
            ]"#,
        );

        let dataset = load_file(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[0].industry.as_deref(), Some("Energi"));
        assert_eq!(dataset.mappable_count(), 1);
        assert_eq!(dataset.fingerprint.len(), 64);
    }

    #[test]
    fn test_load_csv_file() {
        let file = write_temp(
            ".csv",
            "name,latitude,longitude,industry,company_type,municipality,status,founded,employees,address,org_number\n\
             Acme AS,58.97,5.73,Teknologi,AS,Stavanger,Active,2022-05-01,12,Kirkegata 1,912345678\n\
             Ghost ENK,,,,ENK,,,,,,\n",
        );

        let dataset = load_file(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);

        let acme = &dataset.records[0];
        assert_eq!(acme.coordinates(), Some((58.97, 5.73)));
        assert_eq!(acme.employees.as_deref(), Some("12"));
        assert_eq!(acme.municipality.as_deref(), Some("Stavanger"));

        let ghost = &dataset.records[1];
        assert!(!ghost.is_mappable());
        assert_eq!(ghost.industry, None);
    }

    #[test]
    fn test_csv_keeps_numeric_looking_text() {
        let file = write_temp(
            ".csv",
            "name,latitude,longitude,org_number,employees,status\n\
             007,58.9,5.7,012345678,0050,Active\n\
             Flag AS, 58.8 ,NaN,true,,\n",
        );

        let dataset = load_file(file.path()).unwrap();

        let agent = &dataset.records[0];
        assert_eq!(agent.name, "007");
        assert_eq!(agent.org_number.as_deref(), Some("012345678"));
        assert_eq!(agent.employees.as_deref(), Some("0050"));
        assert_eq!(agent.coordinates(), Some((58.9, 5.7)));

        let flag = &dataset.records[1];
        assert_eq!(flag.latitude, Some(58.8));
        assert_eq!(flag.longitude, None);
        assert_eq!(flag.org_number.as_deref(), Some("true"));
        assert_eq!(flag.employees, None);
        assert!(flag.is_active());
    }

    #[test]
    fn test_malformed_json_is_one_error() {
        let file = write_temp(".json", r#"[{"name": "A"},"#);
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedJson { .. }));

        let file = write_temp(".json", r#"{"name": "not an array"}"#);
        assert!(matches!(
            load_file(file.path()).unwrap_err(),
            LoadError::MalformedJson { .. }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_file(Path::new("/definitely/not/here/data_enriched.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert_eq!(
            err.user_message("data_enriched.json"),
            "Could not load business data. Please ensure 'data_enriched.json' is present."
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".xml", "<businesses/>");
        assert!(matches!(
            load_file(file.path()).unwrap_err(),
            LoadError::UnsupportedFormat { .. }
        ));
    }

    #[test]
    fn test_data_source_parsing() {
        assert_eq!(
            "https://example.com/data.json"
                .parse::<DataSource>()
                .unwrap(),
            DataSource::Url("https://example.com/data.json".to_string())
        );
        let local: DataSource = "data_enriched.json".parse().unwrap();
        assert_eq!(local, DataSource::File(PathBuf::from("data_enriched.json")));
        assert!(!local.is_remote());
        assert_eq!(local.to_string(), "data_enriched.json");
    }

    #[test]
    fn test_source_load_dispatches_to_file() {
        let file = write_temp(".json", "[]");
        let source = DataSource::File(file.path().to_path_buf());
        let dataset = source.load().unwrap();
        assert!(dataset.is_empty());
    }
}
