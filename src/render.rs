// 🗺️ Render Planner - What the map collaborator should draw
// Every call is a full recomputation from the record list; nothing is diffed

use crate::age::{describe_age, months_since};
use crate::business::BusinessRecord;
use crate::filter::{passes_filters, FilterCriteria};
use crate::palette::ColorAssignment;
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder for missing category-like values
pub const UNKNOWN: &str = "Unknown";
/// Placeholder for missing free-form values
pub const NOT_SPECIFIED: &str = "Not specified";

// ============================================================================
// RENDER TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Popup fields, already display-ready
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupContent {
    pub name: String,
    pub industry: String,
    pub employees: String,
    pub founded: String,
    pub age: String,
    pub address: String,
    pub status: String,
    pub area: String,
    pub org_number: String,
}

impl PopupContent {
    fn from_record(biz: &BusinessRecord, age_months: Option<i32>) -> Self {
        let or = |v: &Option<String>, placeholder: &str| {
            v.clone().unwrap_or_else(|| placeholder.to_string())
        };

        PopupContent {
            name: biz.name.clone(),
            industry: or(&biz.industry, UNKNOWN),
            employees: or(&biz.employees, NOT_SPECIFIED),
            founded: or(&biz.founded, UNKNOWN),
            age: describe_age(age_months),
            address: or(&biz.address, NOT_SPECIFIED),
            status: or(&biz.status, crate::business::ACTIVE_STATUS),
            area: or(&biz.municipality, NOT_SPECIFIED),
            org_number: or(&biz.org_number, NOT_SPECIFIED),
        }
    }

    /// Label/value rows in display order
    pub fn rows(&self) -> [(&'static str, &str); 8] {
        [
            ("Industry", self.industry.as_str()),
            ("Employees", self.employees.as_str()),
            ("Founded", self.founded.as_str()),
            ("Age", self.age.as_str()),
            ("Address", self.address.as_str()),
            ("Status", self.status.as_str()),
            ("Area", self.area.as_str()),
            ("Org. number", self.org_number.as_str()),
        ]
    }
}

/// One marker: a colored pin plus a clickable name label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderEntry {
    pub position: LatLon,
    pub color: String,
    pub label: String,
    pub popup: PopupContent,
    pub age_months: Option<i32>,
}

/// Switches that change how entries look, never which entries exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub cluster: bool,
    pub color_by_industry: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            cluster: true,
            color_by_industry: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub entries: Vec<RenderEntry>,
    pub visible_count: usize,
    pub active_count: usize,
    pub clustered: bool,
}

impl RenderPlan {
    /// Header line shown above the map
    pub fn header(&self) -> String {
        format!(
            "Showing {} active businesses from {} total.",
            group_thousands(self.visible_count),
            group_thousands(self.active_count)
        )
    }
}

// ============================================================================
// PLANNER
// ============================================================================

/// Build the render plan for the current criteria
pub fn plan<S: AsRef<str>>(
    records: &[BusinessRecord],
    criteria: &FilterCriteria,
    colors: &ColorAssignment,
    catch_all: &[S],
    options: RenderOptions,
    reference: NaiveDate,
) -> RenderPlan {
    let entries: Vec<RenderEntry> = records
        .iter()
        .filter(|biz| passes_filters(biz, criteria, catch_all, reference))
        .filter_map(|biz| {
            let (lat, lon) = biz.coordinates()?;
            let age_months = months_since(biz.founded.as_deref(), reference);
            let color = if options.color_by_industry {
                colors.color_for(biz.industry.as_deref())
            } else {
                colors.default_color()
            };

            Some(RenderEntry {
                position: LatLon { lat, lon },
                color: color.to_string(),
                label: biz.name.clone(),
                popup: PopupContent::from_record(biz, age_months),
                age_months,
            })
        })
        .collect();

    RenderPlan {
        visible_count: entries.len(),
        active_count: records.iter().filter(|b| b.is_active()).count(),
        clustered: options.cluster,
        entries,
    }
}

/// 12345 → "12,345"
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ============================================================================
// RENDER SINK
// ============================================================================

/// The map-rendering collaborator
pub trait RenderSink {
    fn render(&mut self, plan: &RenderPlan) -> Result<()>;
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{CategoryFilter, DEFAULT_CATCH_ALL_LABELS};
    use crate::palette::{DEFAULT_MARKER_COLOR, DEFAULT_PALETTE};

    #[derive(Default)]
    struct RecordingSink {
        last: Option<RenderPlan>,
        renders: usize,
    }

    impl RenderSink for RecordingSink {
        fn render(&mut self, plan: &RenderPlan) -> Result<()> {
            self.last = Some(plan.clone());
            self.renders += 1;
            Ok(())
        }
    }

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    fn record(name: &str, industry: Option<&str>, status: Option<&str>) -> BusinessRecord {
        BusinessRecord {
            name: name.to_string(),
            latitude: Some(58.9),
            longitude: Some(5.7),
            industry: industry.map(str::to_string),
            status: status.map(str::to_string),
            founded: Some("2024-01-01".to_string()),
            ..Default::default()
        }
    }

    fn run(
        records: &[BusinessRecord],
        criteria: &FilterCriteria,
        options: RenderOptions,
    ) -> RenderPlan {
        let colors = ColorAssignment::build(
            records,
            &DEFAULT_PALETTE,
            DEFAULT_MARKER_COLOR,
            &DEFAULT_CATCH_ALL_LABELS,
        );
        plan(
            records,
            criteria,
            &colors,
            &DEFAULT_CATCH_ALL_LABELS,
            options,
            reference(),
        )
    }

    #[test]
    fn test_plan_entries_and_counts() {
        let mut unmappable = record("No Geo", Some("Energi"), None);
        unmappable.latitude = None;

        let records = vec![
            record("A", Some("Energi"), Some("Active")),
            record("B", Some("Teknologi"), None),
            record("C", Some("Energi"), Some("Dissolved")),
            unmappable,
        ];
        let plan = run(
            &records,
            &FilterCriteria::default(),
            RenderOptions::default(),
        );

        assert_eq!(plan.visible_count, 2);
        assert_eq!(plan.active_count, 3);
        assert_eq!(plan.entries[0].label, "A");
        assert_eq!(plan.entries[0].color, "#007bff");
        assert_eq!(plan.entries[1].color, "#28a745");
        assert_eq!(
            plan.entries[0].position,
            LatLon {
                lat: 58.9,
                lon: 5.7
            }
        );
        assert_eq!(plan.entries[0].age_months, Some(6));
    }

    #[test]
    fn test_active_count_ignores_filters() {
        let records = vec![
            record("A", Some("Energi"), None),
            record("B", Some("Teknologi"), None),
        ];
        let criteria = FilterCriteria {
            area: CategoryFilter::Exactly("Nowhere".to_string()),
            ..Default::default()
        };
        let plan = run(&records, &criteria, RenderOptions::default());

        assert_eq!(plan.visible_count, 0);
        assert_eq!(plan.active_count, 2);
    }

    #[test]
    fn test_neutral_color_when_unknown_or_disabled() {
        let records = vec![
            record("A", None, None),
            record("B", Some("Annet"), None),
            record("C", Some("Energi"), None),
        ];
        let plan_colored = run(
            &records,
            &FilterCriteria::default(),
            RenderOptions::default(),
        );
        assert_eq!(plan_colored.entries[0].color, DEFAULT_MARKER_COLOR);
        assert_eq!(plan_colored.entries[1].color, DEFAULT_MARKER_COLOR);
        assert_eq!(plan_colored.entries[2].color, "#007bff");

        let options = RenderOptions {
            color_by_industry: false,
            ..Default::default()
        };
        let plan_plain = run(&records, &FilterCriteria::default(), options);
        assert!(plan_plain
            .entries
            .iter()
            .all(|e| e.color == DEFAULT_MARKER_COLOR));
    }

    #[test]
    fn test_clustering_does_not_change_visibility() {
        let records = vec![record("A", Some("Energi"), None), record("B", None, None)];
        let on = run(
            &records,
            &FilterCriteria::default(),
            RenderOptions {
                cluster: true,
                color_by_industry: true,
            },
        );
        let off = run(
            &records,
            &FilterCriteria::default(),
            RenderOptions {
                cluster: false,
                color_by_industry: true,
            },
        );

        assert!(on.clustered);
        assert!(!off.clustered);
        assert_eq!(on.entries, off.entries);
    }

    #[test]
    fn test_popup_placeholders() {
        let mut biz = record("Acme AS", None, None);
        biz.founded = None;
        let plan = run(&[biz], &FilterCriteria::default(), RenderOptions::default());
        let popup = &plan.entries[0].popup;

        assert_eq!(popup.name, "Acme AS");
        assert_eq!(popup.industry, UNKNOWN);
        assert_eq!(popup.founded, UNKNOWN);
        assert_eq!(popup.age, "Unknown age");
        assert_eq!(popup.employees, NOT_SPECIFIED);
        assert_eq!(popup.address, NOT_SPECIFIED);
        assert_eq!(popup.area, NOT_SPECIFIED);
        assert_eq!(popup.org_number, NOT_SPECIFIED);
        assert_eq!(popup.status, "Active");
        assert_eq!(popup.rows().len(), 8);
    }

    #[test]
    fn test_header_text() {
        let plan = RenderPlan {
            entries: vec![],
            visible_count: 1234,
            active_count: 56789,
            clustered: true,
        };
        assert_eq!(
            plan.header(),
            "Showing 1,234 active businesses from 56,789 total."
        );
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_recording_sink() {
        let records = vec![record("A", Some("Energi"), None)];
        let plan = run(
            &records,
            &FilterCriteria::default(),
            RenderOptions::default(),
        );

        let mut sink = RecordingSink::default();
        sink.render(&plan).unwrap();
        sink.render(&plan).unwrap();

        assert_eq!(sink.renders, 2);
        assert_eq!(sink.last.unwrap().visible_count, 1);
    }
}
