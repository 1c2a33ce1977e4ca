// 🎨 Industry Colors & Filter Options
// Computed once after load; the set of known industries never changes afterwards

use crate::business::BusinessRecord;
use crate::filter::Industry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Marker color for unknown / uncolored industries
pub const DEFAULT_MARKER_COLOR: &str = "#6c757d";

/// Fixed palette, cycled by industry index
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#007bff", "#28a745", "#dc3545", "#ffc107", "#6f42c1", "#fd7e14", "#20c997", "#e83e8c",
    "#17a2b8", "#6c757d",
];

/// Sorted, distinct industries that get their own color
/// Empty values and catch-all labels are left out
pub fn distinct_industries<S: AsRef<str>>(
    records: &[BusinessRecord],
    catch_all: &[S],
) -> Vec<String> {
    records
        .iter()
        .filter_map(
            |b| match Industry::classify(b.industry.as_deref(), catch_all) {
                Industry::Named(name) => Some(name.to_string()),
                Industry::CatchAll | Industry::Unknown => None,
            },
        )
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn distinct<'a, F>(records: &'a [BusinessRecord], field: F) -> Vec<String>
where
    F: Fn(&'a BusinessRecord) -> Option<&'a str>,
{
    records
        .iter()
        .filter_map(field)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ============================================================================
// COLOR ASSIGNMENT
// ============================================================================

/// Write-once industry → color map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorAssignment {
    colors: BTreeMap<String, String>,
    default_color: String,
}

impl ColorAssignment {
    /// Assign `palette[index % palette.len()]` to each industry in sorted order
    pub fn build<S: AsRef<str>, P: AsRef<str>>(
        records: &[BusinessRecord],
        palette: &[P],
        default_color: &str,
        catch_all: &[S],
    ) -> Self {
        let colors = distinct_industries(records, catch_all)
            .into_iter()
            .enumerate()
            .map(|(idx, industry)| {
                let color = if palette.is_empty() {
                    default_color.to_string()
                } else {
                    palette[idx % palette.len()].as_ref().to_string()
                };
                (industry, color)
            })
            .collect();

        ColorAssignment {
            colors,
            default_color: default_color.to_string(),
        }
    }

    /// Color for an industry value, if it has one of its own
    pub fn get(&self, industry: &str) -> Option<&str> {
        self.colors.get(industry).map(String::as_str)
    }

    /// Color for a record's industry, falling back to the neutral default
    pub fn color_for(&self, industry: Option<&str>) -> &str {
        industry
            .and_then(|i| self.get(i))
            .unwrap_or(&self.default_color)
    }

    pub fn default_color(&self) -> &str {
        &self.default_color
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// (industry, color) in sorted industry order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ============================================================================
// FILTER OPTIONS
// ============================================================================

/// Values for the select boxes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub industries: Vec<String>,
    pub company_types: Vec<String>,
    pub municipalities: Vec<String>,
}

impl FilterOptions {
    pub fn collect<S: AsRef<str>>(records: &[BusinessRecord], catch_all: &[S]) -> Self {
        FilterOptions {
            industries: distinct_industries(records, catch_all),
            company_types: distinct(records, |b| b.company_type.as_deref()),
            municipalities: distinct(records, |b| b.municipality.as_deref()),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
