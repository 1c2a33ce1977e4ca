// 🔎 Filter Engine - Pure predicates over business records
// Criteria are an immutable value; every check is independent and conjunctive

use crate::age::{months_since, AgeBucket};
use crate::business::BusinessRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Neutral value for every select filter
pub const ALL: &str = "all";
/// Industry composite: everything except the catch-all category
pub const EXCLUDE_CATCH_ALL: &str = "exclude-category";
/// Industry composite: only the catch-all category
pub const ONLY_CATCH_ALL: &str = "only-category";

/// Labels that mean "other" when no configuration says otherwise
pub const DEFAULT_CATCH_ALL_LABELS: [&str; 2] = ["Annet", "Other"];

// ============================================================================
// INDUSTRY CLASSIFICATION
// ============================================================================

/// How a record's industry value is treated by coloring and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Industry<'a> {
    /// A regular industry: gets its own color and filter option
    Named(&'a str),
    /// The catch-all "other" category
    CatchAll,
    /// No industry recorded
    Unknown,
}

impl<'a> Industry<'a> {
    pub fn classify<S: AsRef<str>>(value: Option<&'a str>, catch_all: &[S]) -> Self {
        match value {
            None => Industry::Unknown,
            Some(v) if v.is_empty() => Industry::Unknown,
            Some(v) if catch_all.iter().any(|label| label.as_ref() == v) => Industry::CatchAll,
            Some(v) => Industry::Named(v),
        }
    }
}

// ============================================================================
// CATEGORY FILTERS
// ============================================================================

/// Select box value for company type and area
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Exactly(String),
}

impl CategoryFilter {
    /// Missing values never match a specific selection
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Exactly(wanted) => value == Some(wanted.as_str()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CategoryFilter::All => ALL,
            CategoryFilter::Exactly(v) => v,
        }
    }

    /// Step through `options` (preceded by "all"), wrapping around
    pub fn cycle(&self, options: &[String]) -> Self {
        let current = match self {
            CategoryFilter::All => None,
            CategoryFilter::Exactly(v) => options.iter().position(|o| o == v),
        };
        match current {
            None if options.is_empty() => CategoryFilter::All,
            None => CategoryFilter::Exactly(options[0].clone()),
            Some(i) if i + 1 < options.len() => CategoryFilter::Exactly(options[i + 1].clone()),
            Some(_) => CategoryFilter::All,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == ALL {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Exactly(s.to_string()))
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Select box value for industry, including the catch-all composites
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IndustryFilter {
    #[default]
    All,
    Exactly(String),
    ExcludeCatchAll,
    OnlyCatchAll,
}

impl IndustryFilter {
    pub fn matches<S: AsRef<str>>(&self, value: Option<&str>, catch_all: &[S]) -> bool {
        match self {
            IndustryFilter::All => true,
            IndustryFilter::Exactly(wanted) => value == Some(wanted.as_str()),
            IndustryFilter::ExcludeCatchAll => {
                Industry::classify(value, catch_all) != Industry::CatchAll
            }
            IndustryFilter::OnlyCatchAll => {
                Industry::classify(value, catch_all) == Industry::CatchAll
            }
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            IndustryFilter::All => ALL,
            IndustryFilter::Exactly(v) => v,
            IndustryFilter::ExcludeCatchAll => EXCLUDE_CATCH_ALL,
            IndustryFilter::OnlyCatchAll => ONLY_CATCH_ALL,
        }
    }

    /// all → each industry → exclude-category → only-category → all
    pub fn cycle(&self, options: &[String]) -> Self {
        match self {
            IndustryFilter::All => match options.first() {
                Some(first) => IndustryFilter::Exactly(first.clone()),
                None => IndustryFilter::ExcludeCatchAll,
            },
            IndustryFilter::Exactly(v) => match options.iter().position(|o| o == v) {
                Some(i) if i + 1 < options.len() => IndustryFilter::Exactly(options[i + 1].clone()),
                _ => IndustryFilter::ExcludeCatchAll,
            },
            IndustryFilter::ExcludeCatchAll => IndustryFilter::OnlyCatchAll,
            IndustryFilter::OnlyCatchAll => IndustryFilter::All,
        }
    }
}

impl FromStr for IndustryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" | ALL => IndustryFilter::All,
            EXCLUDE_CATCH_ALL => IndustryFilter::ExcludeCatchAll,
            ONLY_CATCH_ALL => IndustryFilter::OnlyCatchAll,
            other => IndustryFilter::Exactly(other.to_string()),
        })
    }
}

impl fmt::Display for IndustryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// FILTER CRITERIA
// ============================================================================

/// Current UI selections, passed by value into the predicate
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub search: String,
    pub age: AgeBucket,
    pub industry: IndustryFilter,
    pub company_type: CategoryFilter,
    pub area: CategoryFilter,
}

impl FilterCriteria {
    /// Empty search and every select on its neutral value
    pub fn is_neutral(&self) -> bool {
        self.search_term().is_empty()
            && self.age == AgeBucket::Any
            && self.industry == IndustryFilter::All
            && self.company_type == CategoryFilter::All
            && self.area == CategoryFilter::All
    }

    /// Search term as compared: trimmed and lowercased
    pub fn search_term(&self) -> String {
        self.search.trim().to_lowercase()
    }

    /// URL query form, neutral values omitted
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        let term = self.search.trim();
        if !term.is_empty() {
            pairs.push(("search", term.to_string()));
        }
        if self.age != AgeBucket::Any {
            pairs.push(("age", self.age.as_str().to_string()));
        }
        if self.industry != IndustryFilter::All {
            pairs.push(("industry", self.industry.as_str().to_string()));
        }
        if self.company_type != CategoryFilter::All {
            pairs.push(("company_type", self.company_type.as_str().to_string()));
        }
        if self.area != CategoryFilter::All {
            pairs.push(("area", self.area.as_str().to_string()));
        }

        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Raw textual criteria as they arrive from query strings or CLI flags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterQuery {
    pub search: Option<String>,
    pub age: Option<String>,
    pub industry: Option<String>,
    pub company_type: Option<String>,
    pub area: Option<String>,
}

impl TryFrom<FilterQuery> for FilterCriteria {
    type Error = String;

    fn try_from(q: FilterQuery) -> Result<Self, Self::Error> {
        let parse_category = |v: Option<String>| match v {
            Some(v) => v.parse::<CategoryFilter>().unwrap_or_default(),
            None => CategoryFilter::All,
        };

        Ok(FilterCriteria {
            search: q.search.unwrap_or_default(),
            age: match q.age {
                Some(a) => a.parse()?,
                None => AgeBucket::Any,
            },
            industry: match q.industry {
                Some(i) => i.parse().unwrap_or_default(),
                None => IndustryFilter::All,
            },
            company_type: parse_category(q.company_type),
            area: parse_category(q.area),
        })
    }
}

// ============================================================================
// PREDICATE
// ============================================================================

/// Does this record pass every active filter?
///
/// Pure: the reference date stands in for "now" so results are reproducible.
pub fn passes_filters<S: AsRef<str>>(
    biz: &BusinessRecord,
    criteria: &FilterCriteria,
    catch_all: &[S],
    reference: NaiveDate,
) -> bool {
    // Only active companies with valid coordinates
    if !biz.is_mappable() {
        return false;
    }
    if !biz.is_active() {
        return false;
    }

    let term = criteria.search_term();
    if !term.is_empty() && !biz.search_text().contains(&term) {
        return false;
    }

    if criteria.age != AgeBucket::Any
        && !criteria
            .age
            .contains(months_since(biz.founded.as_deref(), reference))
    {
        return false;
    }

    if !criteria
        .industry
        .matches(biz.industry.as_deref(), catch_all)
    {
        return false;
    }

    if !criteria.company_type.matches(biz.company_type.as_deref()) {
        return false;
    }

    criteria.area.matches(biz.municipality.as_deref())
}

// ============================================================================
// TESTS
// ============================================================================
