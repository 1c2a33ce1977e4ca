// 📍 Business Map - Loaded dataset plus its write-once derived data
// The one component every front end (server, TUI, export) talks to

use crate::business::Dataset;
use crate::config::AppConfig;
use crate::filter::{passes_filters, FilterCriteria};
use crate::palette::{ColorAssignment, FilterOptions};
use crate::render::{self, RenderOptions, RenderPlan, RenderSink};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct BusinessMap {
    dataset: Dataset,
    colors: ColorAssignment,
    options: FilterOptions,
    catch_all: Vec<String>,
}

impl BusinessMap {
    /// Computes colors and select options once; they stay fixed for the session
    pub fn new(dataset: Dataset, config: &AppConfig) -> Self {
        let catch_all = config.catch_all_industries.clone();
        let colors = ColorAssignment::build(
            &dataset.records,
            &config.colors.palette,
            &config.colors.default_color,
            &catch_all,
        );
        let options = FilterOptions::collect(&dataset.records, &catch_all);

        debug!(
            "{} industries, {} company types, {} areas",
            options.industries.len(),
            options.company_types.len(),
            options.municipalities.len()
        );

        BusinessMap {
            dataset,
            colors,
            options,
            catch_all,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn colors(&self) -> &ColorAssignment {
        &self.colors
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn catch_all(&self) -> &[String] {
        &self.catch_all
    }

    /// Full recomputation of what to draw
    pub fn render(
        &self,
        criteria: &FilterCriteria,
        options: RenderOptions,
        reference: NaiveDate,
    ) -> RenderPlan {
        render::plan(
            &self.dataset.records,
            criteria,
            &self.colors,
            &self.catch_all,
            options,
            reference,
        )
    }

    /// Render and hand the plan to a sink
    pub fn render_to(
        &self,
        sink: &mut dyn RenderSink,
        criteria: &FilterCriteria,
        options: RenderOptions,
        reference: NaiveDate,
    ) -> Result<RenderPlan> {
        let plan = self.render(criteria, options, reference);
        sink.render(&plan)?;
        Ok(plan)
    }

    /// Number of records passing the criteria, without building entries
    pub fn count_visible(&self, criteria: &FilterCriteria, reference: NaiveDate) -> usize {
        self.dataset
            .records
            .iter()
            .filter(|b| passes_filters(b, criteria, &self.catch_all, reference))
            .count()
    }
}

/// "Now" as the filters see it
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
