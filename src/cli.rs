//! Command-line interface for the business map
//!
//! `browse` opens the terminal browser, `export` writes a render plan for a
//! set of filter flags, `summary` prints counts, options and industry colors.

use crate::age::AgeBucket;
use crate::config::AppConfig;
use crate::filter::{CategoryFilter, FilterCriteria, IndustryFilter};
use crate::geojson::GeoJsonSink;
use crate::loader::DataSource;
use crate::render::{RenderOptions, RenderPlan, RenderSink};
use crate::session::{today, BusinessMap};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "business-map",
    version,
    about = "Filter, color-code and map business records",
    long_about = "Loads a static business dataset once and lets you filter it by free text, \
                  company age, industry, company type and area. Browse it in the terminal, \
                  export what the map would show as GeoJSON, or print a summary."
)]
pub struct Args {
    /// TOML configuration file (defaults to ./business-map.toml when present)
    #[arg(short = 'c', long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Data file path or http(s) URL, overrides the configuration
    #[arg(short = 'd', long = "data", value_name = "SOURCE", global = true)]
    pub data: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Browse businesses interactively in the terminal (default)
    Browse(FilterArgs),
    /// Write the render plan for the given filters
    Export(ExportArgs),
    /// Print header counts, filter options and industry colors
    Summary,
}

/// Filter selections, mirroring the map's controls
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct FilterArgs {
    /// Case-insensitive text matched against name, address, industry and company type
    #[arg(short = 's', long = "search", default_value = "")]
    pub search: String,

    /// Age bucket: all, new, growth, young, established
    #[arg(short = 'a', long = "age", default_value = "all")]
    pub age: AgeBucket,

    /// Industry, "all", "exclude-category" or "only-category"
    #[arg(short = 'i', long = "industry", default_value = "all")]
    pub industry: IndustryFilter,

    /// Company type or "all"
    #[arg(short = 't', long = "company-type", default_value = "all")]
    pub company_type: CategoryFilter,

    /// Municipality or "all"
    #[arg(short = 'm', long = "area", default_value = "all")]
    pub area: CategoryFilter,

    /// Place markers individually instead of clustering them
    #[arg(long = "no-cluster")]
    pub no_cluster: bool,

    /// Use the neutral marker color for every business
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Compute ages relative to this date (YYYY-MM-DD) instead of today
    #[arg(long = "reference-date", value_name = "DATE")]
    pub reference_date: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search: self.search.clone(),
            age: self.age,
            industry: self.industry.clone(),
            company_type: self.company_type.clone(),
            area: self.area.clone(),
        }
    }

    /// Cluster default comes from the config unless --no-cluster is given
    pub fn render_options(&self, config: &AppConfig) -> RenderOptions {
        RenderOptions {
            cluster: config.map.cluster_by_default && !self.no_cluster,
            color_by_industry: !self.no_color,
        }
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference_date.unwrap_or_else(today)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// GeoJSON FeatureCollection
    Geojson,
    /// The render plan as-is
    Plan,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    #[arg(short = 'f', long = "format", value_enum, default_value_t = ExportFormat::Geojson)]
    pub format: ExportFormat,

    /// Output file (stdout when omitted)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

// ============================================================================
// SHARED STARTUP
// ============================================================================

/// Resolve configuration and data source from flags
pub fn resolve(args: &Args) -> Result<(AppConfig, DataSource)> {
    let config = AppConfig::load(args.config.as_deref())?;
    let source = match &args.data {
        Some(data) => match data.parse::<DataSource>() {
            Ok(source) => source,
            Err(never) => match never {},
        },
        None => config.data_source(),
    };
    Ok((config, source))
}

/// Load the dataset, logging a load failure once before returning it
pub fn open_map(config: &AppConfig, source: &DataSource) -> Result<BusinessMap> {
    match source.load() {
        Ok(dataset) => Ok(BusinessMap::new(dataset, config)),
        Err(e) => {
            error!("Error loading business data: {}", e);
            Err(anyhow::anyhow!(e.user_message(&source.to_string())))
        }
    }
}

// ============================================================================
// EXPORT / SUMMARY
// ============================================================================

/// Renders through a sink that writes the plan JSON
struct PlanJsonSink<W: Write> {
    writer: W,
}

impl<W: Write> RenderSink for PlanJsonSink<W> {
    fn render(&mut self, plan: &RenderPlan) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, plan)
            .context("Failed to write render plan")?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

pub fn run_export(map: &BusinessMap, config: &AppConfig, args: &ExportArgs) -> Result<RenderPlan> {
    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {:?}", path))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    let criteria = args.filters.criteria();
    let options = args.filters.render_options(config);
    let reference = args.filters.reference();

    let plan = match args.format {
        ExportFormat::Geojson => {
            map.render_to(&mut GeoJsonSink::new(writer), &criteria, options, reference)?
        }
        ExportFormat::Plan => {
            map.render_to(&mut PlanJsonSink { writer }, &criteria, options, reference)?
        }
    };

    info!("{}", plan.header());
    Ok(plan)
}

pub fn write_summary(map: &BusinessMap, config: &AppConfig, out: &mut dyn Write) -> Result<()> {
    let dataset = map.dataset();
    let plan = map.render(
        &FilterCriteria::default(),
        RenderOptions::default(),
        today(),
    );
    let options = map.filter_options();

    writeln!(out, "{}", config.title)?;
    writeln!(out, "{}", "=".repeat(config.title.chars().count()))?;
    writeln!(out, "{}", plan.header())?;
    writeln!(out)?;
    writeln!(out, "Source:      {}", dataset.source)?;
    writeln!(out, "Fingerprint: {}", dataset.fingerprint)?;
    writeln!(
        out,
        "Records:     {} ({} mappable)",
        dataset.len(),
        dataset.mappable_count()
    )?;
    writeln!(out)?;

    writeln!(out, "Industries ({}):", options.industries.len())?;
    for (industry, color) in map.colors().iter() {
        writeln!(out, "  {}  {}", color, industry)?;
    }
    writeln!(
        out,
        "Company types ({}): {}",
        options.company_types.len(),
        options.company_types.join(", ")
    )?;
    writeln!(
        out,
        "Areas ({}): {}",
        options.municipalities.len(),
        options.municipalities.join(", ")
    )?;
    Ok(())
}
