// Business Map - Core Library
// Exposes all modules for use in CLI, TUI, API server, and tests

pub mod age;
pub mod business;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod geojson;
pub mod loader;
pub mod palette;
pub mod render;
pub mod session;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use age::{describe_age, months_since, AgeBucket};
pub use business::{BusinessRecord, Dataset};
pub use config::AppConfig;
pub use debounce::Debouncer;
pub use error::LoadError;
pub use filter::{
    passes_filters, CategoryFilter, FilterCriteria, FilterQuery, Industry, IndustryFilter,
};
pub use geojson::{to_feature_collection, GeoJsonSink};
pub use loader::{load_file, DataSource};
pub use palette::{ColorAssignment, FilterOptions};
pub use render::{LatLon, PopupContent, RenderEntry, RenderOptions, RenderPlan, RenderSink};
pub use session::BusinessMap;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the tracing subscriber used by every binary
///
/// `RUST_LOG` wins; otherwise `default_filter` (e.g. "business_map=info").
pub fn init_logging(default_filter: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
