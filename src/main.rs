// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use business_map::cli::{self, Args, Commands, FilterArgs};
use business_map::{AppConfig, BusinessMap};
use clap::Parser;
use std::io;

fn main() {
    let args = Args::parse();
    business_map::init_logging("business_map=info");

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let (config, source) = cli::resolve(&args)?;
    let map = cli::open_map(&config, &source)?;

    match args
        .command
        .unwrap_or_else(|| Commands::Browse(FilterArgs::default()))
    {
        Commands::Browse(filters) => run_ui_mode(map, &config, &filters),
        Commands::Export(export) => cli::run_export(&map, &config, &export).map(|_| ()),
        Commands::Summary => cli::write_summary(&map, &config, &mut io::stdout().lock()),
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(map: BusinessMap, config: &AppConfig, filters: &FilterArgs) -> Result<()> {
    println!("🗺️  Loading {}...\n", config.title);
    println!(
        "✓ Loaded {} businesses from {}",
        map.dataset().len(),
        map.dataset().source
    );
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(
        map,
        config,
        filters.criteria(),
        filters.render_options(config),
        filters.reference(),
    );
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_map: BusinessMap, _config: &AppConfig, _filters: &FilterArgs) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the map server: cargo run --bin business-map-server --features server");
    eprintln!("   Or export: business-map export --format geojson");
    std::process::exit(1);
}
