use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use herdsim::{output, Scenario};

#[derive(Debug, Parser)]
#[command(author, version, about = "Livestock population and feed-allocation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/baseline.yaml")]
    scenario: PathBuf,

    /// Override the number of simulated months
    #[arg(long)]
    months: Option<usize>,

    /// Write the full run report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let mut scenario = Scenario::load(&cli.scenario)?;
    if let Some(months) = cli.months {
        scenario.months = months;
    }

    let mut setup = scenario.build()?;
    log::info!(
        "running scenario '{}' for {} ({} species, {} months)",
        scenario.name,
        setup.region.country_code(),
        setup.herd.len(),
        scenario.months
    );

    let outputs = setup.simulation.run(
        &mut setup.herd,
        &mut setup.region,
        &setup.feed,
        &setup.grass,
    )?;

    if let Some(report) = &cli.report {
        output::write_report(report, &scenario.name, setup.region.country_code(), &setup.herd, &outputs)?;
        log::info!("report written to {}", report.display());
    }

    let final_head: f64 = setup.herd.iter().map(|s| s.population).sum();
    println!(
        "Scenario '{}' completed after {} months. Final herd: {:.0} head.",
        scenario.name, scenario.months, final_head
    );
    Ok(())
}
