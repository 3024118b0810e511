//! IPI Loss Component CLI
//!
//! Loads the loss and recovery registers, runs the calculation and writes
//! the report artifacts.
//!
//! Example:
//!   ipi --losses rero_perdida.csv --recoveries rero_recuperado.csv \
//!       --cin 13946774132.33 --output-dir reporte --period 2025-06

use anyhow::{Context, Result};
use clap::Parser;
use ipi_loss_component::calculation::{CalculationConfig, DEFAULT_CIN, DEFAULT_THRESHOLD};
use ipi_loss_component::report::{self, Report};
use ipi_loss_component::ScenarioRunner;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ipi")]
#[command(version, about = "Operational risk loss component (IPI) calculator")]
struct Cli {
    /// Loss register CSV (RERO_PERDIDA)
    #[arg(long)]
    losses: PathBuf,

    /// Recoveries register CSV (RERO_RECUPERADO)
    #[arg(long)]
    recoveries: PathBuf,

    /// Monetary threshold for Type A / Type B events
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Capital indicator (CIN) used as the ratio denominator
    #[arg(long, default_value_t = DEFAULT_CIN)]
    cin: f64,

    /// Directory for the CSV artifacts and JSON report
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Reporting period label (YYYY-MM)
    #[arg(long, value_parser = parse_period)]
    period: Option<String>,

    /// Print the JSON report to stdout instead of the text summary
    #[arg(long)]
    json: bool,

    /// Extra thresholds to compare against (comma separated)
    #[arg(long, value_delimiter = ',')]
    compare_thresholds: Vec<f64>,
}

fn parse_period(raw: &str) -> Result<String, String> {
    chrono::NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .map(|_| raw.to_string())
        .map_err(|_| format!("expected YYYY-MM, got '{raw}'"))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let runner = ScenarioRunner::from_csv(&cli.losses, &cli.recoveries).with_context(|| {
        format!(
            "Failed to load registers {} and {}",
            cli.losses.display(),
            cli.recoveries.display()
        )
    })?;

    let config = CalculationConfig::new(cli.threshold, cli.cin);
    let result = runner.run(config);
    let period = cli.period.as_deref();

    if let Some(dir) = &cli.output_dir {
        let written = report::write_reports(dir, &result, period)
            .with_context(|| format!("Failed to write reports to {}", dir.display()))?;
        for path in &written {
            eprintln!("Wrote {}", path.display());
        }
    }

    if cli.json {
        println!("{}", Report::new(&result, period).to_json()?);
        return Ok(());
    }

    println!("IPI Loss Component");
    println!("==================\n");
    if let Some(p) = period {
        println!("Period:              {}", p);
    }
    match result.window {
        Some(w) => println!("Window:              {} to {}", w.start, w.end),
        None => println!("Window:              (empty loss register)"),
    }
    println!("Events in window:    {}", result.events.len());
    println!("Threshold:           ${:.2}", config.threshold);
    println!();

    let table = &result.table;
    print!("{:<8}", "");
    for band in &table.bands {
        print!(" {:>16}", format!("Banda {}", band));
    }
    println!(" {:>16}", "TOTAL");
    for row in table.rows() {
        print!("{:<8}", row.label);
        for value in &row.by_band {
            print!(" {:>16.0}", value);
        }
        println!(" {:>16.0}", row.total);
    }

    let indicator = &result.indicator;
    println!("\nSummary:");
    println!("  Average annual loss:   ${:.0}", indicator.average_annual_loss);
    println!("  Capital (avg x 15):    ${:.0}", indicator.capital_result);
    println!("  Ratio C:               {:.4}", indicator.ratio);
    println!("  IPI:                   {}", indicator.ipi);

    if !cli.compare_thresholds.is_empty() {
        println!("\nThreshold comparison:");
        println!("{:>18} {:>8} {:>18} {:>10} {:>6}", "Threshold", "A refs", "Avg loss", "C", "IPI");
        for outcome in runner.threshold_sensitivity(config, &cli.compare_thresholds) {
            println!(
                "{:>18.2} {:>8} {:>18.0} {:>10.4} {:>6}",
                outcome.threshold,
                outcome.type_a_references,
                outcome.average_annual_loss,
                outcome.ratio,
                outcome.ipi
            );
        }
    }

    Ok(())
}
