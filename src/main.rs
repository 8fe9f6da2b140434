use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use supply_curve::chart;
use supply_curve::config::AppConfig;
use supply_curve::observability;
use supply_curve::records::{CsvRecordSource, parse_interval};
use supply_curve::server;
use supply_curve::supply::{ClearingOutcome, SupplyCurve, SupplyCurveBuilder};

#[derive(Parser)]
#[command(name = "supply-curve-rs", version, about = "Merit-order supply curves from generator offer curves")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the supply curve from a CSV snapshot and print a summary
    Summary {
        /// Offer-curve snapshot
        #[arg(long)]
        csv: PathBuf,
        /// Interval start (RFC 3339 or "YYYY-MM-DD HH:MM:SS", UTC)
        #[arg(long)]
        interval: Option<String>,
        /// Only admit these operating statuses (comma-separated)
        #[arg(long, value_delimiter = ',')]
        status: Vec<String>,
        /// Demand in MW (default: load factor × total capacity)
        #[arg(long)]
        demand: Option<f64>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write a standalone HTML chart of the supply curve
    Plot {
        /// Offer-curve snapshot
        #[arg(long)]
        csv: PathBuf,
        /// HTML file to write
        #[arg(long, short)]
        output: PathBuf,
        /// Market scenario shown in the chart title
        #[arg(long, default_value = "Current Grid")]
        scenario: String,
        #[arg(long)]
        interval: Option<String>,
        #[arg(long, value_delimiter = ',')]
        status: Vec<String>,
        #[arg(long)]
        demand: Option<f64>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Start the HTTP server
    Serve {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => AppConfig::load(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    match Cli::parse().command {
        Commands::Summary {
            csv,
            interval,
            status,
            demand,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let interval = interval.as_deref().map(parse_interval).transpose()?;
            let curve = load_curve(&config, &csv, interval, &status).await?;
            summary(&config, &curve, demand)
        }
        Commands::Plot {
            csv,
            output,
            scenario,
            interval,
            status,
            demand,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let label = interval.clone().unwrap_or_else(|| "latest".to_string());
            let interval = interval.as_deref().map(parse_interval).transpose()?;
            let curve = load_curve(&config, &csv, interval, &status).await?;
            plot(&config, &curve, demand, &scenario, &label, &output).await
        }
        Commands::Serve { config } => server::start_server(load_config(config.as_deref())?).await,
    }
}

async fn load_curve(
    config: &AppConfig,
    csv: &Path,
    interval: Option<chrono::DateTime<chrono::Utc>>,
    statuses: &[String],
) -> Result<SupplyCurve> {
    let records = CsvRecordSource::new(csv)
        .load(interval)
        .await
        .with_context(|| format!("Failed to read {}", csv.display()))?;

    let builder = SupplyCurveBuilder::new(config.builder.clone());
    Ok(if statuses.is_empty() {
        builder.build(&records)
    } else {
        builder.build_for_statuses(&records, statuses)
    })
}

async fn plot(
    config: &AppConfig,
    curve: &SupplyCurve,
    demand: Option<f64>,
    scenario: &str,
    interval: &str,
    output: &Path,
) -> Result<()> {
    if curve.is_empty() {
        anyhow::bail!("No offer capacity available to plot");
    }

    let demand = demand.unwrap_or_else(|| curve.demand_at_load_factor(config.chart.load_factor));
    let outcome = curve.clear(demand)?;
    let plot = chart::build_plot(curve, &outcome, &config.chart);

    let title = format!("Supply Curve: {scenario}");
    let html = server::render_plot_page(&title, interval, curve, &plot)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output, html)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Supply curve chart written to {}", output.display());
    Ok(())
}

fn summary(config: &AppConfig, curve: &SupplyCurve, demand: Option<f64>) -> Result<()> {
    let stats = curve.stats;

    println!("=== Supply Curve ===\n");
    println!("Records: {} seen, {} used", stats.records_seen, stats.records_used);
    println!("Segments: {}", curve.points.len());
    println!("Total capacity: {:.2} MW", curve.total_capacity);
    if let Some((low, high)) = curve.price_range() {
        println!("Price range: ${low:.2} to ${high:.2}/MWh");
    }

    println!("\n=== Filtered Records ===\n");
    println!("  Excluded status:      {}", stats.skipped_status);
    println!("  Missing identity:     {}", stats.skipped_missing_identity);
    println!("  Placeholder identity: {}", stats.placeholder_identity);
    println!("  Missing schedule:     {}", stats.skipped_missing_schedule);
    println!("  Idle renewables:      {}", stats.skipped_zero_schedule);
    println!("  Malformed curves:     {}", stats.malformed_curves);
    println!("  Truncated renewables: {}", stats.truncated_renewables);

    if curve.is_empty() {
        println!("\nNo offer capacity available");
        return Ok(());
    }

    println!("\n=== Capacity by Resource Type ===\n");
    for (resource_type, summary) in &curve.resource_types {
        println!(
            "  {:<12} {:<18} {:>10.1} MW | from ${:.2}/MWh",
            resource_type,
            summary.category.label(),
            summary.capacity,
            summary.marginal_cost
        );
    }

    let demand = demand.unwrap_or_else(|| curve.demand_at_load_factor(config.chart.load_factor));

    println!("\n=== Market Clearing ===\n");
    match curve.clear(demand)? {
        ClearingOutcome::Cleared(result) => {
            println!("  Demand: {:.2} MW", result.demand);
            println!("  Clearing price: ${:.2}/MWh", result.clearing_price);
            println!(
                "  Marginal unit: {} ({})",
                result.marginal_resource_name, result.marginal_resource_type
            );
            if let Some(avg) = result.avg_dispatched_cost {
                println!("  Average dispatched cost: ${avg:.2}/MWh");
            }
            println!("  Dispatch:");
            for (resource_type, mw) in &result.dispatched_capacity_by_type {
                println!("    {resource_type:<12} {mw:>10.1} MW");
            }
        }
        ClearingOutcome::Shortfall {
            demand,
            total_capacity,
            unserved,
        } => {
            println!("  Demand: {demand:.2} MW");
            println!("  Shortfall: {unserved:.2} MW unserved ({total_capacity:.2} MW offered)");
        }
    }

    Ok(())
}
