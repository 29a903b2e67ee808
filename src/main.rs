mod api;
mod server;

use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use seo_forecast::config::{ForecastConfig, OptionOverrides};
use seo_forecast::ctr::CtrSource;
use seo_forecast::dataset::RawTable;
use seo_forecast::error::{ProjectionError, Result};
use seo_forecast::scenario::ScenarioId;
use seo_forecast::timeline::DurationProfile;
use seo_forecast::{analyze, format_float, format_number, format_percent, AnalysisReport};

#[derive(Parser)]
#[command(name = "seo-forecast", about = "Keyword ranking what-if traffic forecaster")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Project traffic for a keyword ranking CSV export.
    Analyze(AnalyzeArgs),
    /// List scenarios, CTR sources and duration profiles.
    Scenarios,
    /// Write the default config file.
    InitConfig(InitConfigArgs),
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    /// CSV file, or `-` for stdin.
    input: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    scenario: Option<String>,
    #[arg(long)]
    ctr_source: Option<String>,
    #[arg(long)]
    conversion_rate: Option<f64>,
    #[arg(long)]
    duration: Option<String>,
    #[arg(long)]
    timeline_mode: Option<String>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    details: bool,
    #[arg(long, conflicts_with = "details")]
    json: bool,
}

impl AnalyzeArgs {
    fn overrides(&self) -> OptionOverrides {
        OptionOverrides {
            scenario: self.scenario.clone(),
            ctr_source: self.ctr_source.clone(),
            conversion_rate: self.conversion_rate,
            duration: self.duration.clone(),
            timeline_mode: self.timeline_mode.clone(),
            seed: self.seed,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(default_value = "config/forecast.toml")]
    path: PathBuf,
    #[arg(long)]
    force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Scenarios => {
            print_catalog();
            Ok(())
        }
        Command::InitConfig(args) => run_init_config(args),
        Command::Serve(args) => server::serve(args).await,
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let (mut config, _) = ForecastConfig::load(args.config.clone())?;
    config.apply(&args.overrides());
    let options = config.to_options()?;

    let table = if args.input.as_os_str() == "-" {
        RawTable::from_reader(io::stdin().lock())?
    } else {
        RawTable::from_path(&args.input)?
    };

    let report = analyze(&table, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report, args.details);
    Ok(())
}

fn print_report(report: &AnalysisReport, details: bool) {
    let totals = &report.totals;

    println!(
        "Scenario: {} ({})",
        report.scenario_description, report.scenario
    );
    println!(
        "CTR source: {} | duration: {} | timeline: {} | conversion rate: {}%",
        report.ctr_source,
        report.duration,
        report.timeline_mode.label(),
        format_float(report.conversion_rate, 1)
    );
    if let Some(seed) = report.random_seed {
        println!("Random seed: {}", seed);
    }
    println!(
        "Keywords: {} projected, {} failed",
        totals.keywords, totals.failed
    );
    println!(
        "Clicks: current {} -> potential {} ({}{})",
        format_number(totals.current_clicks),
        format_number(totals.potential_traffic),
        if totals.traffic_gain() >= 0.0 { "+" } else { "" },
        format_number(totals.traffic_gain())
    );
    println!(
        "Conversions: current {} -> potential {}",
        format_number(totals.current_conversions),
        format_number(totals.potential_conversions)
    );

    println!("\nClicks over time:");
    for point in &report.monthly {
        println!(
            "  Month {}: {} clicks | {} conversions",
            point.month,
            format_number(point.clicks),
            format_number(point.conversions)
        );
    }

    if report.clusters.len() > 1 {
        println!("\nClusters:");
        for cluster in &report.clusters {
            println!(
                "  {}: {} keywords | clicks {} -> {} | conversions {} -> {}",
                cluster.cluster,
                cluster.keywords,
                format_number(cluster.current_clicks),
                format_number(cluster.potential_traffic),
                format_number(cluster.current_conversions),
                format_number(cluster.potential_conversions)
            );
        }
    }

    if details {
        println!("\nKeywords:");
        for row in report.rows.iter().filter(|row| row.is_valid()) {
            println!(
                "  {}: position {} -> {} | CTR {} | volume {} | clicks {} -> {}{}",
                row.source.keyword,
                format_float(row.source.current_position, 1),
                format_float(row.adjusted_position, 1),
                format_percent(row.potential_ctr),
                format_number(row.source.search_volume),
                format_number(row.source.current_clicks.unwrap_or(0.0)),
                format_number(row.potential_traffic),
                if row.ctr_fallback { " (fallback CTR)" } else { "" }
            );
        }
    }

    let failed: Vec<_> = report.failed_rows().collect();
    if !failed.is_empty() {
        println!("\nFailed rows:");
        for row in failed {
            if let Some(error) = &row.error {
                println!("- {}", error);
            }
        }
    }
}

fn print_catalog() {
    println!("Scenarios:");
    for id in ScenarioId::ALL {
        println!("  {:<22} {}", id.label(), id.description());
    }
    println!("\nCTR sources:");
    for source in CtrSource::ALL {
        println!("  {:<22} {}", source.label(), source.description());
    }
    println!("\nDurations:");
    for profile in DurationProfile::ALL {
        let curve = profile.curve();
        let percentages: Vec<String> = curve
            .percentages()
            .iter()
            .map(|pct| format_float(*pct, 0))
            .collect();
        println!("  {:<22} {}", profile.label(), percentages.join(", "));
    }
}

fn run_init_config(args: InitConfigArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        return Err(ProjectionError::Config(format!(
            "{} already exists; pass --force to overwrite",
            args.path.display()
        )));
    }
    ForecastConfig::default().write(&args.path)?;
    println!("Wrote {}", args.path.display());
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
