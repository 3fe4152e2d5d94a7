//! CME Engine CLI
//!
//! Command-line interface for computing capital market expectations

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cme_engine::engine::{CalculateResponse, CmeEngine, ComputeRequest, ScenarioComparison};
use cme_engine::inputs::loader::write_defaults_csv;
use cme_engine::inputs::{load_defaults_or_fallback, CsvDefaults, MacroField, Overrides, Region};
use cme_engine::{BaseCurrency, EquityModelKind, ModelConfig, ScenarioRecord, ScenarioRunner};

#[derive(Debug, Parser)]
#[command(name = "cme_engine", version, about = "Capital market expectations engine")]
struct Cli {
    /// Default-value table (section,key,field,value)
    #[arg(long, global = true, default_value = "data/defaults.csv")]
    defaults: PathBuf,

    /// Calibration overrides as JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute every asset class against the all-defaults baseline
    Compute {
        /// Override payload (JSON, model units)
        #[arg(long)]
        overrides: Option<PathBuf>,
        #[arg(long, default_value = "usd")]
        base_currency: BaseCurrency,
        #[arg(long, default_value = "ra")]
        equity_model: EquityModelKind,
        #[arg(long, default_value = "Current Scenario")]
        scenario_name: String,
        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Macro forecast for one region with building blocks changed
    Preview {
        #[arg(long)]
        region: Region,
        /// Building block in model units, e.g. `--set my_ratio=2.4`
        #[arg(long = "set", value_parser = parse_assignment)]
        assignments: Vec<(MacroField, f64)>,
    },
    /// Compare saved scenarios side by side
    Compare {
        /// Scenario record files (JSON)
        #[arg(required = true)]
        scenarios: Vec<PathBuf>,
        #[arg(long, default_value = "ra")]
        equity_model: EquityModelKind,
    },
    /// Print the active default table
    Defaults {
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

fn parse_assignment(s: &str) -> std::result::Result<(MacroField, f64), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{}'", s))?;
    let field: MacroField = field.trim().parse().map_err(|e| format!("{}", e))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value '{}': {}", value, e))?;
    Ok((field, value))
}

fn build_engine(cli: &Cli) -> Result<CmeEngine> {
    let defaults = load_defaults_or_fallback(&CsvDefaults::new(&cli.defaults));
    let config = match &cli.config {
        Some(path) => ModelConfig::from_json_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ModelConfig::default(),
    };
    Ok(CmeEngine::new(defaults, config))
}

fn read_overrides(path: &Path) -> Result<Overrides> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Overrides::from_json(&json).with_context(|| format!("Invalid overrides in {}", path.display()))
}

fn pct(x: f64) -> String {
    format!("{:.2}%", x * 100.0)
}

fn print_macro(response: &CalculateResponse) {
    println!("{:<10} {:>10} {:>10} {:>10} {:>12}", "Region", "Real GDP", "Inflation", "T-Bill", "Nominal GDP");
    println!("{}", "-".repeat(56));
    for (region, m) in &response.macro_forecasts {
        println!(
            "{:<10} {:>10} {:>10} {:>10} {:>12}",
            region,
            pct(m.rgdp_growth),
            pct(m.inflation),
            pct(m.tbill_rate),
            pct(m.nominal_gdp_growth),
        );
    }
    println!(
        "Global real GDP growth: {} ({:?})",
        pct(response.global_rgdp_growth.value),
        response.global_rgdp_growth.source
    );
    println!();
}

fn print_comparison(comparison: &ScenarioComparison) {
    let current = &comparison.current;
    println!(
        "Scenario: {}  (base {}, {} equity)",
        current.scenario_name,
        current.base_currency.as_str().to_uppercase(),
        current.equity_model
    );
    println!();
    print_macro(current);

    let diffs = comparison.nominal_differences();
    println!(
        "{:<24} {:>10} {:>10} {:>10} {:>12}",
        "Asset Class", "Nominal", "Real", "Vol", "vs Default"
    );
    println!("{}", "-".repeat(70));
    for (asset, result) in &current.results {
        let diff_bp = diffs.get(asset).copied().unwrap_or(0.0) * 10_000.0;
        println!(
            "{:<24} {:>10} {:>10} {:>10} {:>10.0}bp",
            result.name,
            pct(result.expected_return_nominal),
            pct(result.expected_return_real),
            pct(result.expected_volatility),
            diff_bp,
        );
    }
}

fn print_side_by_side(responses: &[CalculateResponse]) {
    let Some(first) = responses.first() else {
        return;
    };
    print!("{:<24}", "Asset Class");
    for r in responses {
        print!(" {:>16}", r.scenario_name);
    }
    println!();
    println!("{}", "-".repeat(24 + 17 * responses.len()));
    for (asset, result) in &first.results {
        print!("{:<24}", result.name);
        for r in responses {
            print!(" {:>16}", r.nominal(*asset).map(pct).unwrap_or_default());
        }
        println!();
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let engine = build_engine(&cli)?;

    match cli.command {
        Command::Compute {
            overrides,
            base_currency,
            equity_model,
            scenario_name,
            json,
        } => {
            let mut request = ComputeRequest::new(scenario_name)
                .with_base_currency(base_currency)
                .with_equity_model(equity_model);
            if let Some(path) = overrides {
                request = request.with_overrides(read_overrides(&path)?);
            }

            let start = Instant::now();
            let comparison = engine.compute_with_baseline(&request).context("Compute failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                println!("CME Engine v{}", env!("CARGO_PKG_VERSION"));
                println!("==================\n");
                print_comparison(&comparison);
                println!("\nComputed in {:?}", start.elapsed());
            }
        }
        Command::Preview { region, assignments } => {
            let blocks: BTreeMap<MacroField, f64> = assignments.into_iter().collect();
            let forecast = engine
                .preview_partial(region, &blocks)
                .context("Preview failed")?;
            let i = &forecast.intermediate;
            println!("Macro preview: {}", region);
            println!("  Demographic effect:     {}", pct(i.demographic_effect));
            println!("  Output per capita:      {}", pct(i.output_per_capita_growth));
            println!("  Real GDP growth:        {}", pct(forecast.rgdp_growth));
            println!("  Inflation:              {}", pct(forecast.inflation));
            println!("  Long-term t-bill:       {}", pct(i.long_term_tbill));
            println!("  T-bill:                 {}", pct(forecast.tbill));
            println!("  Nominal GDP growth:     {}", pct(forecast.nominal_gdp_growth));
        }
        Command::Compare { scenarios, equity_model } => {
            let requests = scenarios
                .iter()
                .map(|path| {
                    let json = std::fs::read_to_string(path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    let record = ScenarioRecord::from_json(&json)
                        .with_context(|| format!("Invalid scenario {}", path.display()))?;
                    Ok(record.to_request(equity_model))
                })
                .collect::<Result<Vec<_>>>()?;
            let runner = ScenarioRunner::with_engine(engine);
            let responses = runner.compare(&requests).context("Comparison failed")?;
            print_side_by_side(&responses);
        }
        Command::Defaults { format } => match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(engine.defaults())?),
            OutputFormat::Csv => write_defaults_csv(engine.defaults(), io::stdout())?,
        },
    }

    Ok(())
}
