use airzen_core::config::EngineConfig;
use airzen_core::{
    AirQualityEngine, AirQualityReport, LiveResponse, PolicyMultipliers, Pollutant,
    PollutantReading, RegressionModel,
};
use chrono::{Local, Timelike, Utc};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Air quality engine demo with configurable inputs
#[derive(Parser, Debug)]
#[command(name = "airzen-demo")]
#[command(about = "AQI, source attribution, policy simulation and forecast demo", long_about = None)]
struct Args {
    /// PM2.5 in µg/m³
    #[arg(long)]
    pm25: Option<f64>,

    /// PM10 in µg/m³
    #[arg(long)]
    pm10: Option<f64>,

    /// NO2 in µg/m³
    #[arg(long)]
    no2: Option<f64>,

    /// SO2 in µg/m³
    #[arg(long)]
    so2: Option<f64>,

    /// CO in mg/m³
    #[arg(long)]
    co: Option<f64>,

    /// O3 in µg/m³
    #[arg(long)]
    o3: Option<f64>,

    /// Local hour of day used for forecasting (defaults to the current hour)
    #[arg(long)]
    hour: Option<u32>,

    /// Authoritative current AQI used to calibrate the forecast
    #[arg(long)]
    live_aqi: Option<f64>,

    /// Decoded upstream payload (JSON) to assess instead of the flags above
    #[arg(long)]
    payload: Option<PathBuf>,

    /// Engine configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trained regression model file (JSON)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Source reduction, e.g. `traffic=0.5` (repeatable)
    #[arg(short, long = "policy", value_name = "SOURCE=MULTIPLIER")]
    policies: Vec<String>,

    /// Seed for the multi-day outlook
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn parse_policy(raw: &str) -> Result<(&str, f64), String> {
    let (source, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("policy '{raw}' must look like SOURCE=MULTIPLIER"))?;
    let multiplier = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("policy '{raw}': {e}"))?;
    Ok((source.trim(), multiplier))
}

fn reading_from_args(args: &Args) -> PollutantReading {
    [
        (Pollutant::Pm25, args.pm25),
        (Pollutant::Pm10, args.pm10),
        (Pollutant::No2, args.no2),
        (Pollutant::So2, args.so2),
        (Pollutant::Co, args.co),
        (Pollutant::O3, args.o3),
    ]
    .into_iter()
    .filter_map(|(p, v)| v.map(|v| (p, v)))
    .fold(PollutantReading::new(), |r, (p, v)| r.with(p, v))
}

fn print_report(report: &AirQualityReport) {
    println!("=== Air Quality Report ===\n");
    println!(
        "AQI: {:.0} ({}, {:?})",
        report.aqi, report.risk_level, report.provenance
    );
    if let Some(dominant) = report.dominant {
        println!("Dominant pollutant: {dominant}");
    }

    println!("\nPollutants:");
    for (pollutant, value) in report.pollutants.present() {
        println!("  {:<6} {:>8.2} {}", pollutant.symbol(), value, pollutant.unit());
    }

    println!("\nPollution sources:");
    for (category, share) in report.pollution_sources.iter() {
        println!("  {:<14} {:>3}%", category.name(), share);
    }

    println!("\nForecast:");
    for point in &report.forecast {
        println!("  {:<6} {:>5.0}  [{:?}]", point.label, point.aqi, point.provenance);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let engine = match &args.model {
        Some(path) => AirQualityEngine::with_model(config, RegressionModel::load(path)?)?,
        None => AirQualityEngine::new(config)?,
    };

    let report = if let Some(path) = &args.payload {
        let response = LiveResponse::from_json_str(&fs::read_to_string(path)?)?;
        engine.assess_live(&response, Utc::now())?
    } else {
        let reading = reading_from_args(args);
        let hour = args.hour.unwrap_or_else(|| Local::now().hour());
        engine.assess(&reading, hour, args.live_aqi, None)
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !args.policies.is_empty() {
        let pairs = args
            .policies
            .iter()
            .map(|raw| parse_policy(raw))
            .collect::<Result<Vec<_>, _>>()?;
        let multipliers = PolicyMultipliers::from_named(pairs);
        let outcome = engine.simulate_policy(&report.pollutants, &multipliers);
        println!("\n=== Policy Simulation ===");
        println!(
            "AQI {:.0} → {:.0} ({:.1}% improvement, {})",
            outcome.original_aqi, outcome.simulated_aqi, outcome.improvement_pct, outcome.risk_level
        );
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let outlook = engine.outlook(report.aqi, Local::now().date_naive(), &mut rng);
    println!("\n=== Outlook ===");
    for day in outlook {
        println!("  {:<10} {:>4} {:?} ({})", day.day, day.aqi, day.condition, day.risk);
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    info!(?args, "Starting air quality demo");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
