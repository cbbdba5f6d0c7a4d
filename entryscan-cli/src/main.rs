//! EntryScan CLI: scan a universe, decide on an entry, inspect demand zones.
//!
//! Commands:
//! - `scan`: rank the universe and print the entry shortlist
//! - `decide`: BUY/HOLD with stop-loss / take-profit for one shortlisted symbol
//! - `zones`: demand-zone markers for one symbol over a longer lookback
//! - `universe`: print the default universe as TOML
//! - `config`: print the default scan config as TOML

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use entryscan_core::data::{
    normalize, CircuitBreaker, CsvProvider, DataProvider, LookbackPeriod, SyntheticProvider,
    Universe, YahooProvider,
};
use entryscan_core::domain::{DecisionRecord, Instrument};
use entryscan_core::ScoringProfile;
use entryscan_runner::{ScanConfig, ScanOutcome, ScanService};

#[derive(Parser)]
#[command(
    name = "entryscan",
    about = "EntryScan: demand-zone entry scanner for Bursa Malaysia and commodities"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the universe and print the ranked entry shortlist.
    Scan {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Decide BUY/HOLD for a shortlisted symbol, with risk levels.
    Decide {
        /// Symbol to decide on (e.g., 1155.KL).
        symbol: String,

        #[command(flatten)]
        data: DataArgs,
    },
    /// Print demand-zone markers for one symbol.
    Zones {
        /// Symbol to inspect.
        symbol: String,

        /// Lookback for the zone history.
        #[arg(long, default_value = "6mo")]
        lookback: LookbackPeriod,

        #[command(flatten)]
        data: DataArgs,
    },
    /// Print the default universe as TOML.
    Universe,
    /// Print the default scan config as TOML.
    Config,
}

/// Data source and scan overrides shared by the data commands.
#[derive(Args)]
struct DataArgs {
    /// Scan config TOML. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Universe TOML. Defaults to the built-in universe.
    #[arg(long)]
    universe: Option<PathBuf>,

    /// Read bars from {DIR}/{SYMBOL}.csv instead of Yahoo Finance.
    #[arg(long, conflicts_with = "synthetic")]
    csv_dir: Option<PathBuf>,

    /// Use deterministic synthetic bars (offline).
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Selection threshold (0-100). Defaults to the profile's threshold.
    #[arg(long)]
    min_confidence: Option<f64>,

    /// Scoring profile: tight or classic.
    #[arg(long)]
    profile: Option<ScoringProfile>,

    /// Enable seeded confidence perturbation.
    #[arg(long, default_value_t = false)]
    perturb: bool,

    /// Perturbation seed.
    #[arg(long, requires = "perturb")]
    seed: Option<u64>,

    /// Emit JSON on stdout instead of a table.
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl DataArgs {
    fn scan_config(&self) -> Result<ScanConfig> {
        let mut config = match &self.config {
            Some(path) => ScanConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ScanConfig::default(),
        };
        if let Some(min) = self.min_confidence {
            config.min_confidence = Some(min);
        }
        if let Some(profile) = self.profile {
            config.profile = profile;
        }
        if self.perturb {
            config.enable_stochastic_perturbation = true;
        }
        if let Some(seed) = self.seed {
            config.perturbation_seed = seed;
        }
        config.validate()?;
        Ok(config)
    }

    fn universe(&self) -> Result<Universe> {
        match &self.universe {
            Some(path) => Universe::from_file(path).map_err(anyhow::Error::msg),
            None => Ok(Universe::default_universe()),
        }
    }

    fn provider(&self, config: &ScanConfig) -> Result<Arc<dyn DataProvider>> {
        if let Some(dir) = &self.csv_dir {
            if !dir.is_dir() {
                bail!("CSV directory does not exist: {}", dir.display());
            }
            return Ok(Arc::new(CsvProvider::new(dir)));
        }
        if self.synthetic {
            return Ok(Arc::new(SyntheticProvider::anchored_today()));
        }
        let breaker = Arc::new(CircuitBreaker::default_provider());
        Ok(Arc::new(YahooProvider::new(breaker, config.fetch_timeout())?))
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { data } => run_scan(&data),
        Commands::Decide { symbol, data } => run_decide(&symbol, &data),
        Commands::Zones {
            symbol,
            lookback,
            data,
        } => run_zones(&symbol, lookback, &data),
        Commands::Universe => {
            let toml = Universe::default_universe()
                .to_toml()
                .map_err(anyhow::Error::msg)?;
            print!("{toml}");
            Ok(())
        }
        Commands::Config => {
            print!("{}", ScanConfig::default().to_toml()?);
            Ok(())
        }
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn scan_with(data: &DataArgs) -> Result<(ScanService, Arc<ScanOutcome>)> {
    let config = data.scan_config()?;
    let universe = data.universe()?;
    let provider = data.provider(&config)?;
    info!(
        provider = provider.name(),
        instruments = universe.len(),
        profile = ?config.profile,
        lookback = %config.lookback_period,
        "starting scan"
    );
    let service = ScanService::new(provider, config)?;
    let outcome = service.scan_outcome(&universe)?;
    Ok((service, outcome))
}

fn run_scan(data: &DataArgs) -> Result<()> {
    let (service, outcome) = scan_with(data)?;

    if data.json {
        let skipped: Vec<serde_json::Value> = outcome
            .skipped
            .iter()
            .map(|s| {
                serde_json::json!({
                    "symbol": s.instrument.symbol,
                    "reason": s.error.to_string(),
                })
            })
            .collect();
        let body = serde_json::json!({
            "min_confidence": service.config().effective_min_confidence(),
            "shortlist": outcome.shortlist.records(),
            "skipped": skipped,
            "elapsed_ms": outcome.elapsed.as_millis() as u64,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    print_shortlist(&outcome, service.config().effective_min_confidence());
    Ok(())
}

fn run_decide(symbol: &str, data: &DataArgs) -> Result<()> {
    let (service, outcome) = scan_with(data)?;
    let Some(record) = outcome.shortlist.get(symbol) else {
        bail!(
            "{symbol} is not on the shortlist ({} qualifying instruments)",
            outcome.shortlist.len()
        );
    };
    let decision = service.decide(record);

    if data.json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        print_decision(&decision);
    }
    Ok(())
}

fn run_zones(symbol: &str, lookback: LookbackPeriod, data: &DataArgs) -> Result<()> {
    let config = data.scan_config()?;
    let universe = data.universe()?;
    let instrument = universe
        .find(symbol)
        .cloned()
        .unwrap_or_else(|| Instrument::new(symbol, symbol));
    let provider = data.provider(&config)?;

    let fetched = provider.fetch(&instrument.symbol, lookback, config.bar_interval)?;
    let series = normalize(&instrument.symbol, fetched.bars)?;
    let analyzer = config.analyzer();
    let markers = analyzer.zones().markers(series.bars());

    if data.json {
        println!("{}", serde_json::to_string_pretty(&markers)?);
        return Ok(());
    }

    println!(
        "{} ({}): {} bars, {} in demand zone (window {}, tolerance {:.1}%)",
        instrument.display_name,
        instrument.symbol,
        series.len(),
        markers.len(),
        analyzer.zones().window(),
        analyzer.zones().tolerance() * 100.0
    );
    println!("{:<12} {:>12} {:>12}", "Date", "Floor", "Close");
    println!("{}", "-".repeat(38));
    for m in &markers {
        println!(
            "{:<12} {:>12} {:>12}",
            m.timestamp.format("%Y-%m-%d"),
            instrument.format_price(m.floor),
            instrument.format_price(m.close)
        );
    }
    Ok(())
}

fn print_shortlist(outcome: &ScanOutcome, min_confidence: f64) {
    let shortlist = &outcome.shortlist;
    println!(
        "Scanned {} instruments in {:.1}s, {} skipped, threshold {:.1}%",
        outcome.scored.len() + outcome.skipped.len(),
        outcome.elapsed.as_secs_f64(),
        outcome.skipped.len(),
        min_confidence
    );
    println!();

    if shortlist.is_empty() {
        println!("No instrument met the confidence threshold.");
    } else {
        println!(
            "{:<4} {:<16} {:<10} {:>12} {:>8} {:>8} {:<5} {:<4} {:<6}",
            "#", "Asset", "Symbol", "Price", "Conf", "Mom", "Zone", "Gap", "Volume"
        );
        println!("{}", "-".repeat(82));
        for (rank, r) in shortlist.iter().enumerate() {
            println!(
                "{:<4} {:<16} {:<10} {:>12} {:>7.1}% {:>8.1} {:<5} {:<4} {:<6}",
                rank + 1,
                r.instrument.display_name,
                r.instrument.symbol,
                r.instrument.format_price(r.latest_close),
                r.confidence,
                r.momentum_latest,
                yes_no(r.in_demand_zone),
                yes_no(r.gap_flag),
                if r.volume_spike { "spike" } else { "-" },
            );
        }
    }

    if !outcome.skipped.is_empty() {
        println!();
        println!("Skipped:");
        for s in &outcome.skipped {
            println!("  {:<10} {}", s.instrument.symbol, s.error);
        }
    }
}

fn print_decision(d: &DecisionRecord) {
    let inst = &d.instrument;
    println!("{} ({})", inst.display_name, inst.symbol);
    println!("  Signal:      {}", d.signal);
    println!("  Confidence:  {:.1}%", d.confidence);
    println!("  Entry:       {}", inst.format_price(d.entry_price));
    match (d.stop_loss, d.take_profit) {
        (Some(sl), Some(tp)) => {
            println!("  Stop-loss:   {}", inst.format_price(sl));
            println!("  Take-profit: {}", inst.format_price(tp));
        }
        _ => println!("  No risk levels (HOLD)."),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "-"
    }
}
