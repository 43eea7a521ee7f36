//! Settlement command-line front end

use anyhow::{Context, Result};
use clap::Parser;
use expense_settlement::{Config, GroupSnapshot, SettlementEngine, Surcharge, TipMode};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Compute balances and minimal transfers for a group of expenses
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Snapshot file with participants and expenses (.json or .toml)
    snapshot: PathBuf,

    /// Configuration file (TOML); environment variables are used otherwise
    #[arg(long, env = "SETTLE_CONFIG")]
    config: Option<PathBuf>,

    /// Tip as a percentage of the base total
    #[arg(long, conflicts_with_all = ["tip_fixed", "no_tip"])]
    tip_percent: Option<Decimal>,

    /// Tip as a fixed amount
    #[arg(long, conflicts_with = "no_tip")]
    tip_fixed: Option<Decimal>,

    /// Disable the tip
    #[arg(long)]
    no_tip: bool,

    /// Tax as a percentage of the base total
    #[arg(long)]
    tax_percent: Option<Decimal>,

    /// Trip / place label used in messages
    #[arg(long)]
    place: Option<String>,

    /// Write the per-person breakdown to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the full report as JSON instead of the text summary
    #[arg(long)]
    json: bool,

    /// Print WhatsApp and UPI links for each transfer
    #[arg(long)]
    links: bool,
}

impl Args {
    fn surcharge(&self, defaults: Surcharge) -> Surcharge {
        let tip = if self.no_tip {
            TipMode::None
        } else if let Some(p) = self.tip_percent {
            TipMode::Percentage(p)
        } else if let Some(amount) = self.tip_fixed {
            TipMode::Fixed(amount)
        } else {
            defaults.tip
        };

        Surcharge::new(tip, self.tax_percent.unwrap_or(defaults.tax_percent))
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::from_env().context("reading SETTLE_* environment")?,
    };
    if let Some(place) = &args.place {
        config.display.place_name = place.clone();
    }

    tracing::info!("Starting {} v{}", config.service_name, config.service_version);

    let snapshot = GroupSnapshot::from_file(&args.snapshot)
        .with_context(|| format!("loading snapshot {}", args.snapshot.display()))?;

    if snapshot.is_degenerate() {
        tracing::warn!("Add at least one person and one expense first");
    }

    let surcharge = args.surcharge(config.surcharge);
    tracing::debug!(?surcharge, "Using surcharge");

    let report = SettlementEngine::new()
        .settle(&snapshot, &surcharge)
        .context("settlement failed")?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_summary(&config.display));
    }

    if args.links {
        println!();
        for action in report.payment_actions(&config.display)? {
            println!("{}", action.message);
            match &action.whatsapp {
                Some(url) => println!("  WhatsApp (payer): {}", url),
                None => println!("  Payer has no phone number"),
            }
            match &action.upi {
                Some(url) => println!("  Pay via UPI: {}", url),
                None => println!("  Receiver has no UPI ID"),
            }
        }

        println!();
        for person in report.person_actions(&config.display)? {
            println!("{}", person.status);
            match &person.whatsapp {
                Some(url) => println!("  WhatsApp: {}", url),
                None => println!("  No phone"),
            }
            if let Some(url) = &person.upi_request {
                println!("  Request via UPI: {}", url);
            }
        }
    }

    if let Some(path) = &args.csv {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        report.write_csv(file)?;
        tracing::info!("Wrote breakdown to {}", path.display());
    }

    Ok(())
}
