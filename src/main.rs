//! `donation-box`: replay contribution journals through the ledger and print
//! totals, milestone progress and the leaderboard.

use std::{
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use donation_box::{
    format_units,
    journal::{self, ContributionRecord, ReplayReport},
    Address, BadgeTier, Ledger, LedgerConfig,
};

#[derive(Parser)]
#[command(name = "donation-box", version, about = "Donation ledger with badges, milestones and a leaderboard")]
struct Cli {
    /// Ledger config JSON; falls back to $DONATION_BOX_CONFIG, then built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a JSON-lines contribution journal and print the resulting state.
    Replay {
        journal: PathBuf,
        /// Print every emitted event.
        #[arg(long)]
        events: bool,
        /// Print the ledger snapshot as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Generate a reproducible random journal and replay it.
    Simulate {
        #[arg(long, default_value_t = 20)]
        donors: usize,
        #[arg(long, default_value_t = 100)]
        contributions: usize,
        #[arg(long, default_value_t = 52)]
        seed: u64,
        /// Also write the generated journal here.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Replay the built-in five-donor population.
    Demo {
        #[arg(long)]
        events: bool,
    },
    /// Replay a journal and report one contributor.
    Donor { journal: PathBuf, address: Address },
    /// Print the effective configuration.
    Config,
}

fn main() -> Result<()> {
    // .env may carry RUST_LOG, so load it before the subscriber reads the filter
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Replay {
            journal: path,
            events,
            json,
        } => {
            let records = journal::read_journal(&path)
                .with_context(|| format!("reading journal {}", path.display()))?;
            run(&config, &records, events, json)
        }
        Command::Simulate {
            donors,
            contributions,
            seed,
            out,
            json,
        } => {
            let records = journal::simulate(seed, donors, contributions);
            if let Some(out) = out {
                let file = File::create(&out)
                    .with_context(|| format!("creating journal {}", out.display()))?;
                journal::write_journal(BufWriter::new(file), &records)?;
                info!(path = %out.display(), records = records.len(), "journal written");
            }
            run(&config, &records, false, json)
        }
        Command::Demo { events } => run(&config, &journal::demo_population()?, events, false),
        Command::Donor {
            journal: path,
            address,
        } => {
            let records = journal::read_journal(&path)
                .with_context(|| format!("reading journal {}", path.display()))?;
            let mut ledger = Ledger::new(&config)?;
            let report = journal::replay(&mut ledger, &records);
            print_donor(&ledger, &report, &address);
            Ok(())
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<LedgerConfig> {
    let config = match path {
        Some(path) => LedgerConfig::from_path(path)?,
        None => LedgerConfig::from_env()?,
    };
    Ok(config)
}

fn run(config: &LedgerConfig, records: &[ContributionRecord], events: bool, json: bool) -> Result<()> {
    let mut ledger = Ledger::new(config)?;
    let report = journal::replay(&mut ledger, records);
    info!(
        applied = report.applied,
        rejected = report.rejected.len(),
        "journal replayed"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&ledger.snapshot())?);
        return Ok(());
    }
    if events {
        print_events(&report)?;
    }
    print_summary(&ledger, &report);
    Ok(())
}

fn print_donor(ledger: &Ledger, report: &ReplayReport, address: &Address) {
    for line in donor_lines(ledger, report, address) {
        println!("{line}");
    }
}

fn donor_lines(ledger: &Ledger, report: &ReplayReport, address: &Address) -> Vec<String> {
    let donated = ledger.donation(address);
    let badge = ledger.donor_badge(address);

    let mut lines = vec![format!(
        "Applied:  {} ({} rejected)",
        report.applied,
        report.rejected.len()
    )];
    for (record, err) in &report.rejected {
        lines.push(format!("  record {record}: {err}"));
    }
    lines.push(format!("Donor:    {address}"));
    lines.push(format!("Donated:  {}", format_units(donated)));
    lines.push(format!("Badge:    {} (tier {})", badge, badge.index()));
    lines.push(match BadgeTier::ALL.get(usize::from(badge.index()) + 1) {
        Some(&next) => {
            let threshold = ledger.tiers().threshold(next);
            format!(
                "Next:     {} at {} ({} to go)",
                next,
                format_units(threshold),
                format_units(threshold.saturating_sub(donated))
            )
        }
        None => "Next:     top tier reached".to_string(),
    });
    lines.push(
        match ledger.leaderboard().iter().position(|s| s.address == *address) {
            Some(rank) => format!("Rank:     #{}", rank + 1),
            None => "Rank:     not on the leaderboard".to_string(),
        },
    );
    lines
}

fn print_events(report: &ReplayReport) -> Result<()> {
    println!("Events:");
    for event in &report.events {
        println!("  {}", serde_json::to_string(event)?);
    }
    println!();
    Ok(())
}

fn print_summary(ledger: &Ledger, report: &ReplayReport) {
    let next = ledger.next_milestone();
    let bps = next.progress_bps();

    println!("Applied:           {} ({} rejected)", report.applied, report.rejected.len());
    println!("Total donations:   {}", format_units(ledger.total_donations()));
    println!("Contract balance:  {}", format_units(ledger.contract_balance()));
    println!("Donors:            {}", ledger.donor_count());
    println!(
        "Milestones:        {}/{}",
        ledger.milestones_reached(),
        ledger.milestones().len()
    );
    if next.is_exhausted() {
        println!("Next milestone:    all milestones reached");
    } else {
        println!(
            "Next milestone:    {} ({}.{:02}%, {} to go)",
            format_units(next.threshold),
            bps / 100,
            bps % 100,
            format_units(next.remaining())
        );
    }
    println!("State root:        {}", hex::encode(ledger.state_root()));

    let top = ledger.top_donors();
    println!();
    println!("Leaderboard:");
    if top.is_empty() {
        println!("  (no donors yet)");
    }
    for (rank, ((address, amount), badge)) in top
        .addresses
        .iter()
        .zip(&top.amounts)
        .zip(&top.badges)
        .enumerate()
    {
        println!(
            "  {}. {}  {:>12}  {}",
            rank + 1,
            address.short(),
            format_units(*amount),
            badge
        );
    }
}
