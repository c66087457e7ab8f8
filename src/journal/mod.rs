//! Contribution journals: JSON-lines files of `(address, amount)` pairs that
//! the CLI replays into a fresh [`Ledger`].
//!
//! ```text
//! {"address":"0x70997970c51812dc3a010c7d01b50e0d17dc79c8","amount":"2.5"}
//! {"address":"0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc","amount":"1.8"}
//! ```

use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::ledger::{Ledger, LedgerError, LedgerEvent};
use crate::types::{self, Address, Amount, ParseError, ADDRESS_LEN, BASE_UNITS_PER_UNIT};

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("journal line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContributionRecord {
    pub address: Address,
    #[serde(with = "types::units")]
    pub amount: Amount,
}

impl ContributionRecord {
    pub fn new(address: Address, amount: Amount) -> Self {
        Self { address, amount }
    }
}

pub fn read_journal(path: &Path) -> Result<Vec<ContributionRecord>, JournalError> {
    let file = File::open(path)?;
    parse_journal(BufReader::new(file))
}

pub fn parse_journal<R: BufRead>(reader: R) -> Result<Vec<ContributionRecord>, JournalError> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .map_err(|source| JournalError::Line { line: idx + 1, source })?;
        records.push(record);
    }
    Ok(records)
}

pub fn write_journal<W: Write>(mut out: W, records: &[ContributionRecord]) -> Result<(), JournalError> {
    for record in records {
        let line = serde_json::to_string(record).map_err(std::io::Error::from)?;
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

#[derive(Clone, Debug, Default)]
pub struct ReplayReport {
    pub applied: usize,
    /// `(1-based record index, reason)` for every contribution the ledger refused.
    pub rejected: Vec<(usize, LedgerError)>,
    pub events: Vec<LedgerEvent>,
}

/// Apply `records` in order. Refused contributions are logged and skipped.
pub fn replay(ledger: &mut Ledger, records: &[ContributionRecord]) -> ReplayReport {
    let mut report = ReplayReport::default();
    for (idx, record) in records.iter().enumerate() {
        match ledger.contribute(record.address, record.amount) {
            Ok(receipt) => {
                report.applied += 1;
                report.events.extend(receipt.events);
            }
            Err(err) => {
                warn!(record = idx + 1, address = %record.address, "contribution rejected: {err}");
                report.rejected.push((idx + 1, err));
            }
        }
    }
    report
}

/// Reproducible random journal: `donors` distinct addresses, each amount
/// between 0.100 and 1.000 units in steps of 0.001.
pub fn simulate(seed: u64, donors: usize, contributions: usize) -> Vec<ContributionRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let pool: Vec<Address> = (0..donors.max(1))
        .map(|_| rng.gen::<[u8; ADDRESS_LEN]>().into())
        .collect();
    (0..contributions)
        .map(|_| {
            let address = pool[rng.gen_range(0..pool.len())];
            let thousandths: Amount = rng.gen_range(100..=1_000);
            ContributionRecord::new(address, thousandths * (BASE_UNITS_PER_UNIT / 1_000))
        })
        .collect()
}

/// The five-donor population used for demos: two Gold, one Silver, two
/// Bronze contributors.
pub fn demo_population() -> Result<Vec<ContributionRecord>, ParseError> {
    const DEMO: [(&str, &str); 5] = [
        ("0x70997970c51812dc3a010c7d01b50e0d17dc79c8", "2.5"),
        ("0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc", "1.8"),
        ("0x90f79bf6eb2c4f870365e785982e1f101e93b906", "0.8"),
        ("0x15d34aaf54267db7d7c367839aaf71a00a2c6a65", "0.3"),
        ("0x9965507d1a55bcc2695c58ba16fb37d819b0a4dc", "0.15"),
    ];
    DEMO.iter()
        .map(|(address, amount)| {
            Ok::<_, ParseError>(ContributionRecord::new(
                address.parse()?,
                types::parse_units(amount)?,
            ))
        })
        .collect()
}
