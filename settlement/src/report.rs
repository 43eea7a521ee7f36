//! Settlement breakdown rendering and export
//!
//! Formatting only: everything here reads a finished [`SettlementReport`].

use crate::{config::DisplayConfig, types::SettlementReport, Error, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt::Write as _;
use std::io;

/// CSV header of the breakdown export
pub const CSV_HEADER: [&str; 6] = [
    "Person",
    "Paid",
    "Share (incl tip/tax)",
    "Net (Paid - Share)",
    "Phone",
    "UPI",
];

/// Round half away from zero to `places`
pub fn round_amount(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount as `-₹1,234.50`
pub fn format_currency(amount: Decimal, symbol: &str, places: u32) -> String {
    let rounded = round_amount(amount, places);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let digits = format!("{:.*}", places as usize, rounded.abs());

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}{}.{}", sign, symbol, grouped, frac),
        None => format!("{}{}{}", sign, symbol, grouped),
    }
}

/// One row of the per-person breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownRow {
    /// Participant name
    #[serde(rename = "Person")]
    pub person: String,

    /// Total outlay, rounded
    #[serde(rename = "Paid")]
    pub paid: Decimal,

    /// Share including tip and tax, rounded
    #[serde(rename = "Share (incl tip/tax)")]
    pub share: Decimal,

    /// Net balance, rounded
    #[serde(rename = "Net (Paid - Share)")]
    pub net: Decimal,

    /// Phone or empty
    #[serde(rename = "Phone")]
    pub phone: String,

    /// UPI id or empty
    #[serde(rename = "UPI")]
    pub upi: String,
}

impl SettlementReport {
    /// Per-person rows rounded to two places
    pub fn breakdown(&self) -> Vec<BreakdownRow> {
        self.participants
            .iter()
            .map(|p| BreakdownRow {
                person: p.name.clone(),
                paid: round_amount(p.outlay(), 2),
                share: round_amount(p.share, 2),
                net: round_amount(p.net, 2),
                phone: p.phone.clone().unwrap_or_default(),
                upi: p.upi_id.clone().unwrap_or_default(),
            })
            .collect()
    }

    /// Write the breakdown as CSV
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(CSV_HEADER)?;
        for row in self.breakdown() {
            csv.write_record([
                row.person,
                format!("{:.2}", row.paid),
                format!("{:.2}", row.share),
                format!("{:.2}", row.net),
                row.phone,
                row.upi,
            ])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Breakdown CSV as a string
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Full report as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Human-readable summary: totals, balances, suggested transfers
    pub fn render_summary(&self, display: &DisplayConfig) -> String {
        let fmt = |amount: Decimal| {
            format_currency(amount, &display.currency_symbol, display.decimal_places)
        };
        let mut out = String::new();

        let _ = writeln!(out, "Trip / Place: {}", display.place_name);
        let _ = writeln!(
            out,
            "Base total: {}  •  Tip: {}  •  Tax: {}  •  Grand total: {}",
            fmt(self.totals.base),
            fmt(self.totals.tip),
            fmt(self.totals.tax),
            fmt(self.totals.grand)
        );

        let _ = writeln!(out, "\nNet balances");
        for p in &self.participants {
            let _ = writeln!(out, "  {}: {}", p.name, fmt(p.net));
        }

        let _ = writeln!(out, "\nSuggested transfers (minimized)");
        if self.transfers.is_empty() {
            let _ = writeln!(out, "  Everything is settled, no transfers needed!");
        }
        for t in &self.transfers {
            let _ = writeln!(out, "  {} → {} : {}", t.from, t.to, fmt(t.amount));
        }

        out
    }
}
