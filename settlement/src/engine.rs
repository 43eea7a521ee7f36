//! Main settlement engine
//!
//! Orchestrates share aggregation, surcharge distribution and netting over one
//! [`GroupSnapshot`]. The engine keeps no state between calls.

use crate::{
    book::GroupSnapshot,
    netting::NettingEngine,
    shares::compute_shares,
    surcharge::{apply_surcharge, surcharge_outlay},
    types::*,
    Error, Result,
};
use chrono::Utc;
use rust_decimal::Decimal;

/// Settlement engine
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine {
    /// Netting engine
    netting: NettingEngine,
}

impl SettlementEngine {
    /// Create new settlement engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute balances and transfers for a snapshot
    ///
    /// Any invalid reference or amount fails the whole run, including an
    /// expense in a snapshot without participants. A snapshot with no
    /// expenses yields an all-zero report.
    pub fn settle(&self, snapshot: &GroupSnapshot, surcharge: &Surcharge) -> Result<SettlementReport> {
        surcharge.validate()?;

        if snapshot.participants.is_empty() && snapshot.expenses.is_empty() {
            tracing::debug!("Empty group, nothing to settle");
            return Ok(SettlementReport::empty());
        }

        snapshot.validate_participants()?;

        // Step 1: paid and base share per participant
        let table = compute_shares(&snapshot.participants, &snapshot.expenses)?;
        let total_base = table.total_base()?;

        tracing::debug!(
            participants = snapshot.participants.len(),
            expenses = snapshot.expenses.len(),
            %total_base,
            "Aggregated shares"
        );

        // Step 2: tip and tax, charged on shares and fronted by payers
        let outcome = apply_surcharge(table.share, total_base, surcharge)?;
        let fronted = if total_base > Decimal::ZERO {
            surcharge_outlay(&table.paid, outcome.surcharge_total()?)?
        } else {
            vec![Decimal::ZERO; table.paid.len()]
        };

        let totals = SettlementTotals {
            base: total_base,
            tip: outcome.tip,
            tax: outcome.tax,
            grand: total_base
                .checked_add(outcome.surcharge_total()?)
                .ok_or_else(|| Error::overflow("grand total"))?,
        };

        // Step 3: net positions
        let participants: Vec<ParticipantSummary> = snapshot
            .participants
            .iter()
            .enumerate()
            .map(|(idx, p)| {
                let paid = table.paid[idx];
                let surcharge_paid = fronted[idx];
                let share = outcome.share[idx];
                let net = paid
                    .checked_add(surcharge_paid)
                    .and_then(|outlay| outlay.checked_sub(share))
                    .ok_or_else(|| Error::overflow(&format!("net balance of {}", p.name)))?;
                Ok(ParticipantSummary {
                    name: p.name.clone(),
                    phone: p.phone.clone(),
                    upi_id: p.upi_id.clone(),
                    paid,
                    surcharge_paid,
                    share,
                    net,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let positions: Vec<NetPosition> = participants
            .iter()
            .map(|p| NetPosition::new(p.name.clone(), p.net))
            .collect();

        // Step 4: transfers
        let transfers = self.netting.minimize_transfers(&positions);

        tracing::info!(
            "Settlement complete: {} participants, {} transfers, grand total {}",
            participants.len(),
            transfers.len(),
            totals.grand
        );

        let report = SettlementReport {
            participants,
            totals,
            transfers,
            generated_at: Utc::now(),
        };

        debug_assert!(report
            .outstanding_after_transfers()
            .iter()
            .all(|(_, balance)| balance.abs() <= SETTLED_EPSILON));

        Ok(report)
    }
}
