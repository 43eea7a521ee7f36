//! Debt-minimizing transfer construction
//!
//! Greedy two-pointer matching of net payers against net receivers.
//!
//! # Algorithm
//!
//! 1. Split positions into debtors (net < -ε) and creditors (net > ε)
//! 2. Sort debtors ascending by amount owed, creditors descending by amount due
//! 3. Walk both lists, transferring `min(owed, due)` at each step
//! 4. Advance whichever side dropped to ε or below (possibly both)
//!
//! Smallest debts are cleared against the largest credits first. This is a
//! heuristic: it never emits more than `debtors + creditors - 1` transfers
//! but does not always reach the true minimum.
//!
//! # Example
//!
//! ```text
//! Net positions:
//!   A: +200 (net receiver)
//!   B: -100 (net payer)
//!   C: -100 (net payer)
//!
//! Transfers:
//!   B pays A: 100
//!   C pays A: 100
//! ```

use crate::types::{NetPosition, Transfer, SETTLED_EPSILON};
use rust_decimal::Decimal;

/// Netting engine
#[derive(Debug, Clone, Copy)]
pub struct NettingEngine {
    /// Balances within this distance of zero count as settled
    epsilon: Decimal,
}

impl Default for NettingEngine {
    fn default() -> Self {
        Self::new(SETTLED_EPSILON)
    }
}

impl NettingEngine {
    /// Create new netting engine
    pub fn new(epsilon: Decimal) -> Self {
        Self {
            epsilon: epsilon.abs(),
        }
    }

    /// Settled tolerance in use
    pub fn epsilon(&self) -> Decimal {
        self.epsilon
    }

    /// Compute transfers that bring every position to zero
    ///
    /// Ties keep input order, so the same positions always yield the same
    /// transfers.
    pub fn minimize_transfers(&self, positions: &[NetPosition]) -> Vec<Transfer> {
        // (name, remaining magnitude)
        let mut debtors: Vec<(&str, Decimal)> = positions
            .iter()
            .filter(|p| p.is_net_payer(self.epsilon))
            .map(|p| (p.participant.as_str(), p.abs_net()))
            .collect();

        let mut creditors: Vec<(&str, Decimal)> = positions
            .iter()
            .filter(|p| p.is_net_receiver(self.epsilon))
            .map(|p| (p.participant.as_str(), p.abs_net()))
            .collect();

        debtors.sort_by(|a, b| a.1.cmp(&b.1));
        creditors.sort_by(|a, b| b.1.cmp(&a.1));

        let mut transfers = Vec::with_capacity(debtors.len() + creditors.len());
        let (mut i, mut j) = (0, 0);

        while i < debtors.len() && j < creditors.len() {
            let amount = debtors[i].1.min(creditors[j].1);

            if amount > Decimal::ZERO {
                transfers.push(Transfer {
                    from: debtors[i].0.to_string(),
                    to: creditors[j].0.to_string(),
                    amount,
                });
            }

            debtors[i].1 -= amount;
            creditors[j].1 -= amount;

            if debtors[i].1 <= self.epsilon {
                i += 1;
            }
            if creditors[j].1 <= self.epsilon {
                j += 1;
            }
        }

        tracing::trace!(
            debtors = debtors.len(),
            creditors = creditors.len(),
            transfers = transfers.len(),
            "netting complete"
        );

        transfers
    }
}

/// Compute transfers with the default tolerance
pub fn minimize_transfers(positions: &[NetPosition]) -> Vec<Transfer> {
    NettingEngine::default().minimize_transfers(positions)
}
