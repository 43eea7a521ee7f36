//! Per-expense share accumulation
//!
//! Every expense adds its amount to the payer's `paid` column and spreads the
//! same amount over the `share` column according to its [`SplitPolicy`].
//! Allocation is purely additive, so `sum(share) == sum(amounts)` holds for
//! every policy, fallbacks included.
//!
//! Input is validated in full before anything is allocated: a bad reference
//! anywhere means no table at all.

use crate::{
    error::ExpenseRef,
    types::{Expense, Participant, SplitPolicy, Weight},
    Error, Result,
};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Paid and share columns, indexed like the participant list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareTable {
    /// Amount each participant paid
    pub paid: Vec<Decimal>,

    /// Base share of each participant, before surcharge
    pub share: Vec<Decimal>,
}

impl ShareTable {
    /// Zeroed table for `n` participants
    pub fn zeroed(n: usize) -> Self {
        Self {
            paid: vec![Decimal::ZERO; n],
            share: vec![Decimal::ZERO; n],
        }
    }

    /// Sum of the base shares
    pub fn total_base(&self) -> Result<Decimal> {
        checked_sum(&self.share, "total base")
    }

    /// Sum of the paid column
    pub fn total_paid(&self) -> Result<Decimal> {
        checked_sum(&self.paid, "total paid")
    }
}

/// Sum that reports overflow instead of panicking
pub(crate) fn checked_sum<'a>(
    values: impl IntoIterator<Item = &'a Decimal>,
    what: &str,
) -> Result<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or_else(|| Error::overflow(what))
}

/// Check one expense against a participant count
pub fn validate_expense(expense: &Expense, at: ExpenseRef, participants: usize) -> Result<()> {
    if expense.amount < Decimal::ZERO {
        return Err(Error::InvalidAmount(format!(
            "expense {} has negative amount {}",
            at, expense.amount
        )));
    }

    if let Some(index) = expense.referenced_indices().find(|&idx| idx >= participants) {
        return Err(Error::InvalidReference {
            expense: at,
            index,
            participants,
        });
    }

    if let Some(weight) = expense
        .split
        .weights()
        .iter()
        .find(|w| w.percent < Decimal::ZERO)
    {
        return Err(Error::InvalidAmount(format!(
            "expense {} has negative weight {} for participant {}",
            at, weight.percent, weight.participant
        )));
    }

    Ok(())
}

/// Aggregate paid and base share per participant
pub fn compute_shares(participants: &[Participant], expenses: &[Expense]) -> Result<ShareTable> {
    let n = participants.len();

    for (idx, expense) in expenses.iter().enumerate() {
        validate_expense(expense, ExpenseRef::At(idx), n)?;
    }

    let mut table = ShareTable::zeroed(n);

    for (idx, expense) in expenses.iter().enumerate() {
        let paid = &mut table.paid[expense.payer];
        *paid = paid
            .checked_add(expense.amount)
            .ok_or_else(|| Error::overflow(&format!("paid by participant {}", expense.payer)))?;

        let allocated = match &expense.split {
            SplitPolicy::Equal { included } | SplitPolicy::Subset { included } => {
                split_equally(&mut table.share, expense.amount, included)
            }
            SplitPolicy::Percentage { weights, included } => {
                let total_weight = checked_sum(weights.iter().map(|w| &w.percent), "weights")?;
                if total_weight.is_zero() {
                    // Degenerate weights: equal split over the designated set
                    split_equally(&mut table.share, expense.amount, included)
                } else {
                    split_weighted(&mut table.share, expense.amount, weights, total_weight)
                }
            }
        };
        allocated.ok_or_else(|| Error::overflow(&format!("shares of expense #{}", idx)))?;
    }

    Ok(table)
}

/// Members of `included`, deduplicated in first-seen order; everyone when empty
fn resolve_members(included: &[usize], n: usize) -> Vec<usize> {
    if included.is_empty() {
        return (0..n).collect();
    }

    let mut seen = BTreeSet::new();
    included
        .iter()
        .copied()
        .filter(|idx| seen.insert(*idx))
        .collect()
}

fn split_equally(share: &mut [Decimal], amount: Decimal, included: &[usize]) -> Option<()> {
    let members = resolve_members(included, share.len());
    if members.is_empty() {
        return Some(());
    }

    let per_head = amount.checked_div(Decimal::from(members.len() as u64))?;
    for idx in members {
        share[idx] = share[idx].checked_add(per_head)?;
    }
    Some(())
}

fn split_weighted(
    share: &mut [Decimal],
    amount: Decimal,
    weights: &[Weight],
    total: Decimal,
) -> Option<()> {
    for weight in weights {
        let part = amount.checked_mul(weight.percent.checked_div(total)?)?;
        share[weight.participant] = share[weight.participant].checked_add(part)?;
    }
    Some(())
}
