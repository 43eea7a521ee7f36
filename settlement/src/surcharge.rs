//! Tip and tax distribution
//!
//! Tip and tax are computed on the aggregate base total, then handed back to
//! each participant in proportion to their base share. A zero base total
//! leaves the shares untouched.

use crate::{
    shares::checked_sum,
    types::{Surcharge, TipMode},
    Error, Result,
};
use rust_decimal::Decimal;

/// Shares after surcharge plus the amounts that were distributed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurchargeOutcome {
    /// Base share plus proportional surcharge
    pub share: Vec<Decimal>,

    /// Tip amount
    pub tip: Decimal,

    /// Tax amount
    pub tax: Decimal,
}

impl SurchargeOutcome {
    /// Tip plus tax
    pub fn surcharge_total(&self) -> Result<Decimal> {
        self.tip
            .checked_add(self.tax)
            .ok_or_else(|| Error::overflow("tip plus tax"))
    }
}

impl Surcharge {
    /// Reject negative tip or tax
    pub fn validate(&self) -> Result<()> {
        match self.tip {
            TipMode::Percentage(p) if p < Decimal::ZERO => {
                return Err(Error::InvalidSurcharge(format!(
                    "tip percentage {} is negative",
                    p
                )));
            }
            TipMode::Fixed(amount) if amount < Decimal::ZERO => {
                return Err(Error::InvalidSurcharge(format!(
                    "fixed tip {} is negative",
                    amount
                )));
            }
            _ => {}
        }

        if self.tax_percent < Decimal::ZERO {
            return Err(Error::InvalidSurcharge(format!(
                "tax percentage {} is negative",
                self.tax_percent
            )));
        }

        Ok(())
    }

    /// Tip owed on `total_base`
    pub fn tip_amount(&self, total_base: Decimal) -> Result<Decimal> {
        match self.tip {
            TipMode::None => Ok(Decimal::ZERO),
            TipMode::Percentage(p) => percent_of(total_base, p).ok_or_else(|| Error::overflow("tip")),
            TipMode::Fixed(amount) => Ok(amount),
        }
    }

    /// Tax owed on `total_base`
    pub fn tax_amount(&self, total_base: Decimal) -> Result<Decimal> {
        percent_of(total_base, self.tax_percent).ok_or_else(|| Error::overflow("tax"))
    }
}

fn percent_of(base: Decimal, percent: Decimal) -> Option<Decimal> {
    percent.checked_div(Decimal::ONE_HUNDRED)?.checked_mul(base)
}

/// `part / whole * amount`, with `part <= whole`
fn pro_rata(part: Decimal, whole: Decimal, amount: Decimal) -> Option<Decimal> {
    part.checked_div(whole)?.checked_mul(amount)
}

/// Distribute tip and tax over `share` in proportion to each base share
pub fn apply_surcharge(
    share: Vec<Decimal>,
    total_base: Decimal,
    surcharge: &Surcharge,
) -> Result<SurchargeOutcome> {
    surcharge.validate()?;

    let tip = surcharge.tip_amount(total_base)?;
    let tax = surcharge.tax_amount(total_base)?;
    let extra = tip.checked_add(tax).ok_or_else(|| Error::overflow("tip plus tax"))?;

    let share = if total_base > Decimal::ZERO {
        share
            .into_iter()
            .map(|base| {
                pro_rata(base, total_base, extra)
                    .and_then(|added| base.checked_add(added))
                    .ok_or_else(|| Error::overflow("share with surcharge"))
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        share
    };

    Ok(SurchargeOutcome { share, tip, tax })
}

/// Portion of `extra` fronted by each payer, in proportion to what they paid
///
/// Whoever settled a bill also settled its tip and tax. All zeros when
/// nothing was paid.
pub fn surcharge_outlay(paid: &[Decimal], extra: Decimal) -> Result<Vec<Decimal>> {
    let total_paid = checked_sum(paid, "total paid")?;
    if total_paid <= Decimal::ZERO {
        return Ok(vec![Decimal::ZERO; paid.len()]);
    }

    paid.iter()
        .map(|p| pro_rata(*p, total_paid, extra).ok_or_else(|| Error::overflow("fronted surcharge")))
        .collect()
}
