//! Expense Settlement Engine
//!
//! Splits group expenses across participants and computes the transfers that
//! settle every balance.
//!
//! # Architecture
//!
//! A settlement run is a pure function of a [`GroupSnapshot`] and a
//! [`Surcharge`]:
//!
//! 1. **Aggregation**: Sum what each participant paid and owes per split policy
//! 2. **Surcharge**: Spread tip and tax in proportion to base shares
//! 3. **Positions**: Net balance = outlay - share
//! 4. **Netting**: Greedy matching of debtors against creditors
//!
//! # Invariants
//!
//! - Σ(paid) == Σ(expense amounts)
//! - Σ(share) == base + tip + tax
//! - Σ(net) == 0, and executing every transfer zeroes every balance
//!
//! # Example
//!
//! ```
//! use expense_settlement::{ExpenseBook, SettlementEngine, SplitPolicy, Surcharge};
//! use rust_decimal::Decimal;
//!
//! fn main() -> expense_settlement::Result<()> {
//!     let mut book = ExpenseBook::new();
//!     let a = book.add_participant("A", None, None)?;
//!     book.add_participant("B", None, None)?;
//!     book.add_participant("C", None, None)?;
//!     book.add_expense("Dinner", Decimal::from(300), a, SplitPolicy::equal())?;
//!
//!     let report = SettlementEngine::new().settle(&book.snapshot(), &Surcharge::none())?;
//!     assert_eq!(report.transfers.len(), 2);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod book;
pub mod shares;
pub mod surcharge;
pub mod netting;
pub mod engine;
pub mod report;
pub mod notify;
pub mod error;
pub mod config;

// Re-exports
pub use error::{Error, Result};
pub use types::*;
pub use book::{ExpenseBook, GroupSnapshot};
pub use config::Config;
pub use engine::SettlementEngine;
pub use netting::{minimize_transfers, NettingEngine};
pub use notify::{PaymentActions, PersonActions};
pub use shares::{compute_shares, ShareTable};
pub use surcharge::{apply_surcharge, SurchargeOutcome};
