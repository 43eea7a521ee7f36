//! Core types for the settlement engine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tolerance below which a balance counts as settled
pub const SETTLED_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Tolerance for conservation checks on aggregated sums
pub const CONSERVATION_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// Person tracked in a settlement run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Display name, unique within a group
    pub name: String,

    /// Phone number with country code, used for WhatsApp links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// UPI virtual payment address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
}

impl Participant {
    /// Create participant with no contact details
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: None,
            upi_id: None,
        }
    }

    /// Attach a phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Attach a UPI id
    pub fn with_upi(mut self, upi_id: impl Into<String>) -> Self {
        self.upi_id = Some(upi_id.into());
        self
    }
}

/// Percentage weight of one participant in a percentage split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weight {
    /// Participant index
    pub participant: usize,

    /// Non-negative weight, normalized against the sum of all weights
    pub percent: Decimal,
}

impl Weight {
    /// Create weight
    pub fn new(participant: usize, percent: Decimal) -> Self {
        Self {
            participant,
            percent,
        }
    }
}

/// How an expense is shared between participants
///
/// An empty `included` list always means "everyone".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Equal parts among the included participants
    Equal {
        /// Participants sharing the expense
        #[serde(default)]
        included: Vec<usize>,
    },

    /// Weighted parts; participants without a weight pay nothing
    ///
    /// Falls back to `Equal` over `included` when the weights are empty or
    /// sum to zero.
    Percentage {
        /// Per-participant weights
        #[serde(default)]
        weights: Vec<Weight>,

        /// Fallback set for degenerate weights
        #[serde(default)]
        included: Vec<usize>,
    },

    /// Equal parts among an explicit subset
    Subset {
        /// Participants sharing the expense
        #[serde(default)]
        included: Vec<usize>,
    },
}

impl SplitPolicy {
    /// Equal split over everyone
    pub fn equal() -> Self {
        SplitPolicy::Equal { included: vec![] }
    }

    /// Weighted split
    pub fn percentage(weights: impl IntoIterator<Item = (usize, Decimal)>) -> Self {
        SplitPolicy::Percentage {
            weights: weights
                .into_iter()
                .map(|(participant, percent)| Weight::new(participant, percent))
                .collect(),
            included: vec![],
        }
    }

    /// Equal split over a subset
    pub fn subset(included: impl IntoIterator<Item = usize>) -> Self {
        SplitPolicy::Subset {
            included: included.into_iter().collect(),
        }
    }

    /// Short label used in listings
    pub fn label(&self) -> &'static str {
        match self {
            SplitPolicy::Equal { .. } => "equal",
            SplitPolicy::Percentage { .. } => "custom %",
            SplitPolicy::Subset { .. } => "specific persons",
        }
    }

    /// Designated participant set (empty = everyone)
    pub fn included(&self) -> &[usize] {
        match self {
            SplitPolicy::Equal { included }
            | SplitPolicy::Percentage { included, .. }
            | SplitPolicy::Subset { included } => included.as_slice(),
        }
    }

    /// Percentage weights, empty for the equal policies
    pub fn weights(&self) -> &[Weight] {
        match self {
            SplitPolicy::Percentage { weights, .. } => weights.as_slice(),
            _ => &[],
        }
    }

    /// Every participant index this policy refers to
    pub fn referenced_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.weights()
            .iter()
            .map(|w| w.participant)
            .chain(self.included().iter().copied())
    }
}

impl Default for SplitPolicy {
    fn default() -> Self {
        SplitPolicy::equal()
    }
}

/// Single payment event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Free-form description (e.g. "Dinner")
    #[serde(default)]
    pub description: String,

    /// Amount paid, non-negative
    pub amount: Decimal,

    /// Index of the paying participant
    pub payer: usize,

    /// Sharing policy
    #[serde(default)]
    pub split: SplitPolicy,
}

impl Expense {
    /// Create expense
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        payer: usize,
        split: SplitPolicy,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
            payer,
            split,
        }
    }

    /// Every participant index this expense refers to, payer first
    pub fn referenced_indices(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.payer).chain(self.split.referenced_indices())
    }
}

/// Tip configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum TipMode {
    /// No tip
    #[default]
    None,
    /// Percentage of the base total
    Percentage(Decimal),
    /// Absolute amount
    Fixed(Decimal),
}

/// Tip and tax applied on top of the base total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Surcharge {
    /// Tip mode and value
    pub tip: TipMode,

    /// Tax percentage of the base total
    pub tax_percent: Decimal,
}

impl Surcharge {
    /// No tip, no tax
    pub fn none() -> Self {
        Self::default()
    }

    /// Create surcharge
    pub fn new(tip: TipMode, tax_percent: Decimal) -> Self {
        Self { tip, tax_percent }
    }
}

/// Directed payment instruction from a debtor to a creditor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Debtor (pays)
    pub from: String,

    /// Creditor (receives)
    pub to: String,

    /// Amount, always positive
    pub amount: Decimal,
}

/// Net position of one participant (positive = net receiver, negative = net payer)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetPosition {
    /// Participant name
    pub participant: String,

    /// Paid minus share
    pub net: Decimal,
}

impl NetPosition {
    /// Create position
    pub fn new(participant: impl Into<String>, net: Decimal) -> Self {
        Self {
            participant: participant.into(),
            net,
        }
    }

    /// Check if net payer beyond `epsilon`
    pub fn is_net_payer(&self, epsilon: Decimal) -> bool {
        self.net < -epsilon
    }

    /// Check if net receiver beyond `epsilon`
    pub fn is_net_receiver(&self, epsilon: Decimal) -> bool {
        self.net > epsilon
    }

    /// Get absolute net position
    pub fn abs_net(&self) -> Decimal {
        self.net.abs()
    }
}

/// Per-participant line of a settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSummary {
    /// Participant name
    pub name: String,

    /// Phone, carried through for messaging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// UPI id, carried through for payment links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,

    /// Sum of expense amounts paid
    pub paid: Decimal,

    /// Tip and tax fronted along with those payments
    #[serde(default)]
    pub surcharge_paid: Decimal,

    /// Base share plus surcharge
    pub share: Decimal,

    /// Outlay minus share
    pub net: Decimal,
}

impl ParticipantSummary {
    /// Everything this participant paid, surcharge included
    pub fn outlay(&self) -> Decimal {
        self.paid + self.surcharge_paid
    }
}

/// Aggregate figures of a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettlementTotals {
    /// Sum of base shares
    pub base: Decimal,

    /// Tip amount
    pub tip: Decimal,

    /// Tax amount
    pub tax: Decimal,

    /// Base + tip + tax
    pub grand: Decimal,
}

/// Result of a settlement run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementReport {
    /// Participants in snapshot order
    pub participants: Vec<ParticipantSummary>,

    /// Totals
    pub totals: SettlementTotals,

    /// Transfers settling every balance, in emission order
    pub transfers: Vec<Transfer>,

    /// Created timestamp
    pub generated_at: DateTime<Utc>,
}

impl SettlementReport {
    /// Report with no participants and no transfers
    pub fn empty() -> Self {
        Self {
            participants: vec![],
            totals: SettlementTotals::default(),
            transfers: vec![],
            generated_at: Utc::now(),
        }
    }

    /// Net balances in participant order
    pub fn balances(&self) -> impl Iterator<Item = (&str, Decimal)> + '_ {
        self.participants.iter().map(|p| (p.name.as_str(), p.net))
    }

    /// Net balance of one participant
    pub fn balance_of(&self, name: &str) -> Option<Decimal> {
        self.participants
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.net)
    }

    /// Whether no transfer is needed
    pub fn is_settled(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Balances left after executing every transfer
    ///
    /// A debtor paying `amount` moves up by `amount`; the receiving creditor
    /// moves down by the same.
    pub fn outstanding_after_transfers(&self) -> Vec<(String, Decimal)> {
        let mut outstanding: Vec<(String, Decimal)> = self
            .participants
            .iter()
            .map(|p| (p.name.clone(), p.net))
            .collect();

        for transfer in &self.transfers {
            for (name, balance) in outstanding.iter_mut() {
                if *name == transfer.from {
                    *balance += transfer.amount;
                } else if *name == transfer.to {
                    *balance -= transfer.amount;
                }
            }
        }

        outstanding
    }
}
