//! Caller-owned group state
//!
//! An [`ExpenseBook`] accumulates participants and expenses (append-only,
//! with removal by index) and hands out immutable [`GroupSnapshot`]s. The
//! settlement engine only ever sees snapshots.

use crate::{
    error::ExpenseRef,
    shares::validate_expense,
    types::{Expense, Participant, SplitPolicy},
    Error, Result,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Participants and expenses at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    /// Participants in entry order
    #[serde(default)]
    pub participants: Vec<Participant>,

    /// Expenses referencing participants by index
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl GroupSnapshot {
    /// Create snapshot
    pub fn new(participants: Vec<Participant>, expenses: Vec<Expense>) -> Self {
        Self {
            participants,
            expenses,
        }
    }

    /// Load from a `.json` or `.toml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| Error::Serialization(format!("Failed to parse snapshot: {}", e))),
            _ => serde_json::from_str(&content)
                .map_err(|e| Error::Serialization(format!("Failed to parse snapshot: {}", e))),
        }
    }

    /// Whether there is nothing to settle
    pub fn is_degenerate(&self) -> bool {
        self.participants.is_empty() || self.expenses.is_empty()
    }

    /// Reject empty or repeated participant names
    pub fn validate_participants(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for participant in &self.participants {
            let name = participant.name.trim();
            if name.is_empty() {
                return Err(Error::InvalidParticipant(
                    "participant name is empty".to_string(),
                ));
            }
            if !seen.insert(name) {
                return Err(Error::DuplicateParticipant(name.to_string()));
            }
        }
        Ok(())
    }
}

/// Append-only collection of participants and expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseBook {
    participants: Vec<Participant>,
    expenses: Vec<Expense>,
}

impl ExpenseBook {
    /// Create empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Participants in entry order
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Expenses in entry order
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Add a participant; returns its index
    pub fn add_participant(
        &mut self,
        name: &str,
        phone: Option<&str>,
        upi_id: Option<&str>,
    ) -> Result<usize> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidParticipant(
                "participant name is empty".to_string(),
            ));
        }
        if self.participants.iter().any(|p| p.name == name) {
            return Err(Error::DuplicateParticipant(name.to_string()));
        }

        let non_empty = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        self.participants.push(Participant {
            name: name.to_string(),
            phone: non_empty(phone),
            upi_id: non_empty(upi_id),
        });

        Ok(self.participants.len() - 1)
    }

    /// Remove a participant no expense refers to
    ///
    /// Later participants shift down by one and expense references follow.
    pub fn remove_participant(&mut self, index: usize) -> Result<Participant> {
        if index >= self.participants.len() {
            return Err(Error::InvalidReference {
                expense: ExpenseRef::Pending,
                index,
                participants: self.participants.len(),
            });
        }

        if let Some(expense) = self
            .expenses
            .iter()
            .position(|e| e.referenced_indices().any(|idx| idx == index))
        {
            return Err(Error::ParticipantInUse { index, expense });
        }

        let removed = self.participants.remove(index);
        for expense in &mut self.expenses {
            shift_references(expense, index);
        }

        Ok(removed)
    }

    /// Add an expense; returns its index
    pub fn add_expense(
        &mut self,
        description: &str,
        amount: Decimal,
        payer: usize,
        split: SplitPolicy,
    ) -> Result<usize> {
        let expense = Expense::new(description.trim(), amount, payer, split);
        validate_expense(&expense, ExpenseRef::Pending, self.participants.len())?;

        self.expenses.push(expense);
        Ok(self.expenses.len() - 1)
    }

    /// Remove an expense by index
    pub fn remove_expense(&mut self, index: usize) -> Option<Expense> {
        if index < self.expenses.len() {
            Some(self.expenses.remove(index))
        } else {
            None
        }
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.participants.clear();
        self.expenses.clear();
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> GroupSnapshot {
        GroupSnapshot::new(self.participants.clone(), self.expenses.clone())
    }
}

impl TryFrom<GroupSnapshot> for ExpenseBook {
    type Error = Error;

    fn try_from(snapshot: GroupSnapshot) -> Result<Self> {
        let mut book = ExpenseBook::new();
        for p in &snapshot.participants {
            book.add_participant(&p.name, p.phone.as_deref(), p.upi_id.as_deref())?;
        }
        for e in snapshot.expenses {
            book.add_expense(&e.description, e.amount, e.payer, e.split)?;
        }
        Ok(book)
    }
}

fn shift_references(expense: &mut Expense, removed: usize) {
    let shift = |idx: &mut usize| {
        if *idx > removed {
            *idx -= 1;
        }
    };

    shift(&mut expense.payer);
    match &mut expense.split {
        SplitPolicy::Equal { included } | SplitPolicy::Subset { included } => {
            included.iter_mut().for_each(shift);
        }
        SplitPolicy::Percentage { weights, included } => {
            weights.iter_mut().for_each(|w| shift(&mut w.participant));
            included.iter_mut().for_each(shift);
        }
    }
}
