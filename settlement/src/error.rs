//! Error types for the settlement engine

use thiserror::Error;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// An expense points at a participant that does not exist
    #[error("Invalid reference in expense {expense}: participant index {index} out of range (have {participants})")]
    InvalidReference {
        /// Expense carrying the reference
        expense: ExpenseRef,
        /// Offending participant index
        index: usize,
        /// Number of participants in the snapshot
        participants: usize,
    },

    /// Negative expense amount or split weight
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Negative tip or tax configuration
    #[error("Invalid surcharge: {0}")]
    InvalidSurcharge(String),

    /// Empty participant name
    #[error("Invalid participant: {0}")]
    InvalidParticipant(String),

    /// Participant name already present in the group
    #[error("Duplicate participant: {0}")]
    DuplicateParticipant(String),

    /// Participant still referenced by an expense
    #[error("Participant {index} is referenced by expense {expense}")]
    ParticipantInUse {
        /// Participant index
        index: usize,
        /// First expense referencing it
        expense: usize,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Payment link construction error
    #[error("Link error: {0}")]
    Link(#[from] url::ParseError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Location of an invalid reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseRef {
    /// Expense at this position in the snapshot
    At(usize),
    /// Expense not yet added to a book
    Pending,
}

impl std::fmt::Display for ExpenseRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpenseRef::At(idx) => write!(f, "#{}", idx),
            ExpenseRef::Pending => write!(f, "(pending)"),
        }
    }
}

impl Error {
    /// Amount arithmetic left the representable range
    pub fn overflow(what: &str) -> Self {
        Error::InvalidAmount(format!("{} overflows the supported range", what))
    }

    /// Whether this is a caller contract violation on participant indices
    pub fn is_invalid_reference(&self) -> bool {
        matches!(self, Error::InvalidReference { .. })
    }
}
