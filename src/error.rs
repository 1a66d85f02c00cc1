//! Error types for the settlement engine.

use crate::amount::Amount;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, SettleError>;

/// Errors that can occur while splitting, netting or settling expenses.
///
/// Variants fall into three groups: input validation, conservation, and
/// invariant violations. Only the last group indicates corrupted upstream
/// data; see [`SettleError::is_invariant_violation`].
#[derive(Error, Debug)]
pub enum SettleError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed CSV record
    #[error("Invalid expense at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Text field rejected by the structured input rules
    #[error("Expense {expense:?}: invalid {field}: {message}")]
    InvalidField {
        expense: String,
        field: &'static str,
        message: String,
    },

    #[error("Expense {expense:?}: missing payer address")]
    MissingPayer { expense: String },

    #[error("Expense {expense:?}: no payees to distribute to")]
    NoPayees { expense: String },

    #[error("Expense {expense:?}: amount must be positive, got {amount}")]
    NonPositiveAmount { expense: String, amount: Amount },

    #[error("Expense {expense:?}: {payees} payees but {values} extension values")]
    ExtensionLengthMismatch {
        expense: String,
        payees: usize,
        values: usize,
    },

    #[error("Expense {expense:?}: negative extension value {value} for {address}")]
    NegativeExtension {
        expense: String,
        address: String,
        value: Amount,
    },

    #[error("Expense {expense:?}: weights must sum to a positive total, got {sum}")]
    NonPositiveWeightSum { expense: String, sum: Amount },

    #[error("Expense {expense:?}: fixed contributions {fixed} exceed total {total}")]
    FixedExceedsTotal {
        expense: String,
        fixed: Amount,
        total: Amount,
    },

    /// Split output whose inputs do not add up to its output
    #[error("Transaction {name:?} is unbalanced: inputs {input}, output {output}")]
    Unbalanced {
        name: String,
        input: Amount,
        output: Amount,
    },

    /// Debt left over once every creditor has been paid
    #[error("Settlement left {remaining} of unspent input")]
    UnspentInput { remaining: Amount },

    #[error("Creditor {address} could not be covered, short by {shortfall}")]
    UncoveredCreditor { address: String, shortfall: Amount },

    /// Amounts too large to add up within decimal range
    #[error("Amount overflow in {context}")]
    Overflow { context: String },

    /// Broken internal invariant, unreachable with validated input
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl SettleError {
    /// Returns `true` for errors caused by corrupted upstream data rather than
    /// bad user input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, SettleError::InvariantViolation(_))
    }
}
