//! Itemized expense models and CSV record parsing.

use crate::amount::Amount;
use crate::error::{Result, SettleError};
use crate::strategy::SplitStrategy;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum length of any text field accepted from structured input.
pub const MAX_FIELD_LEN: usize = 100;

/// One itemized expense: `payer` fronted `amount` on behalf of `payees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub name: String,
    pub amount: Amount,
    pub payer: String,
    pub payees: Vec<String>,

    /// Per-payee weights or fixed amounts, parallel to `payees`.
    #[serde(default)]
    pub extensions: Vec<Amount>,

    #[serde(default)]
    pub strategy: SplitStrategy,
}

impl Expense {
    /// Creates an evenly split expense.
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        amount: Amount,
        payer: impl Into<String>,
        payees: impl IntoIterator<Item = S>,
    ) -> Self {
        Expense {
            name: name.into(),
            amount,
            payer: payer.into(),
            payees: payees.into_iter().map(Into::into).collect(),
            extensions: Vec::new(),
            strategy: SplitStrategy::Average,
        }
    }

    pub fn with_strategy(mut self, strategy: SplitStrategy, extensions: Vec<Amount>) -> Self {
        self.strategy = strategy;
        self.extensions = extensions;
        self
    }

    /// Applies the structured-input rules: printable text no longer than
    /// [`MAX_FIELD_LEN`] for the name and every address, and a positive amount.
    pub fn validate_fields(&self) -> Result<()> {
        check_text(&self.name, "name", &self.name)?;
        check_text(&self.name, "payer", &self.payer)?;
        for payee in &self.payees {
            check_text(&self.name, "payee", payee)?;
        }
        if self.amount <= Amount::ZERO {
            return Err(SettleError::NonPositiveAmount {
                expense: self.name.clone(),
                amount: self.amount,
            });
        }
        Ok(())
    }
}

fn check_text(expense: &str, field: &'static str, value: &str) -> Result<()> {
    let invalid = |message: String| SettleError::InvalidField {
        expense: expense.to_string(),
        field,
        message,
    };

    if value.chars().count() > MAX_FIELD_LEN {
        return Err(invalid(format!("longer than {} characters", MAX_FIELD_LEN)));
    }
    if let Some(c) = value.chars().find(|c| c.is_control()) {
        return Err(invalid(format!("non-printable character {:?}", c)));
    }
    Ok(())
}

/// Raw expense row as read from CSV.
///
/// Columns are positional: `name, amount, payer, payees[, strategy[, extensions]]`.
/// `payees` and `extensions` are comma-separated lists inside one field.
#[derive(Debug, Clone, Default)]
pub struct ExpenseRecord {
    pub name: String,
    pub amount: String,
    pub payer: String,
    pub payees: String,
    pub strategy: Option<String>,
    pub extensions: Option<String>,
}

impl ExpenseRecord {
    /// Reads the positional columns of a CSV record.
    pub fn from_record(record: &StringRecord, row: usize) -> Result<Self> {
        if !(4..=6).contains(&record.len()) {
            return Err(SettleError::InvalidRecord {
                row,
                message: format!("expected 4 to 6 columns, found {}", record.len()),
            });
        }

        let field = |idx: usize| record.get(idx).map(|s| s.trim().to_string());
        let optional = |idx: usize| field(idx).filter(|s| !s.is_empty());

        Ok(ExpenseRecord {
            name: field(0).unwrap_or_default(),
            amount: field(1).unwrap_or_default(),
            payer: field(2).unwrap_or_default(),
            payees: field(3).unwrap_or_default(),
            strategy: optional(4),
            extensions: optional(5),
        })
    }

    /// Parses the raw record into a typed expense.
    pub fn parse(&self, row: usize) -> Result<Expense> {
        let invalid = |message: String| SettleError::InvalidRecord { row, message };

        let amount = Amount::from_str(&self.amount)
            .map_err(|e| invalid(format!("amount {:?} is not a number: {}", self.amount, e)))?;

        let strategy = match &self.strategy {
            Some(s) => SplitStrategy::from_str(s).map_err(invalid)?,
            None => SplitStrategy::Average,
        };

        let extensions = match &self.extensions {
            Some(s) => split_list(s)
                .map(|v| {
                    Amount::from_str(v).map_err(|e| {
                        invalid(format!("extension value {:?} is not a number: {}", v, e))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(Expense {
            name: self.name.clone(),
            amount,
            payer: self.payer.clone(),
            payees: split_list(&self.payees).map(str::to_string).collect(),
            extensions,
            strategy,
        })
    }
}

fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|v| !v.is_empty())
}
