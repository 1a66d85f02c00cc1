//! Settlement transaction models.

use crate::amount::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One flow of money attributed to an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub address: String,
    pub amount: Amount,
}

impl Payment {
    pub fn new(address: impl Into<String>, amount: Amount) -> Self {
        Payment {
            address: address.into(),
            amount,
        }
    }
}

/// A settlement event: several debtors paying into a single creditor.
///
/// # Invariants
///
/// - `sum(inputs) == output.amount` within the engine tolerance
/// - No amount is negative once the transaction is finalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Display name, taken from the expense or assigned by the settlement run.
    pub name: String,

    /// Debtor contributions, in the order they were collected.
    pub inputs: Vec<Payment>,

    /// The creditor receiving the combined amount.
    pub output: Payment,
}

impl Transaction {
    pub fn new(name: impl Into<String>, inputs: Vec<Payment>, output: Payment) -> Self {
        Transaction {
            name: name.into(),
            inputs,
            output,
        }
    }

    /// Sum of all input amounts.
    pub fn total_input(&self) -> Amount {
        self.inputs.iter().map(|p| p.amount).sum()
    }
}

/// A named, ordered collection of transactions returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub transactions: Vec<Transaction>,
}

impl Package {
    pub fn new(name: impl Into<String>, transactions: Vec<Transaction>) -> Self {
        Package {
            name: name.into(),
            transactions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }
}

/// Human-readable dump. Amounts are rendered with two decimal places.
///
/// ```text
/// Package: trip
/// Transaction: settlement 1
///   in  alice 40.00
///   out bob 40.00
/// ```
impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Package: {}", self.name)?;
        for tx in &self.transactions {
            writeln!(f, "Transaction: {}", tx.name)?;
            for input in &tx.inputs {
                writeln!(f, "  in  {} {}", input.address, input.amount)?;
            }
            writeln!(f, "  out {} {}", tx.output.address, tx.output.amount)?;
        }
        Ok(())
    }
}
