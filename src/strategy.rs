//! Split strategies: turn one expense into one multi-debtor transaction.
//!
//! Each strategy produces a [`Transaction`] whose output is the payer fronting
//! the full amount and whose inputs are the payees' shares. The payer may also
//! appear among the payees; netting cancels that share later.

use crate::amount::Amount;
use crate::error::{Result, SettleError};
use crate::expense::Expense;
use crate::transaction::{Payment, Transaction};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an expense is distributed among its payees.
///
/// The integer tags (`0..=3`) match the selector carried by structured input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStrategy {
    /// Equal share for every payee.
    #[default]
    Average = 0,

    /// Each payee pays its extension value.
    Fixed = 1,

    /// Shares proportional to extension weights.
    Part = 2,

    /// Non-negative extension values are fixed; payees with a negative value
    /// split what is left evenly.
    FixedBeforeAverage = 3,
}

impl SplitStrategy {
    /// Converts the expense into a transaction according to this strategy.
    pub fn apply(&self, expense: &Expense) -> Result<Transaction> {
        check_preconditions(expense)?;

        let inputs = match self {
            SplitStrategy::Average => average(expense),
            SplitStrategy::Fixed => fixed(expense)?,
            SplitStrategy::Part => part(expense)?,
            SplitStrategy::FixedBeforeAverage => fixed_before_average(expense)?,
        };

        Ok(Transaction::new(
            expense.name.clone(),
            inputs,
            Payment::new(expense.payer.clone(), expense.amount),
        ))
    }
}

impl TryFrom<u8> for SplitStrategy {
    type Error = String;

    fn try_from(tag: u8) -> std::result::Result<Self, Self::Error> {
        match tag {
            0 => Ok(SplitStrategy::Average),
            1 => Ok(SplitStrategy::Fixed),
            2 => Ok(SplitStrategy::Part),
            3 => Ok(SplitStrategy::FixedBeforeAverage),
            _ => Err(format!("unknown split strategy tag {}", tag)),
        }
    }
}

/// Accepts either the integer tag or the strategy name.
impl FromStr for SplitStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(tag) = trimmed.parse::<u8>() {
            return SplitStrategy::try_from(tag);
        }

        match trimmed.to_lowercase().replace('-', "_").as_str() {
            "average" => Ok(SplitStrategy::Average),
            "fixed" => Ok(SplitStrategy::Fixed),
            "part" => Ok(SplitStrategy::Part),
            "fixed_before_average" => Ok(SplitStrategy::FixedBeforeAverage),
            _ => Err(format!("unknown split strategy {:?}", trimmed)),
        }
    }
}

impl fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SplitStrategy::Average => "average",
            SplitStrategy::Fixed => "fixed",
            SplitStrategy::Part => "part",
            SplitStrategy::FixedBeforeAverage => "fixed_before_average",
        };
        f.write_str(name)
    }
}

fn check_preconditions(expense: &Expense) -> Result<()> {
    if expense.payer.trim().is_empty() {
        return Err(SettleError::MissingPayer {
            expense: expense.name.clone(),
        });
    }
    if expense.amount <= Amount::ZERO {
        return Err(SettleError::NonPositiveAmount {
            expense: expense.name.clone(),
            amount: expense.amount,
        });
    }
    if expense.payees.is_empty() {
        return Err(SettleError::NoPayees {
            expense: expense.name.clone(),
        });
    }
    Ok(())
}

fn check_extension_len(expense: &Expense) -> Result<()> {
    if expense.extensions.len() != expense.payees.len() {
        return Err(SettleError::ExtensionLengthMismatch {
            expense: expense.name.clone(),
            payees: expense.payees.len(),
            values: expense.extensions.len(),
        });
    }
    Ok(())
}

fn check_non_negative(expense: &Expense) -> Result<()> {
    let negative = expense
        .payees
        .iter()
        .zip(&expense.extensions)
        .find(|(_, value)| value.is_negative());

    match negative {
        Some((address, value)) => Err(SettleError::NegativeExtension {
            expense: expense.name.clone(),
            address: address.clone(),
            value: *value,
        }),
        None => Ok(()),
    }
}

fn checked_total<'a>(
    expense: &Expense,
    values: impl IntoIterator<Item = &'a Amount>,
) -> Result<Amount> {
    Amount::checked_sum(values).ok_or_else(|| overflow(expense))
}

fn overflow(expense: &Expense) -> SettleError {
    SettleError::Overflow {
        context: format!("expense {:?}", expense.name),
    }
}

fn average(expense: &Expense) -> Vec<Payment> {
    let share = expense.amount.split(expense.payees.len());
    expense
        .payees
        .iter()
        .map(|payee| Payment::new(payee.clone(), share))
        .collect()
}

fn fixed(expense: &Expense) -> Result<Vec<Payment>> {
    check_extension_len(expense)?;
    check_non_negative(expense)?;
    checked_total(expense, &expense.extensions)?;

    Ok(expense
        .payees
        .iter()
        .zip(&expense.extensions)
        .map(|(payee, value)| Payment::new(payee.clone(), *value))
        .collect())
}

fn part(expense: &Expense) -> Result<Vec<Payment>> {
    check_extension_len(expense)?;
    check_non_negative(expense)?;

    let total_weight = checked_total(expense, &expense.extensions)?;
    if total_weight <= Amount::ZERO {
        return Err(SettleError::NonPositiveWeightSum {
            expense: expense.name.clone(),
            sum: total_weight,
        });
    }

    expense
        .payees
        .iter()
        .zip(&expense.extensions)
        .map(|(payee, weight)| {
            let share = expense
                .amount
                .checked_share(*weight, total_weight)
                .ok_or_else(|| overflow(expense))?;
            Ok(Payment::new(payee.clone(), share))
        })
        .collect()
}

fn fixed_before_average(expense: &Expense) -> Result<Vec<Payment>> {
    check_extension_len(expense)?;

    let fixed = checked_total(
        expense,
        expense.extensions.iter().filter(|value| !value.is_negative()),
    )?;
    let remaining = expense.amount - fixed;
    if remaining.is_negative() {
        return Err(SettleError::FixedExceedsTotal {
            expense: expense.name.clone(),
            fixed,
            total: expense.amount,
        });
    }

    let sharers = expense.extensions.iter().filter(|v| v.is_negative()).count();
    let share = if sharers > 0 {
        remaining.split(sharers)
    } else {
        Amount::ZERO
    };

    Ok(expense
        .payees
        .iter()
        .zip(&expense.extensions)
        .map(|(payee, value)| {
            let amount = if value.is_negative() { share } else { *value };
            Payment::new(payee.clone(), amount)
        })
        .collect())
}
