//! Passes that strip negligible residue from settled transactions.

use crate::amount::Amount;
use crate::error::{Result, SettleError};
use crate::transaction::Transaction;

/// Zeroes every input strictly below `min_value` and deducts it from the
/// transaction output.
///
/// `min_value` must exceed `epsilon`. A negative input, or an output pushed
/// below zero by the deduction, is an invariant violation. All transactions
/// are checked before any is modified, so `transactions` is untouched on error.
pub fn suppress_small_values(
    transactions: &mut [Transaction],
    min_value: Amount,
    epsilon: Amount,
) -> Result<()> {
    if min_value <= epsilon {
        return Err(SettleError::InvariantViolation(format!(
            "minimum value {:?} must exceed epsilon {:?}",
            min_value.value(),
            epsilon.value()
        )));
    }

    let mut outputs = Vec::with_capacity(transactions.len());
    for tx in transactions.iter() {
        let mut output = tx.output.amount;
        for input in &tx.inputs {
            if input.amount.is_negative() {
                return Err(SettleError::InvariantViolation(format!(
                    "transaction {:?} carries negative input {:?} for {}",
                    tx.name,
                    input.amount.value(),
                    input.address
                )));
            }
            if input.amount < min_value {
                output -= input.amount;
            }
        }

        if output.is_negative() {
            if !output.is_negligible(epsilon) {
                return Err(SettleError::InvariantViolation(format!(
                    "transaction {:?} output for {} went negative",
                    tx.name, tx.output.address
                )));
            }
            output = Amount::ZERO;
        }
        outputs.push(output);
    }

    for (tx, output) in transactions.iter_mut().zip(outputs) {
        for input in tx.inputs.iter_mut().filter(|i| i.amount < min_value) {
            input.amount = Amount::ZERO;
        }
        tx.output.amount = output;
    }

    Ok(())
}

/// Drops transactions whose output is at most `epsilon`, then inputs at most
/// `epsilon` inside the survivors.
pub fn remove_degenerate(transactions: Vec<Transaction>, epsilon: Amount) -> Vec<Transaction> {
    transactions
        .into_iter()
        .filter(|tx| tx.output.amount > epsilon)
        .map(|mut tx| {
            tx.inputs.retain(|input| input.amount > epsilon);
            tx
        })
        .collect()
}
