//! Balance checks for transactions.

use crate::amount::Amount;
use crate::error::{Result, SettleError};
use crate::transaction::Transaction;

/// Returns `(total_input, total_output)` for a transaction.
pub fn validate(tx: &Transaction) -> (Amount, Amount) {
    (tx.total_input(), tx.output.amount)
}

/// `true` iff both totals exceed `epsilon` and differ by at most `epsilon`.
pub fn is_balanced(tx: &Transaction, epsilon: Amount) -> bool {
    let (input, output) = validate(tx);
    input > epsilon && output > epsilon && (input - output).abs() <= epsilon
}

/// Fails with [`SettleError::Unbalanced`] naming the transaction.
pub fn ensure_balanced(tx: &Transaction, epsilon: Amount) -> Result<()> {
    if is_balanced(tx, epsilon) {
        return Ok(());
    }
    let (input, output) = validate(tx);
    Err(SettleError::Unbalanced {
        name: tx.name.clone(),
        input,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Payment;

    fn eps() -> Amount {
        Amount::with_scale(1, 9)
    }

    fn tx(inputs: &[i64], output: i64) -> Transaction {
        Transaction::new(
            "t",
            inputs
                .iter()
                .map(|a| Payment::new("d", Amount::from(*a)))
                .collect(),
            Payment::new("c", Amount::from(output)),
        )
    }

    #[test]
    fn test_validate_returns_totals() {
        assert_eq!(
            validate(&tx(&[10, 15], 25)),
            (Amount::from(25), Amount::from(25))
        );
    }

    #[test]
    fn test_balanced_within_tolerance() {
        let mut t = tx(&[10], 10);
        t.inputs[0].amount += Amount::with_scale(1, 10);
        assert!(is_balanced(&t, eps()));
    }

    #[test]
    fn test_unbalanced() {
        let t = tx(&[10, 5], 20);
        assert!(!is_balanced(&t, eps()));
        match ensure_balanced(&t, eps()) {
            Err(SettleError::Unbalanced {
                name,
                input,
                output,
            }) => {
                assert_eq!(name, "t");
                assert_eq!(input, Amount::from(15));
                assert_eq!(output, Amount::from(20));
            }
            other => panic!("Expected Unbalanced, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_totals_are_not_balanced() {
        assert!(!is_balanced(&tx(&[0], 0), eps()));
        assert!(!is_balanced(&tx(&[], 0), eps()));
    }
}
