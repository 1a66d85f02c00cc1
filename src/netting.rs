//! Projection of transactions into net positions.

use crate::amount::Amount;
use crate::error::{Result, SettleError};
use crate::position::NetPosition;
use crate::transaction::{Payment, Transaction};
use std::collections::BTreeMap;

/// Projects transactions into one position per payment.
///
/// Every input adds to its address's debt and the output adds to the
/// creditor's credit. Duplicates are left for [`normalize`] to merge.
/// A negative payment amount is an invariant violation.
pub fn project(transactions: &[Transaction]) -> Result<Vec<NetPosition>> {
    let mut positions = Vec::new();

    for tx in transactions {
        for input in &tx.inputs {
            check_non_negative(tx, input)?;
            positions.push(NetPosition::debtor(input.address.clone(), input.amount));
        }
        check_non_negative(tx, &tx.output)?;
        positions.push(NetPosition::creditor(
            tx.output.address.clone(),
            tx.output.amount,
        ));
    }

    Ok(positions)
}

fn check_non_negative(tx: &Transaction, payment: &Payment) -> Result<()> {
    if payment.amount.is_negative() {
        return Err(SettleError::InvariantViolation(format!(
            "transaction {:?} carries negative amount {:?} for {}",
            tx.name,
            payment.amount.value(),
            payment.address
        )));
    }
    Ok(())
}

/// Merges duplicate addresses and nets debt against credit.
///
/// The result holds one entry per address, ordered by address, with at most
/// one non-zero side. Normalizing a normalized list returns it unchanged.
/// Fails with [`SettleError::Overflow`] if an address accumulates more than
/// the decimal range holds.
pub fn normalize(positions: &[NetPosition], epsilon: Amount) -> Result<Vec<NetPosition>> {
    let mut merged: BTreeMap<&str, (Amount, Amount)> = BTreeMap::new();
    for position in positions {
        let entry = merged
            .entry(position.address.as_str())
            .or_insert((Amount::ZERO, Amount::ZERO));
        let overflow = || SettleError::Overflow {
            context: format!("net position of {}", position.address),
        };
        entry.0 = entry.0.checked_add(position.debt).ok_or_else(overflow)?;
        entry.1 = entry.1.checked_add(position.credit).ok_or_else(overflow)?;
    }

    Ok(merged
        .into_iter()
        .map(|(address, (debt, credit))| {
            let mut position = NetPosition::new(address, debt, credit);
            position.net(epsilon);
            position
        })
        .collect())
}
