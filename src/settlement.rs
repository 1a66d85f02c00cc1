//! Greedy reconstruction of a reduced transaction list from net positions.
//!
//! Creditors are served largest first. Each one pulls debtors off the front of
//! a descending debtor queue until its credit is covered; an overshooting
//! debtor is split and its leftover goes back to the front of the queue. This
//! yields at most `D + C - 1` transactions for `D` debtors and `C` creditors.

use crate::amount::Amount;
use crate::error::{Result, SettleError};
use crate::position::NetPosition;
use crate::transaction::{Payment, Transaction};
use log::debug;
use std::cmp::Ordering;
use std::collections::VecDeque;

/// Result of a settlement run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub transactions: Vec<Transaction>,

    /// Debt never matched to a creditor. Zero for consistent input.
    pub remaining: Amount,
}

#[derive(Debug, Clone)]
struct Entry {
    address: String,
    amount: Amount,
}

/// Builds the reduced transaction list for normalized `positions`.
///
/// Fails with [`SettleError::UncoveredCreditor`] if the debtors run out before
/// a creditor is covered.
pub fn generate(positions: &[NetPosition], epsilon: Amount) -> Result<Settlement> {
    let (mut debtors, creditors) = partition(positions, epsilon);
    debug!(
        "Settling {} creditors against {} debtors",
        creditors.len(),
        debtors.len()
    );

    let mut transactions = Vec::with_capacity(creditors.len());

    for creditor in creditors {
        let mut inputs = Vec::new();
        let mut collected = Amount::ZERO;

        while collected < creditor.amount - epsilon {
            let debtor = debtors
                .pop_front()
                .ok_or_else(|| SettleError::UncoveredCreditor {
                    address: creditor.address.clone(),
                    shortfall: creditor.amount - collected,
                })?;

            let needed = creditor.amount - collected;
            if debtor.amount > needed + epsilon {
                let leftover = debtor.amount - needed;
                debug!(
                    "Splitting {}: {} to {}, {} carried",
                    debtor.address, needed, creditor.address, leftover
                );
                inputs.push(Payment::new(debtor.address.clone(), needed));
                collected += needed;
                debtors.push_front(Entry {
                    address: debtor.address,
                    amount: leftover,
                });
            } else {
                collected += debtor.amount;
                inputs.push(Payment::new(debtor.address, debtor.amount));
            }
        }

        let name = format!("settlement {}", transactions.len() + 1);
        transactions.push(Transaction::new(
            name,
            inputs,
            Payment::new(creditor.address, creditor.amount),
        ));
    }

    let mut remaining = Amount::checked_sum(debtors.iter().map(|d| &d.amount))
        .ok_or_else(|| SettleError::Overflow {
            context: "unspent settlement input".to_string(),
        })?;
    if remaining.is_negligible(epsilon) {
        remaining = Amount::ZERO;
    }

    Ok(Settlement {
        transactions,
        remaining,
    })
}

/// Splits positions into descending debtor and creditor queues, dropping
/// balanced participants.
fn partition(positions: &[NetPosition], epsilon: Amount) -> (VecDeque<Entry>, Vec<Entry>) {
    let mut debtors = Vec::new();
    let mut creditors = Vec::new();

    for position in positions {
        if position.is_debtor(epsilon) {
            debtors.push(Entry {
                address: position.address.clone(),
                amount: position.debt - position.credit,
            });
        } else if position.is_creditor(epsilon) {
            creditors.push(Entry {
                address: position.address.clone(),
                amount: position.credit - position.debt,
            });
        }
    }

    debtors.sort_by(largest_first);
    creditors.sort_by(largest_first);
    (debtors.into(), creditors)
}

fn largest_first(a: &Entry, b: &Entry) -> Ordering {
    b.amount
        .cmp(&a.amount)
        .then_with(|| a.address.cmp(&b.address))
}
