//! Per-participant net positions.

use crate::amount::Amount;
use serde::Serialize;

/// A participant's standing across a set of transactions.
///
/// # Invariants
///
/// After normalization at most one of `debt` and `credit` is non-zero: a
/// participant is a net debtor, a net creditor, or balanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetPosition {
    pub address: String,

    /// What the participant owes, accumulated from transaction inputs.
    pub debt: Amount,

    /// What the participant is owed, accumulated from transaction outputs.
    pub credit: Amount,
}

impl NetPosition {
    pub fn new(address: impl Into<String>, debt: Amount, credit: Amount) -> Self {
        NetPosition {
            address: address.into(),
            debt,
            credit,
        }
    }

    pub fn debtor(address: impl Into<String>, debt: Amount) -> Self {
        Self::new(address, debt, Amount::ZERO)
    }

    pub fn creditor(address: impl Into<String>, credit: Amount) -> Self {
        Self::new(address, Amount::ZERO, credit)
    }

    /// `credit - debt`: positive for creditors, negative for debtors.
    pub fn balance(&self) -> Amount {
        self.credit - self.debt
    }

    pub fn is_debtor(&self, epsilon: Amount) -> bool {
        self.debt > self.credit && self.debt > epsilon
    }

    pub fn is_creditor(&self, epsilon: Amount) -> bool {
        self.credit > self.debt && self.credit > epsilon
    }

    /// Nets the two accumulators into a single side, rounding anything
    /// strictly below `epsilon` to zero.
    pub(crate) fn net(&mut self, epsilon: Amount) {
        if self.credit > self.debt {
            self.credit -= self.debt;
            self.debt = Amount::ZERO;
        } else {
            self.debt -= self.credit;
            self.credit = Amount::ZERO;
        }
        if self.debt < epsilon {
            self.debt = Amount::ZERO;
        }
        if self.credit < epsilon {
            self.credit = Amount::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eps() -> Amount {
        Amount::with_scale(1, 9)
    }

    #[test]
    fn test_net_to_creditor() {
        let mut position = NetPosition::new("a", Amount::from(30), Amount::from(100));
        position.net(eps());
        assert_eq!(position, NetPosition::creditor("a", Amount::from(70)));
        assert!(position.is_creditor(eps()));
        assert!(!position.is_debtor(eps()));
    }

    #[test]
    fn test_net_to_debtor() {
        let mut position = NetPosition::new("a", Amount::from(100), Amount::from(30));
        position.net(eps());
        assert_eq!(position, NetPosition::debtor("a", Amount::from(70)));
        assert_eq!(position.balance(), Amount::from(-70));
    }

    #[test]
    fn test_net_rounds_residue_to_zero() {
        let mut position = NetPosition::new(
            "a",
            Amount::from(10) + Amount::with_scale(1, 12),
            Amount::from(10),
        );
        position.net(eps());
        assert_eq!(position, NetPosition::new("a", Amount::ZERO, Amount::ZERO));
        assert!(!position.is_debtor(eps()));
        assert!(!position.is_creditor(eps()));
    }

    #[test]
    fn test_net_keeps_magnitude_equal_to_epsilon() {
        let mut position = NetPosition::new("a", Amount::from(10) + eps(), Amount::from(10));
        position.net(eps());
        assert_eq!(position, NetPosition::debtor("a", eps()));
    }
}
