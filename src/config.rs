//! Engine configuration.
//!
//! Every entry point takes an [`EngineConfig`] instead of reading a global
//! tolerance, so tests and callers control rounding deterministically.

use crate::amount::Amount;
use crate::error::{Result, SettleError};

/// Tolerances applied by the settlement pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Magnitude at or below which an amount is treated as zero.
    pub epsilon: Amount,

    /// Inputs strictly below this value are suppressed after settlement.
    /// `None` disables suppression.
    pub min_value: Option<Amount>,
}

impl EngineConfig {
    /// Default tolerance: `1e-9`.
    pub fn default_epsilon() -> Amount {
        Amount::with_scale(1, 9)
    }

    pub fn new(epsilon: Amount) -> Self {
        EngineConfig {
            epsilon,
            min_value: None,
        }
    }

    pub fn with_min_value(mut self, min_value: Amount) -> Self {
        self.min_value = Some(min_value);
        self
    }

    /// Checks that epsilon is non-negative and that a configured minimum
    /// value lies strictly above it.
    pub fn validate(&self) -> Result<()> {
        if self.epsilon.is_negative() {
            return Err(SettleError::InvariantViolation(format!(
                "epsilon must not be negative, got {:?}",
                self.epsilon.value()
            )));
        }
        if let Some(min_value) = self.min_value {
            if min_value <= self.epsilon {
                return Err(SettleError::InvariantViolation(format!(
                    "minimum value {:?} must exceed epsilon {:?}",
                    min_value.value(),
                    self.epsilon.value()
                )));
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(Self::default_epsilon())
    }
}
