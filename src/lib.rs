//! # Settle Engine
//!
//! Settles shared group expenses: itemized payments are split among their
//! payees, netted into one position per participant and rebuilt into a short
//! list of transfers that balances every account.
//!
//! ## Design Principles
//!
//! - **Decimal arithmetic**: amounts use `rust_decimal` at full precision
//! - **Explicit tolerance**: every pass takes an epsilon from [`EngineConfig`]
//! - **Greedy settlement**: largest creditor first, at most `D + C - 1` transfers
//! - **Deterministic output**: ties broken by address
//!
//! ## Example
//!
//! ```
//! use settle_engine::{Amount, Expense, SettlementEngine};
//!
//! let expenses = vec![
//!     Expense::new("dinner", Amount::from(90), "alice", ["alice", "bob", "carol"]),
//! ];
//! let engine = SettlementEngine::default();
//! let package = engine.convert("trip", &expenses).unwrap();
//! assert_eq!(package.len(), 1);
//! print!("{}", package);
//! ```

pub mod amount;
pub mod cleanup;
pub mod config;
pub mod engine;
pub mod error;
pub mod expense;
pub mod netting;
pub mod position;
pub mod settlement;
pub mod strategy;
pub mod transaction;
pub mod validator;

pub use amount::Amount;
pub use config::EngineConfig;
pub use engine::{SettlementEngine, SettlementOutcome};
pub use error::{Result, SettleError};
pub use expense::{Expense, ExpenseRecord};
pub use position::NetPosition;
pub use settlement::Settlement;
pub use strategy::SplitStrategy;
pub use transaction::{Package, Payment, Transaction};
