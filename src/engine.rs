//! The settlement pipeline.
//!
//! Expenses are split into transactions, projected into net positions,
//! rebuilt into a reduced transaction list and finally cleaned of residue.
//! The engine carries only its configuration, so one instance can serve any
//! number of independent runs.

use crate::amount::Amount;
use crate::cleanup::{remove_degenerate, suppress_small_values};
use crate::config::EngineConfig;
use crate::error::{Result, SettleError};
use crate::expense::{Expense, ExpenseRecord};
use crate::netting::{normalize, project};
use crate::settlement::generate;
use crate::transaction::{Package, Transaction};
use crate::validator::ensure_balanced;
use csv::{ReaderBuilder, Trim};
use log::debug;
use std::io::{Read, Write};

/// Final package of a settlement run plus any unmatched debt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementOutcome {
    pub package: Package,

    /// Debt left without a creditor. Zero for consistent input.
    pub remaining: Amount,
}

impl SettlementOutcome {
    pub fn is_settled(&self) -> bool {
        self.remaining.is_zero()
    }
}

/// Settles batches of expenses under a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct SettlementEngine {
    config: EngineConfig,
}

impl SettlementEngine {
    pub fn new(config: EngineConfig) -> Self {
        SettlementEngine { config }
    }

    /// Reads expenses from CSV, skipping the header row.
    ///
    /// The first malformed row aborts the read; its error carries the
    /// 1-indexed line number.
    pub fn read_expenses<R: Read>(&self, reader: R) -> Result<Vec<Expense>> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut expenses = Vec::new();
        for (row_idx, result) in csv_reader.records().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            let record = result.map_err(|e| SettleError::InvalidRecord {
                row: row_num,
                message: e.to_string(),
            })?;
            let expense = ExpenseRecord::from_record(&record, row_num)?.parse(row_num)?;
            expense
                .validate_fields()
                .map_err(|e| SettleError::InvalidRecord {
                    row: row_num,
                    message: e.to_string(),
                })?;
            expenses.push(expense);
        }

        debug!("Read {} expenses", expenses.len());
        Ok(expenses)
    }

    /// Applies each expense's split strategy and checks that the result is
    /// balanced.
    pub fn build_transactions(&self, expenses: &[Expense]) -> Result<Vec<Transaction>> {
        self.config.validate()?;
        expenses
            .iter()
            .map(|expense| {
                let tx = expense.strategy.apply(expense)?;
                ensure_balanced(&tx, self.config.epsilon)?;
                Ok(tx)
            })
            .collect()
    }

    /// Runs the whole pipeline over `expenses`.
    ///
    /// A non-zero `remaining` is reported, not treated as an error; use
    /// [`SettlementEngine::convert`] for the strict variant.
    pub fn settle(&self, name: &str, expenses: &[Expense]) -> Result<SettlementOutcome> {
        let transactions = self.build_transactions(expenses)?;
        self.settle_transactions(name, &transactions)
    }

    /// Reduces an existing transaction list.
    pub fn settle_transactions(
        &self,
        name: &str,
        transactions: &[Transaction],
    ) -> Result<SettlementOutcome> {
        self.config.validate()?;
        let epsilon = self.config.epsilon;

        let positions = normalize(&project(transactions)?, epsilon)?;
        debug!(
            "Netted {} transactions into {} positions",
            transactions.len(),
            positions.len()
        );

        let settlement = generate(&positions, epsilon)?;
        let mut reduced = settlement.transactions;
        if let Some(min_value) = self.config.min_value {
            suppress_small_values(&mut reduced, min_value, epsilon)?;
        }
        let reduced = remove_degenerate(reduced, epsilon);
        debug!(
            "Package {:?}: {} transactions, remaining {}",
            name,
            reduced.len(),
            settlement.remaining
        );

        Ok(SettlementOutcome {
            package: Package::new(name, reduced),
            remaining: settlement.remaining,
        })
    }

    /// Batch conversion: like [`SettlementEngine::settle`] but any unspent
    /// input fails the whole operation.
    pub fn convert(&self, name: &str, expenses: &[Expense]) -> Result<Package> {
        let outcome = self.settle(name, expenses)?;
        if !outcome.is_settled() {
            return Err(SettleError::UnspentInput {
                remaining: outcome.remaining,
            });
        }
        Ok(outcome.package)
    }

    /// Writes the package as `transaction,role,address,amount` CSV rows.
    ///
    /// Inputs precede the output of each transaction; amounts use two decimals.
    pub fn write_csv<W: Write>(&self, package: &Package, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["transaction", "role", "address", "amount"])?;

        for tx in &package.transactions {
            for input in &tx.inputs {
                csv_writer.write_record([
                    tx.name.as_str(),
                    "input",
                    input.address.as_str(),
                    input.amount.to_string().as_str(),
                ])?;
            }
            csv_writer.write_record([
                tx.name.as_str(),
                "output",
                tx.output.address.as_str(),
                tx.output.amount.to_string().as_str(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Writes the human-readable rendering of the package.
    pub fn write_text<W: Write>(&self, package: &Package, mut writer: W) -> Result<()> {
        write!(writer, "{}", package)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::SplitStrategy;
    use crate::transaction::Payment;
    use std::io::Cursor;
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn read(csv: &str) -> Result<Vec<Expense>> {
        SettlementEngine::default().read_expenses(Cursor::new(csv))
    }

    #[test]
    fn test_read_expenses() {
        let csv = r#"name,amount,payer,payees
dinner,90,alice,"alice,bob,carol"
taxi, 30 , bob , carol"#;

        let expenses = read(csv).unwrap();
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].payees, vec!["alice", "bob", "carol"]);
        assert_eq!(expenses[1].amount, amt("30"));
        assert_eq!(expenses[1].payer, "bob");
    }

    #[test]
    fn test_read_reports_row_number() {
        let csv = r#"name,amount,payer,payees
dinner,90,alice,bob
taxi,thirty,bob,carol"#;

        match read(csv) {
            Err(SettleError::InvalidRecord { row, .. }) => assert_eq!(row, 3),
            other => panic!("Expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_read_extended_columns() {
        let csv = r#"name,amount,payer,payees,strategy,extensions
hotel,300,carol,"alice,bob",part,"1,2"
"#;

        let expenses = read(csv).unwrap();
        assert_eq!(expenses[0].strategy, SplitStrategy::Part);
        assert_eq!(expenses[0].extensions, vec![amt("1"), amt("2")]);
    }

    #[test]
    fn test_settle_simple_trip() {
        let expenses = vec![
            Expense::new("dinner", amt("90"), "alice", ["alice", "bob", "carol"]),
            Expense::new("taxi", amt("30"), "bob", ["alice", "bob", "carol"]),
        ];
        let outcome = SettlementEngine::default()
            .settle("trip", &expenses)
            .unwrap();

        assert!(outcome.is_settled());
        assert_eq!(outcome.package.name, "trip");
        assert_eq!(
            outcome.package.transactions,
            vec![Transaction::new(
                "settlement 1",
                vec![Payment::new("carol", amt("40")), Payment::new("bob", amt("10"))],
                Payment::new("alice", amt("50")),
            )]
        );
    }

    #[test]
    fn test_build_rejects_unbalanced_split() {
        let expense = Expense::new("groceries", amt("50"), "bob", ["alice", "carol"])
            .with_strategy(SplitStrategy::Fixed, vec![amt("10"), amt("10")]);

        match SettlementEngine::default().build_transactions(&[expense]) {
            Err(SettleError::Unbalanced { name, .. }) => assert_eq!(name, "groceries"),
            other => panic!("Expected Unbalanced, got {:?}", other),
        }
    }

    #[test]
    fn test_settle_applies_min_value() {
        let expenses = vec![
            Expense::new("coffee", amt("3"), "alice", ["bob"]),
            Expense::new("gum", amt("0.003"), "alice", ["carol"]),
        ];
        let engine = SettlementEngine::new(EngineConfig::default().with_min_value(amt("0.01")));
        let outcome = engine.settle("trip", &expenses).unwrap();

        assert_eq!(
            outcome.package.transactions,
            vec![Transaction::new(
                "settlement 1",
                vec![Payment::new("bob", amt("3"))],
                Payment::new("alice", amt("3")),
            )]
        );
    }

    #[test]
    fn test_convert_consistent_batch() {
        let expenses = vec![
            Expense::new("rent", amt("1000"), "bob", ["alice", "bob", "carol"]),
            Expense::new("power", amt("120"), "carol", ["alice", "bob", "carol"]),
        ];
        let package = SettlementEngine::default().convert("flat", &expenses).unwrap();

        let paid: Amount = package.transactions.iter().map(|t| t.output.amount).sum();
        assert_eq!(paid.to_string(), "626.67");
    }

    #[test]
    fn test_settle_transactions_reports_invalid_config() {
        let transactions = vec![Transaction::new(
            "loan",
            vec![Payment::new("alice", amt("10"))],
            Payment::new("bob", amt("10")),
        )];
        let engine = SettlementEngine::new(EngineConfig::default().with_min_value(Amount::ZERO));

        let err = engine.settle_transactions("x", &transactions).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_negative_epsilon_is_invariant_violation() {
        let engine = SettlementEngine::new(EngineConfig::new(Amount::from(-1)));
        let expenses = vec![Expense::new("a", amt("10"), "bob", ["alice"])];

        let err = engine.settle("x", &expenses).unwrap_err();
        assert!(err.is_invariant_violation());
        assert!(engine.build_transactions(&expenses).unwrap_err().is_invariant_violation());
    }

    #[test]
    fn test_huge_amounts_report_overflow() {
        let csv = r#"name,amount,payer,payees
first,50000000000000000000000000000,x,y
second,50000000000000000000000000000,x,y"#;

        let expenses = read(csv).unwrap();
        match SettlementEngine::default().settle("x", &expenses) {
            Err(SettleError::Overflow { .. }) => {}
            other => panic!("Expected Overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_convert_rejects_unspent_input() {
        let expense = Expense::new("tab", amt("10"), "bob", ["alice"])
            .with_strategy(SplitStrategy::Fixed, vec![amt("10.08")]);
        let expenses = vec![expense.clone(), expense.clone(), expense];
        let engine = SettlementEngine::new(EngineConfig::new(amt("0.1")));

        let outcome = engine.settle("loose", &expenses).unwrap();
        assert!(!outcome.is_settled());
        assert_eq!(outcome.remaining, amt("0.24"));

        match engine.convert("loose", &expenses) {
            Err(SettleError::UnspentInput { remaining }) => assert_eq!(remaining, amt("0.24")),
            other => panic!("Expected UnspentInput, got {:?}", other),
        }
    }

    #[test]
    fn test_write_csv() {
        let package = Package::new(
            "trip",
            vec![Transaction::new(
                "settlement 1",
                vec![Payment::new("carol", amt("40")), Payment::new("bob", amt("10"))],
                Payment::new("alice", amt("50")),
            )],
        );

        let mut output = Vec::new();
        SettlementEngine::default()
            .write_csv(&package, &mut output)
            .unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(
            output_str,
            "transaction,role,address,amount\n\
             settlement 1,input,carol,40.00\n\
             settlement 1,input,bob,10.00\n\
             settlement 1,output,alice,50.00\n"
        );
    }
}
