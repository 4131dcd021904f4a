use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Transaction, TxnKind};

/// One user's committed transactions in insertion order. Ids are positions,
/// so they shift when an earlier entry is deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

/// Totals over a whole ledger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSummary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
    pub savings: Decimal,
    pub debt: Decimal,
    pub count: usize,
    /// Expense totals per category, largest first.
    pub by_category: Vec<(String, Decimal)>,
}

impl Ledger {
    /// Rebuild from storage, repairing ids that do not match positions.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let mut ledger = Self { transactions };
        ledger.renumber();
        ledger
    }

    pub fn append(&mut self, mut txn: Transaction) -> &Transaction {
        txn.id = self.next_id();
        self.transactions.push(txn);
        &self.transactions[self.transactions.len() - 1]
    }

    pub fn list(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Remove the transaction at 1-based `position` and renumber the rest.
    pub fn delete(&mut self, position: usize) -> Option<Transaction> {
        if position == 0 || position > self.transactions.len() {
            return None;
        }
        let removed = self.transactions.remove(position - 1);
        self.renumber();
        Some(removed)
    }

    /// Sum of all `savings` deposits, ignoring withdrawals.
    pub fn savings_deposits(&self) -> Decimal {
        self.total_of(TxnKind::Savings)
    }

    pub fn total_of(&self, kind: TxnKind) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn summary(&self) -> LedgerSummary {
        let mut by_category: Vec<(String, Decimal)> = Vec::new();
        for txn in self.transactions.iter().filter(|t| t.is_expense()) {
            match by_category.iter_mut().find(|(c, _)| *c == txn.category) {
                Some((_, total)) => *total = total.saturating_add(txn.amount),
                None => by_category.push((txn.category.clone(), txn.amount)),
            }
        }
        by_category.sort_by(|a, b| b.1.cmp(&a.1));

        LedgerSummary {
            income: self.total_of(TxnKind::Income),
            expenses: self.total_of(TxnKind::Expense),
            balance: self
                .transactions
                .iter()
                .map(|t| t.signed_amount())
                .fold(Decimal::ZERO, Decimal::saturating_add),
            savings: self
                .total_of(TxnKind::Savings)
                .saturating_sub(self.total_of(TxnKind::SavingsWithdraw)),
            debt: self
                .total_of(TxnKind::Debt)
                .saturating_sub(self.total_of(TxnKind::DebtReturn)),
            count: self.transactions.len(),
            by_category,
        }
    }

    fn next_id(&self) -> u32 {
        u32::try_from(self.transactions.len() + 1).unwrap_or(u32::MAX)
    }

    fn renumber(&mut self) {
        for (idx, txn) in self.transactions.iter_mut().enumerate() {
            txn.id = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        }
    }
}
