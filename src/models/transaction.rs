use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The closed set of financial events a chat line can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxnKind {
    Income,
    Expense,
    Savings,
    Debt,
    DebtReturn,
    SavingsWithdraw,
}

impl TxnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Savings => "savings",
            Self::Debt => "debt",
            Self::DebtReturn => "debt_return",
            Self::SavingsWithdraw => "savings_withdraw",
        }
    }

    #[cfg(test)]
    pub fn all() -> &'static [TxnKind] {
        &[
            Self::Income,
            Self::Expense,
            Self::Savings,
            Self::Debt,
            Self::DebtReturn,
            Self::SavingsWithdraw,
        ]
    }

    /// Sign applied to the stored magnitude when computing the cash balance.
    pub fn balance_sign(&self) -> Decimal {
        match self {
            Self::Income | Self::Debt | Self::SavingsWithdraw => Decimal::ONE,
            Self::Expense | Self::Savings | Self::DebtReturn => Decimal::NEGATIVE_ONE,
        }
    }
}

impl std::fmt::Display for TxnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A committed ledger entry. `amount` is always a non-negative magnitude;
/// the direction comes from `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// 1-based position in the owner's ledger, rewritten after deletions.
    pub id: u32,
    pub amount: Decimal,
    pub kind: TxnKind,
    pub category: String,
    pub description: String,
    pub created_at: String,
}

impl Transaction {
    pub fn new(
        amount: Decimal,
        kind: TxnKind,
        category: String,
        description: String,
        created_at: String,
    ) -> Self {
        Self {
            id: 0,
            amount: amount.abs(),
            kind,
            category,
            description,
            created_at,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TxnKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TxnKind::Expense
    }

    pub fn signed_amount(&self) -> Decimal {
        self.amount * self.kind.balance_sign()
    }
}
