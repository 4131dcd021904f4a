use thiserror::Error;

use crate::extract::ExprError;

/// Failures a user can cause. Each maps to a reply, never to a crash.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("no amount found in message")]
    Unparsable,

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("amount is larger than {0}")]
    AmountTooLarge(i64),

    #[error("calculation error: {0}")]
    Calculation(#[from] ExprError),

    #[error("transaction expired, please enter it again")]
    ExpiredTransaction,

    #[error("category '{0}' is protected")]
    ProtectedCategory(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("invalid category name: '{0}'")]
    InvalidCategoryName(String),

    #[error("not selecting a transaction to delete")]
    NotInDeleteMode,

    #[error("no transaction numbered {0}")]
    InvalidSelection(usize),
}
