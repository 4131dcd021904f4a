mod budget;
mod category;
mod pending;
mod transaction;
mod user;

pub use budget::{Bucket, BudgetNotice, BudgetPercentages, BudgetTotals, MonthlyBudget};
pub use category::{
    fixed_menu, is_protected, Category, CategoryTable, DEBT_MENU, INCOME_MENU, OTHER,
    SAVINGS_DESTINATIONS,
};
pub use pending::PendingProposal;
pub use transaction::{Transaction, TxnKind};
pub use user::UserId;

#[cfg(test)]
mod tests;
