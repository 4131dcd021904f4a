use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One of the three 50/30/20 groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Needs,
    Wants,
    Future,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Needs => "needs",
            Self::Wants => "wants",
            Self::Future => "future",
        }
    }

    pub fn all() -> &'static [Bucket] {
        &[Self::Needs, Self::Wants, Self::Future]
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Threshold crossings reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetNotice {
    NeedsApproaching,
    NeedsOver,
    WantsApproaching,
    WantsOver,
    FutureOnTarget,
    FutureExcellent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetTotals {
    pub needs: Decimal,
    pub wants: Decimal,
    pub future: Decimal,
    pub income: Decimal,
}

impl BudgetTotals {
    pub fn bucket(&self, bucket: Bucket) -> Decimal {
        match bucket {
            Bucket::Needs => self.needs,
            Bucket::Wants => self.wants,
            Bucket::Future => self.future,
        }
    }

    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut Decimal {
        match bucket {
            Bucket::Needs => &mut self.needs,
            Bucket::Wants => &mut self.wants,
            Bucket::Future => &mut self.future,
        }
    }
}

/// Bucket totals as a percentage (0-100) of the month's income.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetPercentages {
    pub needs: Decimal,
    pub wants: Decimal,
    pub future: Decimal,
}

impl BudgetPercentages {
    pub fn bucket(&self, bucket: Bucket) -> Decimal {
        match bucket {
            Bucket::Needs => self.needs,
            Bucket::Wants => self.wants,
            Bucket::Future => self.future,
        }
    }
}

/// Running totals for one user's current calendar month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBudget {
    /// Format: "YYYY-MM". Empty until the first mutation.
    pub month: String,
    pub totals: BudgetTotals,
    /// Last computed percentages; the baseline for crossing detection.
    pub percentages: BudgetPercentages,
    /// Notices already sent this month.
    #[serde(default)]
    pub fired: Vec<BudgetNotice>,
}
