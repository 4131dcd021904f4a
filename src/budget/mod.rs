//! 50/30/20 tracking: needs, wants and future as shares of monthly income.

pub mod savings;

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{Bucket, BudgetNotice, BudgetPercentages, BudgetTotals, MonthlyBudget, TxnKind};

/// Category-name fragments that mark a need or a future-oriented outflow.
/// Anything unmatched is a want.
const BUCKET_KEYWORDS: &[(&str, Bucket)] = &[
    ("saving", Bucket::Future),
    ("emergency", Bucket::Future),
    ("invest", Bucket::Future),
    ("rent", Bucket::Needs),
    ("housing", Bucket::Needs),
    ("mortgage", Bucket::Needs),
    ("utilit", Bucket::Needs),
    ("grocer", Bucket::Needs),
    ("transport", Bucket::Needs),
    ("health", Bucket::Needs),
    ("medic", Bucket::Needs),
    ("pharm", Bucket::Needs),
    ("insur", Bucket::Needs),
    ("loan", Bucket::Needs),
    ("credit", Bucket::Needs),
];

/// (bucket, threshold %, ceiling %, notice). A notice with a ceiling only
/// fires while the new percentage is still below the ceiling.
const THRESHOLDS: &[(Bucket, i64, Option<i64>, BudgetNotice)] = &[
    (Bucket::Needs, 45, Some(50), BudgetNotice::NeedsApproaching),
    (Bucket::Needs, 50, None, BudgetNotice::NeedsOver),
    (Bucket::Wants, 27, Some(30), BudgetNotice::WantsApproaching),
    (Bucket::Wants, 30, None, BudgetNotice::WantsOver),
    (Bucket::Future, 20, Some(25), BudgetNotice::FutureOnTarget),
    (Bucket::Future, 25, None, BudgetNotice::FutureExcellent),
];

/// Bucket for a non-income transaction; `None` for income.
pub fn bucket_for(kind: TxnKind, category: &str) -> Option<Bucket> {
    match kind {
        TxnKind::Income => None,
        TxnKind::Savings | TxnKind::DebtReturn => Some(Bucket::Future),
        TxnKind::Expense | TxnKind::Debt | TxnKind::SavingsWithdraw => {
            Some(bucket_for_category(category))
        }
    }
}

pub fn bucket_for_category(category: &str) -> Bucket {
    let lower = category.to_lowercase();
    BUCKET_KEYWORDS
        .iter()
        .find(|(fragment, _)| lower.contains(fragment))
        .map(|(_, bucket)| *bucket)
        .unwrap_or(Bucket::Wants)
}

pub fn percentages(totals: &BudgetTotals) -> BudgetPercentages {
    let share = |amount: Decimal| -> Decimal {
        if totals.income.is_zero() {
            return Decimal::ZERO;
        }
        amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|v| v.checked_div(totals.income))
            .or_else(|| {
                amount
                    .checked_div(totals.income)
                    .and_then(|v| v.checked_mul(Decimal::ONE_HUNDRED))
            })
            .map(|v| v.round_dp(2))
            .unwrap_or(Decimal::MAX)
    };
    BudgetPercentages {
        needs: share(totals.needs),
        wants: share(totals.wants),
        future: share(totals.future),
    }
}

/// Reset the accumulators if `month` ("YYYY-MM") differs from the marker.
/// Returns true when a rollover happened.
pub fn roll_to(budget: &mut MonthlyBudget, month: &str) -> bool {
    if budget.month == month {
        return false;
    }
    let rolled = !budget.month.is_empty();
    *budget = MonthlyBudget {
        month: month.to_string(),
        ..MonthlyBudget::default()
    };
    rolled
}

/// Apply a committed transaction to the month's totals and return the
/// notices that newly fire.
pub fn record(
    budget: &mut MonthlyBudget,
    month: &str,
    kind: TxnKind,
    category: &str,
    amount: Decimal,
) -> Vec<BudgetNotice> {
    if roll_to(budget, month) {
        debug!(month, "budget month rolled over");
    }

    let total = match bucket_for(kind, category) {
        Some(bucket) => budget.totals.bucket_mut(bucket),
        None => &mut budget.totals.income,
    };
    *total = total.saturating_add(amount);

    let previous = budget.percentages;
    let current = percentages(&budget.totals);
    budget.percentages = current;

    let notices = crossings(&previous, &current, &budget.fired);
    budget.fired.extend(notices.iter().copied());
    notices
}

/// The month's view for display; a stale month reads as empty.
pub fn snapshot(budget: &MonthlyBudget, month: &str) -> MonthlyBudget {
    if budget.month == month {
        budget.clone()
    } else {
        MonthlyBudget {
            month: month.to_string(),
            ..MonthlyBudget::default()
        }
    }
}

fn crossings(
    previous: &BudgetPercentages,
    current: &BudgetPercentages,
    fired: &[BudgetNotice],
) -> Vec<BudgetNotice> {
    THRESHOLDS
        .iter()
        .filter(|(bucket, threshold, ceiling, notice)| {
            let threshold = Decimal::from(*threshold);
            let before = previous.bucket(*bucket);
            let after = current.bucket(*bucket);
            before < threshold
                && after >= threshold
                && ceiling.map_or(true, |c| after < Decimal::from(c))
                && !fired.contains(notice)
        })
        .map(|(_, _, _, notice)| *notice)
        .collect()
}

#[cfg(test)]
mod tests;
