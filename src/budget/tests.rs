#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::savings::{recommend, SavingsFraming};
use super::*;

const JAN: &str = "2024-01";
const FEB: &str = "2024-02";

fn income(budget: &mut MonthlyBudget, month: &str, amount: Decimal) -> Vec<BudgetNotice> {
    record(budget, month, TxnKind::Income, "Salary", amount)
}

fn spend(budget: &mut MonthlyBudget, month: &str, category: &str, amount: Decimal) -> Vec<BudgetNotice> {
    record(budget, month, TxnKind::Expense, category, amount)
}

// ── Bucket mapping ────────────────────────────────────────────

#[test]
fn test_bucket_for_category() {
    assert_eq!(bucket_for_category("Groceries"), Bucket::Needs);
    assert_eq!(bucket_for_category("Housing"), Bucket::Needs);
    assert_eq!(bucket_for_category("Utilities"), Bucket::Needs);
    assert_eq!(bucket_for_category("Emergency Fund"), Bucket::Future);
    assert_eq!(bucket_for_category("Entertainment"), Bucket::Wants);
    assert_eq!(bucket_for_category("Other"), Bucket::Wants);
    assert_eq!(bucket_for_category("Something New"), Bucket::Wants);
}

#[test]
fn test_bucket_for_kind() {
    assert_eq!(bucket_for(TxnKind::Income, "Salary"), None);
    assert_eq!(bucket_for(TxnKind::Savings, "Savings"), Some(Bucket::Future));
    assert_eq!(bucket_for(TxnKind::DebtReturn, "Loan"), Some(Bucket::Future));
    assert_eq!(bucket_for(TxnKind::Debt, "Loan"), Some(Bucket::Needs));
    assert_eq!(bucket_for(TxnKind::Expense, "Food"), Some(Bucket::Wants));
}

// ── Accumulators ──────────────────────────────────────────────

#[test]
fn test_income_and_buckets_accumulate() {
    let mut budget = MonthlyBudget::default();
    income(&mut budget, JAN, dec!(5000));
    spend(&mut budget, JAN, "Groceries", dec!(100));
    record(&mut budget, JAN, TxnKind::Savings, "Savings", dec!(300));

    assert_eq!(budget.month, JAN);
    assert_eq!(budget.totals.income, dec!(5000));
    assert_eq!(budget.totals.needs, dec!(100));
    assert_eq!(budget.totals.wants, Decimal::ZERO);
    assert_eq!(budget.totals.future, dec!(300));
    assert_eq!(budget.percentages.needs, dec!(2));
    assert_eq!(budget.percentages.future, dec!(6));
}

#[test]
fn test_totals_saturate_instead_of_overflowing() {
    let mut budget = MonthlyBudget::default();
    income(&mut budget, JAN, Decimal::MAX);
    income(&mut budget, JAN, Decimal::MAX);
    spend(&mut budget, JAN, "Food", Decimal::MAX);
    spend(&mut budget, JAN, "Food", Decimal::MAX);
    assert_eq!(budget.totals.income, Decimal::MAX);
    assert_eq!(budget.totals.wants, Decimal::MAX);
    assert_eq!(budget.percentages.wants, dec!(100));
}

#[test]
fn test_percentages_zero_without_income() {
    let mut budget = MonthlyBudget::default();
    let notices = spend(&mut budget, JAN, "Groceries", dec!(900));
    assert!(notices.is_empty());
    assert_eq!(budget.percentages, BudgetPercentages::default());
}

#[test]
fn test_percentages_rounded() {
    let totals = BudgetTotals {
        needs: dec!(1),
        wants: dec!(2),
        future: Decimal::ZERO,
        income: dec!(3),
    };
    let p = percentages(&totals);
    assert_eq!(p.needs, dec!(33.33));
    assert_eq!(p.wants, dec!(66.67));
    assert_eq!(p.future, Decimal::ZERO);
}

// ── Threshold notices ─────────────────────────────────────────

#[test]
fn test_needs_approaching_then_over() {
    let mut budget = MonthlyBudget::default();
    income(&mut budget, JAN, dec!(1000));
    assert_eq!(
        spend(&mut budget, JAN, "Groceries", dec!(460)),
        vec![BudgetNotice::NeedsApproaching]
    );
    assert_eq!(
        spend(&mut budget, JAN, "Rent", dec!(50)),
        vec![BudgetNotice::NeedsOver]
    );
    assert!(spend(&mut budget, JAN, "Rent", dec!(10)).is_empty());
}

#[test]
fn test_jump_past_ceiling_only_fires_over() {
    let mut budget = MonthlyBudget::default();
    income(&mut budget, JAN, dec!(1000));
    assert_eq!(
        spend(&mut budget, JAN, "Housing", dec!(600)),
        vec![BudgetNotice::NeedsOver]
    );
}

#[test]
fn test_wants_thresholds() {
    let mut budget = MonthlyBudget::default();
    income(&mut budget, JAN, dec!(1000));
    assert!(spend(&mut budget, JAN, "Food", dec!(260)).is_empty());
    assert_eq!(
        spend(&mut budget, JAN, "Food", dec!(10)),
        vec![BudgetNotice::WantsApproaching]
    );
    assert_eq!(
        spend(&mut budget, JAN, "Shopping", dec!(30)),
        vec![BudgetNotice::WantsOver]
    );
}

#[test]
fn test_future_thresholds() {
    let mut budget = MonthlyBudget::default();
    income(&mut budget, JAN, dec!(1000));
    assert_eq!(
        record(&mut budget, JAN, TxnKind::Savings, "Savings", dec!(200)),
        vec![BudgetNotice::FutureOnTarget]
    );
    assert_eq!(
        record(&mut budget, JAN, TxnKind::Savings, "Investments", dec!(50)),
        vec![BudgetNotice::FutureExcellent]
    );
}

#[test]
fn test_multiple_buckets_fire_together() {
    let mut budget = MonthlyBudget::default();
    spend(&mut budget, JAN, "Groceries", dec!(500));
    spend(&mut budget, JAN, "Food", dec!(300));
    let notices = income(&mut budget, JAN, dec!(1000));
    assert_eq!(notices, vec![BudgetNotice::NeedsOver, BudgetNotice::WantsOver]);
}

#[test]
fn test_notices_fire_once_per_month() {
    let mut budget = MonthlyBudget::default();
    let mut fired = Vec::new();
    for _ in 0..2 {
        fired.extend(income(&mut budget, JAN, dec!(1000)));
        fired.extend(spend(&mut budget, JAN, "Groceries", dec!(500)));
        fired.extend(spend(&mut budget, JAN, "Food", dec!(300)));
        fired.extend(record(&mut budget, JAN, TxnKind::Savings, "Savings", dec!(250)));
    }
    for notice in [
        BudgetNotice::NeedsOver,
        BudgetNotice::WantsOver,
        BudgetNotice::FutureExcellent,
    ] {
        assert_eq!(fired.iter().filter(|n| **n == notice).count(), 1, "{notice:?}");
    }
}

#[test]
fn test_rollover_resets_and_rearms() {
    let mut budget = MonthlyBudget::default();
    income(&mut budget, JAN, dec!(1000));
    assert_eq!(
        spend(&mut budget, JAN, "Groceries", dec!(500)),
        vec![BudgetNotice::NeedsOver]
    );

    assert!(roll_to(&mut budget, FEB));
    assert_eq!(budget.month, FEB);
    assert_eq!(budget.totals, BudgetTotals::default());
    assert_eq!(budget.percentages, BudgetPercentages::default());
    assert!(budget.fired.is_empty());

    income(&mut budget, FEB, dec!(1000));
    assert_eq!(
        spend(&mut budget, FEB, "Groceries", dec!(500)),
        vec![BudgetNotice::NeedsOver]
    );
}

#[test]
fn test_record_rolls_month_implicitly() {
    let mut budget = MonthlyBudget::default();
    income(&mut budget, JAN, dec!(1000));
    spend(&mut budget, JAN, "Groceries", dec!(100));
    income(&mut budget, FEB, dec!(2000));
    assert_eq!(budget.month, FEB);
    assert_eq!(budget.totals.income, dec!(2000));
    assert_eq!(budget.totals.needs, Decimal::ZERO);
}

#[test]
fn test_first_month_is_not_a_rollover() {
    let mut budget = MonthlyBudget::default();
    assert!(!roll_to(&mut budget, JAN));
    assert!(!roll_to(&mut budget, JAN));
    assert!(roll_to(&mut budget, FEB));
}

#[test]
fn test_snapshot_of_stale_month_is_empty() {
    let mut budget = MonthlyBudget::default();
    income(&mut budget, JAN, dec!(1000));
    let view = snapshot(&budget, FEB);
    assert_eq!(view.month, FEB);
    assert_eq!(view.totals, BudgetTotals::default());
    assert_eq!(snapshot(&budget, JAN), budget);
}

// ── Savings recommendation ────────────────────────────────────

#[test]
fn test_recommend_regular_income() {
    let rec = recommend(dec!(5000), Decimal::ZERO);
    assert_eq!((rec.min_percent, rec.max_percent), (15, 20));
    assert_eq!(rec.min_amount, dec!(750));
    assert_eq!(rec.max_amount, dec!(1000));
    assert_eq!(rec.framing, SavingsFraming::BuildingEmergencyFund);
}

#[test]
fn test_recommend_high_income() {
    let rec = recommend(dec!(150000), Decimal::ZERO);
    assert_eq!((rec.min_percent, rec.max_percent), (10, 15));
    assert_eq!(rec.min_amount, dec!(15000));
    assert_eq!(rec.max_amount, dec!(22500));

    let rec = recommend(dec!(100000), Decimal::ZERO);
    assert_eq!((rec.min_percent, rec.max_percent), (15, 20));
}

#[test]
fn test_recommend_framing_boundaries() {
    let framing = |saved: Decimal| recommend(dec!(1000), saved).framing;
    assert_eq!(framing(dec!(49999.99)), SavingsFraming::BuildingEmergencyFund);
    assert_eq!(framing(dec!(50000)), SavingsFraming::GoodProgress);
    assert_eq!(framing(dec!(200000)), SavingsFraming::GoodProgress);
    assert_eq!(framing(dec!(200000.01)), SavingsFraming::ExcellentDiscipline);
}
