#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::error::LedgerError;

// ── Transaction ───────────────────────────────────────────────

fn make_txn(amount: Decimal, kind: TxnKind) -> Transaction {
    Transaction::new(
        amount,
        kind,
        "Food".into(),
        "Test".into(),
        "2024-01-15T12:00:00+02:00".into(),
    )
}

#[test]
fn test_amount_stored_as_magnitude() {
    let txn = make_txn(dec!(-42.99), TxnKind::Debt);
    assert_eq!(txn.amount, dec!(42.99));
    assert_eq!(txn.id, 0);
}

#[test]
fn test_signed_amount_follows_kind() {
    assert_eq!(make_txn(dec!(10), TxnKind::Income).signed_amount(), dec!(10));
    assert_eq!(make_txn(dec!(10), TxnKind::Expense).signed_amount(), dec!(-10));
    assert_eq!(make_txn(dec!(10), TxnKind::Savings).signed_amount(), dec!(-10));
    assert_eq!(make_txn(dec!(10), TxnKind::SavingsWithdraw).signed_amount(), dec!(10));
    assert_eq!(make_txn(dec!(10), TxnKind::Debt).signed_amount(), dec!(10));
    assert_eq!(make_txn(dec!(10), TxnKind::DebtReturn).signed_amount(), dec!(-10));
}

#[test]
fn test_income_expense_flags() {
    let txn = make_txn(dec!(5), TxnKind::Income);
    assert!(txn.is_income());
    assert!(!txn.is_expense());

    let txn = make_txn(dec!(5), TxnKind::Expense);
    assert!(txn.is_expense());
    assert!(!txn.is_income());
}

#[test]
fn test_transaction_serializes_kind_snake_case() {
    let txn = make_txn(dec!(300), TxnKind::SavingsWithdraw);
    let json = serde_json::to_string(&txn).unwrap();
    assert!(json.contains("\"savings_withdraw\""));
    let back: Transaction = serde_json::from_str(&json).unwrap();
    assert_eq!(back, txn);
}

// ── TxnKind ───────────────────────────────────────────────────

#[test]
fn test_kind_as_str_matches_stored_name() {
    for k in TxnKind::all() {
        let json = serde_json::to_string(k).unwrap();
        assert_eq!(json, format!("\"{}\"", k.as_str()), "Mismatch for {k}");
        let back: TxnKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, *k);
    }
}

// ── CategoryTable ─────────────────────────────────────────────

#[test]
fn test_default_table_has_other_last() {
    let table = CategoryTable::default();
    assert_eq!(table.names().last().copied(), Some(OTHER));
    for dest in SAVINGS_DESTINATIONS {
        assert!(table.find(dest).is_some(), "missing {dest}");
    }
    assert!(table.find("food").is_some());
}

#[test]
fn test_add_category_inserted_before_other() {
    let mut table = CategoryTable::default();
    let created = table.add("Pets", &["vet".into(), "Dog Food".into()]).unwrap();
    assert!(created);
    let names = table.names();
    assert_eq!(names[names.len() - 2], "Pets");
    assert_eq!(
        table.find("pets").unwrap().keywords,
        vec!["vet".to_string(), "dog food".to_string()]
    );
}

#[test]
fn test_add_existing_merges_keywords() {
    let mut table = CategoryTable::default();
    let created = table.add("food", &["sushi".into(), "lunch".into()]).unwrap();
    assert!(!created);
    let food = table.find("Food").unwrap();
    assert_eq!(food.keywords.iter().filter(|k| *k == "lunch").count(), 1);
    assert!(food.keywords.contains(&"sushi".to_string()));
}

#[test]
fn test_add_duplicate_without_keywords_rejected() {
    let mut table = CategoryTable::default();
    assert!(matches!(
        table.add("Food", &[]),
        Err(LedgerError::DuplicateCategory(_))
    ));
}

#[test]
fn test_add_invalid_names_rejected() {
    let mut table = CategoryTable::default();
    assert!(matches!(table.add("   ", &[]), Err(LedgerError::InvalidCategoryName(_))));
    let long = "x".repeat(40);
    assert!(matches!(table.add(&long, &[]), Err(LedgerError::InvalidCategoryName(_))));
}

#[test]
fn test_remove_protected_leaves_table_unchanged() {
    let mut table = CategoryTable::default();
    let before = serde_json::to_vec(&table).unwrap();
    for name in ["Other", "other", "Savings", "Emergency Fund", " investments "] {
        assert!(matches!(
            table.remove(name),
            Err(LedgerError::ProtectedCategory(_))
        ));
    }
    assert_eq!(serde_json::to_vec(&table).unwrap(), before);
}

#[test]
fn test_remove_unknown_category() {
    let mut table = CategoryTable::default();
    assert!(matches!(
        table.remove("Yachts"),
        Err(LedgerError::UnknownCategory(_))
    ));
}

#[test]
fn test_remove_user_category() {
    let mut table = CategoryTable::default();
    let removed = table.remove("entertainment").unwrap();
    assert_eq!(removed.name, "Entertainment");
    assert!(table.find("Entertainment").is_none());
}

#[test]
fn test_normalize_restores_invariants() {
    let mut table: CategoryTable =
        serde_json::from_str(r#"[{"name":"Other"},{"name":"Pets","keywords":["vet"]}]"#).unwrap();
    table.normalize();
    assert_eq!(table.names().last().copied(), Some(OTHER));
    assert_eq!(table.names().iter().filter(|n| **n == OTHER).count(), 1);
    for dest in SAVINGS_DESTINATIONS {
        assert!(table.find(dest).is_some());
    }
}

#[test]
fn test_fixed_menus() {
    assert_eq!(fixed_menu(TxnKind::Income), Some(INCOME_MENU));
    assert_eq!(fixed_menu(TxnKind::Savings), Some(SAVINGS_DESTINATIONS));
    assert_eq!(fixed_menu(TxnKind::DebtReturn), Some(DEBT_MENU));
    assert_eq!(fixed_menu(TxnKind::Expense), None);
}

// ── UserId ────────────────────────────────────────────────────

#[test]
fn test_user_id_from_integer() {
    let id = UserId::from(123456789_i64);
    assert_eq!(id.as_str(), "123456789");
    assert_eq!(format!("{id}"), "123456789");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"123456789\"");
}

// ── Budget ────────────────────────────────────────────────────

#[test]
fn test_budget_totals_bucket_access() {
    let mut totals = BudgetTotals::default();
    *totals.bucket_mut(Bucket::Wants) += dec!(12.5);
    assert_eq!(totals.bucket(Bucket::Wants), dec!(12.5));
    assert_eq!(totals.bucket(Bucket::Needs), Decimal::ZERO);
}
