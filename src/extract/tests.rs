#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;

fn extractor() -> Extractor {
    Extractor::new().unwrap()
}

// ── Kind markers ──────────────────────────────────────────────

#[test]
fn test_plain_amount_is_expense() {
    let entry = extractor().extract("150 lunch").unwrap();
    assert_eq!(entry.amount, dec!(150));
    assert_eq!(entry.kind, TxnKind::Expense);
    assert_eq!(entry.description, "lunch");
}

#[test]
fn test_marker_kinds() {
    assert_eq!(detect_kind("+5000 salary"), TxnKind::Income);
    assert_eq!(detect_kind("++1000"), TxnKind::Savings);
    assert_eq!(detect_kind("+-300 loan"), TxnKind::DebtReturn);
    assert_eq!(detect_kind("-+200"), TxnKind::SavingsWithdraw);
    assert_eq!(detect_kind("-200 loan"), TxnKind::Debt);
    assert_eq!(detect_kind("200 loan"), TxnKind::Expense);
}

#[test]
fn test_savings_marker_wins_over_everything() {
    for text in ["++300", "-5 ++", "+-10 ++ 20", "-+ 40 ++", "++ 50 +"] {
        assert_eq!(detect_kind(text), TxnKind::Savings, "text: {text}");
    }
}

#[test]
fn test_marker_position_does_not_matter() {
    let ex = extractor();
    let front = ex.extract("+-50").unwrap();
    let back = ex.extract("50+-").unwrap();
    assert_eq!(front.kind, TxnKind::DebtReturn);
    assert_eq!(back.kind, TxnKind::DebtReturn);
    assert_eq!(front.amount, dec!(50));
    assert_eq!(back.amount, dec!(50));
}

#[test]
fn test_debt_amount_is_positive() {
    let entry = extractor().extract("-200 loan").unwrap();
    assert_eq!(entry.kind, TxnKind::Debt);
    assert_eq!(entry.amount, dec!(200));
    assert_eq!(entry.description, "loan");
}

#[test]
fn test_income_without_description() {
    let entry = extractor().extract("  +5000  ").unwrap();
    assert_eq!(entry.kind, TxnKind::Income);
    assert_eq!(entry.amount, dec!(5000));
    assert!(entry.description.is_empty());
}

// ── Amount extraction ─────────────────────────────────────────

#[test]
fn test_largest_token_wins() {
    let ex = extractor();
    assert_eq!(ex.extract_amount("2 coffees 7.50 total"), Some(dec!(7.50)));
    assert_eq!(ex.extract_amount("taxi 12.5 tip 3"), Some(dec!(12.5)));
}

#[test]
fn test_currency_suffix_is_ignored() {
    let entry = extractor().extract("Lunch 150₴").unwrap();
    assert_eq!(entry.amount, dec!(150));
    assert_eq!(entry.description, "Lunch");
}

#[test]
fn test_more_than_two_decimals_keeps_cents() {
    let entry = extractor().extract("lunch 12.345").unwrap();
    assert_eq!(entry.amount, dec!(12.34));
    assert_eq!(entry.description, "lunch");
}

#[test]
fn test_currency_prefix_is_ignored() {
    let ex = extractor();
    assert_eq!(ex.extract("$12.50 coffee").unwrap().amount, dec!(12.50));
    assert_eq!(ex.extract("coffee €4.2").unwrap().amount, dec!(4.2));
    assert_eq!(ex.extract("taxi ₴300, tip 20").unwrap().amount, dec!(300));
}

#[test]
fn test_bare_number_with_sign_run() {
    assert_eq!(bare_number("--42.125"), Some(dec!(42.125)));
    assert_eq!(bare_number("42 lunch"), None);
}

#[test]
fn test_glued_digits_fall_back_to_largest_integer() {
    assert_eq!(extractor().extract_amount("lunch150"), Some(dec!(150)));
    assert_eq!(extractor().extract_amount("a1b22c3"), Some(dec!(22)));
}

#[test]
fn test_no_number_is_unparsable() {
    assert_eq!(extractor().extract("lunch"), Err(LedgerError::Unparsable));
    assert_eq!(extractor().extract("+"), Err(LedgerError::Unparsable));
}

#[test]
fn test_amount_above_limit_rejected() {
    let ex = extractor();
    assert_eq!(
        ex.extract("79228162514264337593543950335 yacht"),
        Err(LedgerError::AmountTooLarge(MAX_AMOUNT))
    );
    assert_eq!(
        ex.extract("1000000000*1000000"),
        Err(LedgerError::AmountTooLarge(MAX_AMOUNT))
    );
    assert_eq!(
        ex.extract("1000000000000 house").unwrap().amount,
        Decimal::from(MAX_AMOUNT)
    );
}

#[test]
fn test_zero_amount_rejected() {
    assert_eq!(extractor().extract("0 lunch"), Err(LedgerError::ZeroAmount));
    assert_eq!(extractor().extract("5-5"), Err(LedgerError::ZeroAmount));
}

// ── Expressions ───────────────────────────────────────────────

#[test]
fn test_expression_detection() {
    let ex = extractor();
    assert!(ex.is_expression("100+50"));
    assert!(ex.is_expression("100 - 20"));
    assert!(ex.is_expression("3*40"));
    assert!(ex.is_expression("2000*10%"));
    assert!(!ex.is_expression("+5000"));
    assert!(!ex.is_expression("50+-"));
    assert!(!ex.is_expression("-200 loan"));
    assert!(!ex.is_expression("(lunch)"));
    assert!(!ex.is_expression("150 lunch (work)"));
    assert!(ex.is_expression("(100+50)"));
}

#[test]
fn test_parenthetical_note_is_not_arithmetic() {
    let entry = extractor().extract("150 lunch (work)").unwrap();
    assert_eq!(entry.amount, dec!(150));
    assert_eq!(entry.kind, TxnKind::Expense);
    assert_eq!(entry.description, "lunch (work)");
}

#[test]
fn test_expression_amount_and_kind() {
    let ex = extractor();
    let entry = ex.extract("100 + 50").unwrap();
    assert_eq!(entry.amount, dec!(150));
    assert_eq!(entry.kind, TxnKind::Income);

    let entry = ex.extract("3*40").unwrap();
    assert_eq!(entry.amount, dec!(120));
    assert_eq!(entry.kind, TxnKind::Expense);

    let entry = ex.extract("++2000*10%").unwrap();
    assert_eq!(entry.amount, dec!(200));
    assert_eq!(entry.kind, TxnKind::Savings);

    let entry = ex.extract("+-50+10").unwrap();
    assert_eq!(entry.amount, dec!(40));
    assert_eq!(entry.kind, TxnKind::DebtReturn);
}

#[test]
fn test_leading_sign_is_part_of_the_expression() {
    let ex = extractor();
    let entry = ex.extract("-100-20").unwrap();
    assert_eq!(entry.amount, dec!(120));
    assert_eq!(entry.kind, TxnKind::Debt);

    let entry = ex.extract("--100-20").unwrap();
    assert_eq!(entry.amount, dec!(80));

    let entry = ex.extract("100*3 ++").unwrap();
    assert_eq!(entry.amount, dec!(300));
    assert_eq!(entry.kind, TxnKind::Savings);
}

#[test]
fn test_expression_result_is_magnitude() {
    let entry = extractor().extract("10-50*2").unwrap();
    assert_eq!(entry.amount, dec!(90));
}

#[test]
fn test_expression_errors_surface_as_calculation() {
    let ex = extractor();
    assert_eq!(
        ex.extract("10/0"),
        Err(LedgerError::Calculation(ExprError::DivisionByZero))
    );
    assert_eq!(
        ex.extract("5*3 pizza"),
        Err(LedgerError::Calculation(ExprError::DisallowedChar('p')))
    );
    assert!(matches!(ex.extract("(5+3"), Err(LedgerError::Calculation(_))));
}

// ── Evaluator ─────────────────────────────────────────────────

#[test]
fn test_evaluate_precedence() {
    assert_eq!(evaluate("2+3*4").unwrap(), dec!(14));
    assert_eq!(evaluate("(2+3)*4").unwrap(), dec!(20));
    assert_eq!(evaluate("10/4").unwrap(), dec!(2.5));
    assert_eq!(evaluate("8-2-1").unwrap(), dec!(5));
}

#[test]
fn test_evaluate_percent() {
    assert_eq!(evaluate("50%").unwrap(), dec!(0.5));
    assert_eq!(evaluate("1500*20%").unwrap(), dec!(300));
    assert_eq!(evaluate("(10+10)%").unwrap(), dec!(0.2));
}

#[test]
fn test_evaluate_sign_runs_collapse() {
    assert_eq!(evaluate("5--3").unwrap(), dec!(8));
    assert_eq!(evaluate("5+-3").unwrap(), dec!(2));
    assert_eq!(evaluate("--4").unwrap(), dec!(4));
}

#[test]
fn test_evaluate_rejects_disallowed_characters() {
    assert_eq!(evaluate("2^3"), Err(ExprError::DisallowedChar('^')));
    assert_eq!(evaluate("__import__"), Err(ExprError::DisallowedChar('_')));
    assert_eq!(evaluate("1e5"), Err(ExprError::DisallowedChar('e')));
}

#[test]
fn test_evaluate_malformed() {
    assert_eq!(evaluate(""), Err(ExprError::Empty));
    assert_eq!(evaluate("   "), Err(ExprError::Empty));
    assert_eq!(evaluate("5+"), Err(ExprError::UnexpectedEnd));
    assert_eq!(evaluate("(5+3"), Err(ExprError::UnbalancedParens));
    assert_eq!(evaluate("5+3)"), Err(ExprError::UnbalancedParens));
    assert_eq!(evaluate("5**2"), Err(ExprError::UnexpectedToken('*')));
    assert_eq!(evaluate("1.2.3"), Err(ExprError::InvalidNumber("1.2.3".into())));
    assert_eq!(evaluate("4/(2-2)"), Err(ExprError::DivisionByZero));
}

#[test]
fn test_evaluate_too_long() {
    let long = "1+".repeat(150) + "1";
    assert_eq!(evaluate(&long), Err(ExprError::TooLong));
}
