mod expr;

use std::str::FromStr;

use anyhow::Result;
use regex::Regex;
use rust_decimal::Decimal;

pub use expr::{evaluate, ExprError};

/// Largest amount a single chat line may record.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

use crate::error::LedgerError;
use crate::models::TxnKind;

/// A parsed chat line, before any category is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub amount: Decimal,
    pub kind: TxnKind,
    pub description: String,
}

/// Kind markers in priority order. The first one found anywhere in the
/// text decides the kind.
const MARKERS: &[(&str, TxnKind)] = &[
    ("++", TxnKind::Savings),
    ("+-", TxnKind::DebtReturn),
    ("-+", TxnKind::SavingsWithdraw),
    ("+", TxnKind::Income),
];

/// Derive the transaction kind from the markers in `text`.
pub fn detect_kind(text: &str) -> TxnKind {
    for &(marker, kind) in MARKERS {
        if text.contains(marker) {
            return kind;
        }
    }
    if text.trim().starts_with('-') {
        TxnKind::Debt
    } else {
        TxnKind::Expense
    }
}

pub struct Extractor {
    token: Regex,
    integer: Regex,
    binary_op: Regex,
}

impl Extractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            token: Regex::new(r"[-+]?[0-9]+(?:\.[0-9]{1,2})?")?,
            integer: Regex::new(r"[0-9]+")?,
            binary_op: Regex::new(r"[0-9.)%][ \t]*[-+*/][ \t]*[-+]*[ \t]*[0-9.(]")?,
        })
    }

    /// Parse a raw chat line into an amount and kind.
    pub fn extract(&self, raw: &str) -> Result<Entry, LedgerError> {
        let text = raw.trim();
        let kind = detect_kind(text);

        let (amount, description) = if self.is_expression(text) {
            (evaluate(trim_trailing_markers(text))?.abs(), String::new())
        } else {
            let amount = self.extract_amount(text).ok_or(LedgerError::Unparsable)?;
            (amount, describe(text))
        };

        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        if amount > Decimal::from(MAX_AMOUNT) {
            return Err(LedgerError::AmountTooLarge(MAX_AMOUNT));
        }
        Ok(Entry {
            amount,
            kind,
            description,
        })
    }

    /// Whether the text is arithmetic rather than "amount + words".
    pub fn is_expression(&self, text: &str) -> bool {
        if !text.chars().any(|c| c.is_ascii_digit()) {
            return false;
        }
        text.contains(['*', '/', '%']) || self.binary_op.is_match(text)
    }

    /// Amount magnitude, tried in order: numeric tokens (largest wins), the
    /// whole text as a bare number, the largest run of digits.
    pub fn extract_amount(&self, text: &str) -> Option<Decimal> {
        self.largest_token(text)
            .or_else(|| bare_number(text))
            .or_else(|| self.largest_integer(text))
    }

    fn largest_token(&self, text: &str) -> Option<Decimal> {
        self.token
            .find_iter(text)
            .filter_map(|m| Decimal::from_str(m.as_str().trim_start_matches('+')).ok())
            .map(|d| d.abs())
            .max()
    }

    fn largest_integer(&self, text: &str) -> Option<Decimal> {
        self.integer
            .find_iter(text)
            .filter_map(|m| Decimal::from_str(m.as_str()).ok())
            .max()
    }
}

fn bare_number(text: &str) -> Option<Decimal> {
    let stripped = text.trim().trim_start_matches(['+', '-']);
    Decimal::from_str(stripped).ok().map(|d| d.abs())
}

/// Drop a marker run written after the expression, as in `100*3 ++`.
/// Leading signs stay: the evaluator folds them into the first operand.
fn trim_trailing_markers(text: &str) -> &str {
    text.trim_end_matches(|c: char| c == '+' || c == '-' || c.is_whitespace())
}

/// The words of a chat line with amounts and markers removed.
fn describe(text: &str) -> String {
    text.split_whitespace()
        .filter(|w| !w.chars().any(|c| c.is_ascii_digit()))
        .map(|w| w.trim_matches(['+', '-']))
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests;
