use rust_decimal::Decimal;

use crate::budget::savings::{SavingsFraming, SavingsRecommendation};
use crate::engine::{Button, Message, OutboundMessage, ParseMode};
use crate::error::LedgerError;
use crate::ledger::LedgerSummary;
use crate::models::{Bucket, BudgetNotice, MonthlyBudget, Transaction, TxnKind};

const DESCRIPTION_WIDTH: usize = 28;

/// Terminal text for one outbound message, buttons included.
pub(crate) fn render(reply: &OutboundMessage) -> String {
    let text = render_message(&reply.message);
    let mut out = match reply.parse_mode {
        Some(ParseMode::Markdown) => plain_heading(&text),
        None => text,
    };
    for row in &reply.buttons {
        out.push('\n');
        out.push_str(&render_buttons(row));
    }
    out
}

/// Terminals show Markdown literally, so drop the emphasis around a heading.
fn plain_heading(text: &str) -> String {
    let unstar = |line: &str| -> String {
        line.strip_prefix('*')
            .and_then(|h| h.strip_suffix('*'))
            .unwrap_or(line)
            .to_string()
    };
    match text.split_once('\n') {
        Some((first, rest)) => format!("{}\n{rest}", unstar(first)),
        None => unstar(text),
    }
}

fn render_buttons(row: &[Button]) -> String {
    row.iter()
        .map(|b| format!("[{}]", b.label))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn render_message(message: &Message) -> String {
    match message {
        Message::Help {
            commands,
            suggestion,
        } => render_help(commands, *suggestion),
        Message::Usage {
            command,
            description,
        } => format!("Usage: /{command}  {description}"),
        Message::SelectCategory {
            amount,
            kind,
            suggested,
            ..
        } => format!(
            "{} {}. Pick a category (suggested: {suggested}), or type @Category:",
            kind_label(*kind),
            format_amount(*amount)
        ),
        Message::Committed(txn) => format!(
            "Saved #{}: {} {} ({})",
            txn.id,
            kind_label(txn.kind).to_lowercase(),
            format_amount(txn.amount),
            txn.category
        ),
        Message::BudgetNotice(notice) => notice_text(*notice).to_string(),
        Message::SavingsAdvice(advice) => render_advice(advice),
        Message::Summary(summary) => render_summary(summary),
        Message::Budget(budget) => render_budget(budget),
        Message::Categories(names) => {
            let mut out = String::from("Your categories:");
            for (name, protected) in names {
                out.push_str("\n  ");
                out.push_str(name);
                if *protected {
                    out.push_str(" (protected)");
                }
            }
            out
        }
        Message::CategoryAdded { name, created } => {
            if *created {
                format!("Category {name} added")
            } else {
                format!("Keywords added to {name}")
            }
        }
        Message::CategoryRemoved(name) => format!("Category {name} removed"),
        Message::DeleteList(txns) => render_delete_list(txns),
        Message::NothingToDelete => "Nothing to delete yet".to_string(),
        Message::Deleted(txn) => format!(
            "Deleted: {} {} ({})",
            kind_label(txn.kind).to_lowercase(),
            format_amount(txn.amount),
            txn.category
        ),
        Message::DeleteCancelled => "Nothing deleted".to_string(),
        Message::ProposalCancelled => "Discarded".to_string(),
        Message::NothingToCancel => "Nothing to cancel".to_string(),
        Message::IncomeSet(amount) => format!("Monthly income set to {}", format_amount(*amount)),
        Message::LanguageSet(code) => format!("Language set to {code}"),
        Message::ResetDone => "All your data was erased".to_string(),
        Message::Failed(err) => error_text(err),
    }
}

fn render_help(commands: &[(&'static str, &'static str)], suggestion: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(name) = suggestion {
        out.push_str(&format!("Unknown command. Did you mean /{name}?\n\n"));
    }
    out.push_str("Send a line with an amount:\n");
    for (example, meaning) in [
        ("150 lunch", "expense"),
        ("+5000 salary", "income"),
        ("++1000", "put into savings"),
        ("-+200", "take from savings"),
        ("-200 loan", "borrowed money"),
        ("+-200 loan", "debt repaid"),
        ("100*3 taxi", "amounts can be calculations"),
    ] {
        out.push_str(&format!("  {example:<14} {meaning}\n"));
    }
    out.push_str("\nCommands:");
    for (name, description) in commands {
        out.push_str(&format!("\n  /{name:<16} {description}"));
    }
    out
}

fn render_summary(summary: &LedgerSummary) -> String {
    let mut out = format!(
        "*Summary*\n  Income:    {}\n  Expenses:  {}\n  Balance:   {}\n  Savings:   {}\n  Debt:      {}\n  Entries:   {}",
        format_amount(summary.income),
        format_amount(summary.expenses),
        format_amount(summary.balance),
        format_amount(summary.savings),
        format_amount(summary.debt),
        summary.count,
    );
    if !summary.by_category.is_empty() {
        out.push_str("\n\nSpending by category:");
        for (name, total) in &summary.by_category {
            out.push_str(&format!("\n  {name:<20} {}", format_amount(*total)));
        }
    }
    out
}

fn render_budget(budget: &MonthlyBudget) -> String {
    let month = if budget.month.is_empty() {
        "this month"
    } else {
        budget.month.as_str()
    };
    let mut out = format!(
        "*Budget {month}*\n  Income:  {}",
        format_amount(budget.totals.income)
    );
    for &bucket in Bucket::all() {
        let (label, target) = bucket_label(bucket);
        out.push_str(&format!(
            "\n  {label:<7}  {} ({}% of {target}%)",
            format_amount(budget.totals.bucket(bucket)),
            budget.percentages.bucket(bucket).round_dp(1),
        ));
    }
    out
}

fn render_advice(advice: &SavingsRecommendation) -> String {
    let framing = match advice.framing {
        SavingsFraming::BuildingEmergencyFund => "Start building an emergency fund.",
        SavingsFraming::GoodProgress => "Good progress on your savings.",
        SavingsFraming::ExcellentDiscipline => "Excellent saving discipline.",
    };
    format!(
        "{framing} Consider saving {}-{}% of this income: {} to {}",
        advice.min_percent,
        advice.max_percent,
        format_amount(advice.min_amount),
        format_amount(advice.max_amount)
    )
}

fn render_delete_list(txns: &[Transaction]) -> String {
    let mut out = String::from("*Which transaction should be deleted?*");
    for txn in txns {
        let date = txn.created_at.get(..10).unwrap_or(&txn.created_at);
        out.push_str(&format!(
            "\n  {:>3}. {date}  {:<16} {:>12}  {:<16} {}",
            txn.id,
            kind_label(txn.kind),
            format_amount(txn.amount),
            txn.category,
            truncate(&txn.description, DESCRIPTION_WIDTH),
        ));
    }
    out.push_str("\nReply with the number to delete, 0 to keep everything");
    out
}

fn error_text(err: &LedgerError) -> String {
    match err {
        LedgerError::Unparsable => {
            "No amount found. Try something like \"150 lunch\" or /help".to_string()
        }
        LedgerError::ExpiredTransaction => {
            "That transaction expired, please enter it again".to_string()
        }
        other => {
            let text = other.to_string();
            let mut chars = text.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => text,
            }
        }
    }
}

fn notice_text(notice: BudgetNotice) -> &'static str {
    match notice {
        BudgetNotice::NeedsApproaching => "Needs spending is approaching 50% of income",
        BudgetNotice::NeedsOver => "Needs spending is over 50% of income",
        BudgetNotice::WantsApproaching => "Wants spending is approaching 30% of income",
        BudgetNotice::WantsOver => "Wants spending is over 30% of income",
        BudgetNotice::FutureOnTarget => "Savings reached the 20% target",
        BudgetNotice::FutureExcellent => "Savings are above 25% of income. Excellent!",
    }
}

/// Display name and target share of income.
fn bucket_label(bucket: Bucket) -> (&'static str, u32) {
    match bucket {
        Bucket::Needs => ("Needs", 50),
        Bucket::Wants => ("Wants", 30),
        Bucket::Future => ("Future", 20),
    }
}

fn kind_label(kind: TxnKind) -> &'static str {
    match kind {
        TxnKind::Income => "Income",
        TxnKind::Expense => "Expense",
        TxnKind::Savings => "Savings",
        TxnKind::Debt => "Debt",
        TxnKind::DebtReturn => "Debt return",
        TxnKind::SavingsWithdraw => "Savings withdrawal",
    }
}

/// Format a decimal amount with thousand separators and 2 decimal places.
/// e.g. `1234567.89` → `"1,234,567.89"`
pub(crate) fn format_amount(val: Decimal) -> String {
    let abs = val.abs();
    let formatted = format!("{abs:.2}");
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next().unwrap_or("00");

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if val < Decimal::ZERO {
        format!("-{with_commas}.{dec_part}")
    } else {
        format!("{with_commas}.{dec_part}")
    }
}

/// Truncate to `max` characters, the last one being "…" when cut.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max - 1).collect();
    format!("{truncated}…")
}
