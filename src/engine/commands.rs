use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use tracing::info;

use super::messages::Message;
use super::store::{Conversation, StoreKey, UserState};
use crate::budget;
use crate::error::LedgerError;
use crate::extract::MAX_AMOUNT;
use crate::models::{is_protected, UserId};

/// What a command handler may touch.
pub(crate) struct CommandContext<'a> {
    pub user_id: &'a UserId,
    pub state: &'a mut UserState,
    pub month: &'a str,
    /// Storage keys the handler changed.
    pub dirty: Vec<StoreKey>,
}

type Outcome = Result<Message, LedgerError>;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut CommandContext<'_>) -> Outcome,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("start", "Show how to record transactions", cmd_help, r);
    register_command!("help", "Show how to record transactions", cmd_help, r);
    register_command!("summary", "Income, expenses and balance", cmd_summary, r);
    register_command!("budget", "This month's 50/30/20 split", cmd_budget, r);
    register_command!("categories", "List your categories", cmd_categories, r);
    register_command!(
        "addcategory",
        "Add a category or keywords (e.g. /addcategory Pets vet, /addcategory Pet Care | vet)",
        cmd_add_category,
        r
    );
    register_command!(
        "removecategory",
        "Remove a category (e.g. /removecategory Pets)",
        cmd_remove_category,
        r
    );
    register_command!("delete", "Pick a transaction to delete", cmd_delete, r);
    register_command!("cancel", "Discard the unconfirmed transaction", cmd_cancel, r);
    register_command!(
        "income",
        "Set your monthly income (e.g. /income 5000)",
        cmd_income,
        r
    );
    register_command!("lang", "Set your language (e.g. /lang en)", cmd_lang, r);
    register_command!("reset", "Erase all your data", cmd_reset, r);

    r
});

/// Run a slash command. `input` is the text after the leading `/`.
pub(crate) fn handle_command(input: &str, ctx: &mut CommandContext<'_>) -> Outcome {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let raw_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    // Group chats address commands as /name@bot.
    let name = raw_name
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    match COMMANDS.get(name.as_str()) {
        Some(cmd) => (cmd.run)(args, ctx),
        None => Ok(Message::Help {
            commands: help_lines(),
            suggestion: (!name.is_empty()).then(|| find_closest(&name)),
        }),
    }
}

/// Registered commands sorted by name.
pub(crate) fn help_lines() -> Vec<(&'static str, &'static str)> {
    let mut lines: Vec<(&'static str, &'static str)> = COMMANDS
        .iter()
        .map(|(name, cmd)| (*name, cmd.description))
        .collect();
    lines.sort_unstable();
    lines
}

fn find_closest(input: &str) -> &'static str {
    COMMANDS
        .keys()
        .copied()
        .min_by_key(|k| (levenshtein(input, k), *k))
        .unwrap_or("help")
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn usage(name: &'static str) -> Outcome {
    Ok(Message::Usage {
        command: name,
        description: COMMANDS.get(name).map_or("", |c| c.description),
    })
}

// ── Command implementations ──────────────────────────────────

fn cmd_help(_args: &str, _ctx: &mut CommandContext<'_>) -> Outcome {
    Ok(Message::Help {
        commands: help_lines(),
        suggestion: None,
    })
}

fn cmd_summary(_args: &str, ctx: &mut CommandContext<'_>) -> Outcome {
    Ok(Message::Summary(ctx.state.ledger.summary()))
}

fn cmd_budget(_args: &str, ctx: &mut CommandContext<'_>) -> Outcome {
    Ok(Message::Budget(budget::snapshot(&ctx.state.budget, ctx.month)))
}

fn cmd_categories(_args: &str, ctx: &mut CommandContext<'_>) -> Outcome {
    let names = ctx
        .state
        .categories
        .names()
        .into_iter()
        .map(|name| (name.to_string(), is_protected(name)))
        .collect();
    Ok(Message::Categories(names))
}

/// `/addcategory Pets vet petshop` or, for names with spaces,
/// `/addcategory Pet Care | vet groomer`.
fn cmd_add_category(args: &str, ctx: &mut CommandContext<'_>) -> Outcome {
    let (name, keywords) = match args.split_once('|') {
        Some((name, keywords)) => (name.trim(), keywords),
        None => args
            .split_once(char::is_whitespace)
            .unwrap_or((args, "")),
    };
    if name.is_empty() {
        return usage("addcategory");
    }
    let keywords: Vec<String> = keywords.split_whitespace().map(str::to_string).collect();

    let created = ctx.state.categories.add(name, &keywords)?;
    ctx.dirty.push(StoreKey::Categories);
    info!(user = %ctx.user_id, category = name, created, "category added");
    Ok(Message::CategoryAdded {
        name: name.to_string(),
        created,
    })
}

fn cmd_remove_category(args: &str, ctx: &mut CommandContext<'_>) -> Outcome {
    if args.is_empty() {
        return usage("removecategory");
    }
    let removed = ctx.state.categories.remove(args)?;
    ctx.dirty.push(StoreKey::Categories);
    info!(user = %ctx.user_id, category = %removed.name, "category removed");
    Ok(Message::CategoryRemoved(removed.name))
}

fn cmd_delete(_args: &str, ctx: &mut CommandContext<'_>) -> Outcome {
    let state = &mut *ctx.state;
    if state.ledger.is_empty() {
        return Ok(Message::NothingToDelete);
    }
    if state.pending().is_some() {
        info!(user = %ctx.user_id, "pending proposal discarded for delete selection");
    }
    state.conversation = Conversation::DeleteSelection {
        listed: state.ledger.len(),
    };
    Ok(Message::DeleteList(state.ledger.list().to_vec()))
}

fn cmd_cancel(_args: &str, ctx: &mut CommandContext<'_>) -> Outcome {
    if ctx.state.pending().is_none() {
        return Ok(Message::NothingToCancel);
    }
    ctx.state.conversation = Conversation::Idle;
    info!(user = %ctx.user_id, "pending proposal cancelled");
    Ok(Message::ProposalCancelled)
}

fn cmd_income(args: &str, ctx: &mut CommandContext<'_>) -> Outcome {
    let Ok(amount) = Decimal::from_str(args.trim_start_matches('+')) else {
        return usage("income");
    };
    if amount.is_sign_negative() {
        return usage("income");
    }
    if amount.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }
    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(LedgerError::AmountTooLarge(MAX_AMOUNT));
    }
    ctx.state.monthly_income = Some(amount);
    ctx.dirty.push(StoreKey::Incomes);
    Ok(Message::IncomeSet(amount))
}

fn cmd_lang(args: &str, ctx: &mut CommandContext<'_>) -> Outcome {
    let code = args.to_lowercase();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_lowercase()) {
        return usage("lang");
    }
    ctx.state.language = code.clone();
    ctx.dirty.push(StoreKey::Languages);
    Ok(Message::LanguageSet(code))
}

fn cmd_reset(_args: &str, ctx: &mut CommandContext<'_>) -> Outcome {
    ctx.state.reset();
    ctx.dirty
        .extend([StoreKey::Transactions, StoreKey::Incomes, StoreKey::Categories]);
    info!(user = %ctx.user_id, "user data reset");
    Ok(Message::ResetDone)
}
