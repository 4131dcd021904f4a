use anyhow::Result;

use super::render;
use crate::engine::{Engine, Flusher, Message};
use crate::models::UserId;

const DEFAULT_USER: &str = "local";

pub(crate) fn as_cli(args: &[String], engine: &Engine, flusher: &Flusher) -> Result<()> {
    let user_id = user_of(args);
    let words = positional(args.get(1..).unwrap_or_default());
    let command = words.first().copied().unwrap_or("chat");
    let rest = words.get(1..).unwrap_or_default();

    match command {
        "chat" => {
            let stdin = std::io::stdin();
            super::as_chat(engine, flusher, &user_id, stdin.lock(), std::io::stdout())
        }
        "summary" | "s" => cli_print(engine, &user_id, "/summary"),
        "budget" | "b" => cli_print(engine, &user_id, "/budget"),
        "categories" | "c" => cli_print(engine, &user_id, "/categories"),
        "add" => cli_add(rest, engine, &user_id),
        "help" | "-h" => {
            print_usage();
            Ok(())
        }
        "version" | "-V" => {
            println!("chatledger {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn user_of(args: &[String]) -> UserId {
    args.windows(2)
        .find(|w| w[0] == "--user")
        .map_or_else(|| UserId::from(DEFAULT_USER), |w| UserId::new(w[1].as_str()))
}

/// Arguments that are neither `--` options nor the value after `--user`.
fn positional(args: &[String]) -> Vec<&str> {
    args.iter()
        .scan(false, |skip, arg| {
            let keep = !*skip && !arg.starts_with("--");
            *skip = arg == "--user";
            Some((keep, arg.as_str()))
        })
        .filter_map(|(keep, arg)| keep.then_some(arg))
        .collect()
}

fn print_usage() {
    println!("ChatLedger - chat-driven personal finance ledger");
    println!();
    println!("Usage: chatledger [--user <id>] [--memory] [command]");
    println!();
    println!("Commands:");
    println!("  (none), chat                  Start a chat session on the terminal");
    println!("  add <text> [category]         Record one transaction, e.g. add \"150 lunch\" Food");
    println!("  summary, s                    Print income, expenses and balance");
    println!("  budget, b                     Print this month's 50/30/20 split");
    println!("  categories, c                 List categories");
    println!("  help, -h                      Show this help");
    println!("  version, -V                   Show version");
    println!();
    println!("Options:");
    println!("  --user <id>                   Ledger to use (default: {DEFAULT_USER})");
    println!("  --memory                      Keep everything in memory, nothing is saved");
}

fn cli_print(engine: &Engine, user_id: &UserId, command: &str) -> Result<()> {
    for text in super::one_shot(engine, user_id, command) {
        println!("{text}");
    }
    Ok(())
}

/// Propose and confirm in one go. Without a category the suggestion is taken.
fn cli_add(args: &[&str], engine: &Engine, user_id: &UserId) -> Result<()> {
    let Some(text) = args.first() else {
        anyhow::bail!("Usage: chatledger add <text> [category]");
    };

    let proposal = engine.handle_text(user_id, text);
    let Some((reference, suggested)) = proposal.iter().find_map(|r| match &r.message {
        Message::SelectCategory {
            reference,
            suggested,
            ..
        } => Some((*reference, suggested.clone())),
        _ => None,
    }) else {
        // Not a transaction: a failure or a command reply.
        for reply in &proposal {
            println!("{}", render::render(reply));
        }
        return Ok(());
    };

    let category = args.get(1).copied().unwrap_or(suggested.as_str());
    for reply in engine.handle_confirmation(user_id, Some(reference), category) {
        println!("{}", render::render(&reply));
    }
    Ok(())
}
