mod cli;
mod render;

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::debug;

use crate::engine::{Engine, Flusher, Message, OutboundMessage};
use crate::models::UserId;

pub(crate) use cli::as_cli;

/// Conversation state the terminal keeps on behalf of the messaging
/// transport: which proposal the last buttons belong to and whether a
/// delete list is waiting for a number.
#[derive(Debug, Default)]
struct Session {
    reference: Option<u64>,
    selecting: bool,
}

impl Session {
    fn observe(&mut self, replies: &[OutboundMessage]) {
        for reply in replies {
            match &reply.message {
                Message::SelectCategory { reference, .. } => {
                    self.reference = Some(*reference);
                    self.selecting = false;
                }
                Message::DeleteList(_) => {
                    self.selecting = true;
                    self.reference = None;
                }
                Message::Committed(_) | Message::ProposalCancelled | Message::ResetDone => {
                    self.reference = None;
                }
                Message::Deleted(_)
                | Message::DeleteCancelled
                | Message::Failed(crate::error::LedgerError::InvalidSelection(_)) => {
                    self.selecting = false;
                }
                _ => {}
            }
        }
    }
}

/// Interactive chat on a terminal. `@Category` presses the button for the
/// last proposal; anything else is sent as a chat message.
pub(crate) fn as_chat(
    engine: &Engine,
    flusher: &Flusher,
    user_id: &UserId,
    input: impl BufRead,
    mut out: impl Write,
) -> Result<()> {
    writeln!(
        out,
        "ChatLedger: type \"150 lunch\", \"+5000 salary\" or /help. \"quit\" exits."
    )?;
    let mut session = Session::default();

    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if matches!(text, "quit" | "exit") {
            break;
        }

        let replies = if let Some(chosen) = text.strip_prefix('@') {
            engine.handle_confirmation(user_id, session.reference, chosen.trim())
        } else if session.selecting && text.chars().all(|c| c.is_ascii_digit()) {
            engine.handle_digit_reply(user_id, text)
        } else {
            engine.handle_text(user_id, text)
        };
        debug!(user = %user_id, replies = replies.len(), "chat line handled");
        session.observe(&replies);

        for reply in &replies {
            writeln!(out, "{}", render::render(reply))?;
        }
        out.flush().context("Failed to write output")?;
        flusher.request();
    }
    Ok(())
}

/// Send one line and print the replies. Used by non-interactive commands.
pub(crate) fn one_shot(engine: &Engine, user_id: &UserId, text: &str) -> Vec<String> {
    engine
        .handle_text(user_id, text)
        .iter()
        .map(render::render)
        .collect()
}
