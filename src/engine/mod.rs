//! Conversation engine: turns inbound chat events into ledger changes and
//! outbound message requests. Each user's events are serialized on that
//! user's lock; storage writes happen later, in `flush`.

mod commands;
mod flusher;
mod messages;
mod store;

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, PoisonError};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::DateTime;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

pub(crate) use flusher::Flusher;
pub(crate) use messages::{Button, Message, OutboundMessage, ParseMode};

use commands::CommandContext;
use messages::button_rows;
use store::{lock, Conversation, DirtyKeys, IncomeRecord, StoreKey, UserDocument, UserState, UserStore};

use crate::budget::{self, savings};
use crate::categorize::{learn_from_override, Categorizer, LearnedPatterns};
use crate::clock::Clock;
use crate::config::Settings;
use crate::db::Storage;
use crate::error::LedgerError;
use crate::extract::Extractor;
use crate::ledger::Ledger;
use crate::models::{fixed_menu, CategoryTable, PendingProposal, Transaction, UserId, OTHER};

const RETRY_BACKOFF: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub(crate) struct EngineOptions {
    pub pending_ttl: Option<chrono::Duration>,
    pub flush_retries: u32,
    pub default_language: String,
}

impl From<&Settings> for EngineOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            pending_ttl: settings.pending_ttl(),
            flush_retries: settings.flush_retries(),
            default_language: settings.default_language.clone(),
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

pub(crate) struct Engine {
    users: UserStore,
    learned: RwLock<LearnedPatterns>,
    dirty: DirtyKeys,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    extractor: Extractor,
    options: EngineOptions,
}

impl Engine {
    /// Build the engine. Every stored document is loaded before this returns.
    pub(crate) fn open(
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        options: EngineOptions,
    ) -> Result<Self> {
        let extractor = Extractor::new().context("Failed to build amount extractor")?;
        let engine = Self {
            users: UserStore::default(),
            learned: RwLock::new(LearnedPatterns::default()),
            dirty: DirtyKeys::default(),
            storage,
            clock,
            extractor,
            options,
        };
        engine.load_all();
        Ok(engine)
    }

    // ── Inbound events ───────────────────────────────────────

    /// A plain chat message: a delete-mode reply, a slash command, or a
    /// transaction to propose.
    pub(crate) fn handle_text(&self, user_id: &UserId, raw: &str) -> Vec<OutboundMessage> {
        let slot = self.slot(user_id);
        let mut state = lock(&slot);
        let text = raw.trim();
        let mut dirty = Vec::new();

        let replies = if let Conversation::DeleteSelection { listed } = state.conversation {
            let message = self.select_for_deletion(user_id, &mut state, listed, text, &mut dirty);
            vec![reply(user_id, &state, message)]
        } else if let Some(command) = text.strip_prefix('/') {
            let month = self.clock.month_key();
            let mut ctx = CommandContext {
                user_id,
                state: &mut state,
                month: &month,
                dirty: Vec::new(),
            };
            let message = commands::handle_command(command, &mut ctx).unwrap_or_else(Message::from);
            dirty.extend(ctx.dirty);
            vec![reply(user_id, &state, message)]
        } else {
            self.propose(user_id, &mut state, text)
        };

        drop(state);
        self.dirty.mark(&dirty);
        replies
    }

    /// A category button press. `message_ref` is the proposal reference the
    /// button was sent with, when the transport has it.
    pub(crate) fn handle_confirmation(
        &self,
        user_id: &UserId,
        message_ref: Option<u64>,
        chosen: &str,
    ) -> Vec<OutboundMessage> {
        let slot = self.slot(user_id);
        let mut state = lock(&slot);
        let mut dirty = Vec::new();

        let messages = self
            .confirm(user_id, &mut state, message_ref, chosen, &mut dirty)
            .unwrap_or_else(|err| vec![Message::from(err)]);
        let replies = messages
            .into_iter()
            .map(|m| reply(user_id, &state, m))
            .collect();

        drop(state);
        self.dirty.mark(&dirty);
        replies
    }

    /// A digits-only reply while choosing a transaction to delete.
    pub(crate) fn handle_digit_reply(&self, user_id: &UserId, digits: &str) -> Vec<OutboundMessage> {
        let slot = self.slot(user_id);
        let mut state = lock(&slot);
        let mut dirty = Vec::new();

        let message = match state.conversation {
            Conversation::DeleteSelection { listed } => {
                self.select_for_deletion(user_id, &mut state, listed, digits.trim(), &mut dirty)
            }
            _ => Message::Failed(LedgerError::NotInDeleteMode),
        };
        let replies = vec![reply(user_id, &state, message)];

        drop(state);
        self.dirty.mark(&dirty);
        replies
    }

    // ── Proposal and commit ──────────────────────────────────

    fn propose(&self, user_id: &UserId, state: &mut UserState, text: &str) -> Vec<OutboundMessage> {
        let entry = match self.extractor.extract(text) {
            Ok(entry) => entry,
            Err(err) => {
                debug!(user = %user_id, error = %err, "text not recorded");
                return vec![reply(user_id, state, Message::from(err))];
            }
        };

        let (suggested, options) = match fixed_menu(entry.kind) {
            Some(menu) => (
                menu.first().copied().unwrap_or(OTHER).to_string(),
                menu.iter().map(|s| (*s).to_string()).collect::<Vec<_>>(),
            ),
            None => {
                let suggested =
                    Categorizer::new(&self.learned_read(), &state.categories).categorize(text);
                let mut options = vec![suggested.clone()];
                options.extend(
                    state
                        .categories
                        .names()
                        .into_iter()
                        .filter(|n| !n.eq_ignore_ascii_case(&suggested))
                        .map(str::to_string),
                );
                (suggested, options)
            }
        };

        let reference = state.next_reference();
        if let Some(previous) = state.pending() {
            info!(user = %user_id, replaced = previous.reference, reference, "pending proposal replaced");
        }
        info!(
            user = %user_id,
            reference,
            kind = %entry.kind,
            amount = %entry.amount,
            suggested = %suggested,
            "proposal stored"
        );

        let message = Message::SelectCategory {
            reference,
            amount: entry.amount,
            kind: entry.kind,
            suggested: suggested.clone(),
        };
        state.conversation = Conversation::AwaitingConfirmation(PendingProposal {
            reference,
            amount: entry.amount,
            raw_text: text.to_string(),
            description: entry.description,
            suggested_category: suggested,
            kind: entry.kind,
            created_at: self.clock.now().to_rfc3339(),
        });

        vec![reply(user_id, state, message).with_buttons(button_rows(&options))]
    }

    fn confirm(
        &self,
        user_id: &UserId,
        state: &mut UserState,
        message_ref: Option<u64>,
        chosen: &str,
        dirty: &mut Vec<StoreKey>,
    ) -> Result<Vec<Message>, LedgerError> {
        let Some(proposal) = state.pending().cloned() else {
            info!(user = %user_id, "confirmation without a pending proposal");
            return Err(LedgerError::ExpiredTransaction);
        };
        if message_ref.is_some_and(|r| r != proposal.reference) {
            info!(user = %user_id, stale = ?message_ref, current = proposal.reference, "stale confirmation");
            return Err(LedgerError::ExpiredTransaction);
        }
        if self.is_expired(&proposal) {
            state.conversation = Conversation::Idle;
            info!(user = %user_id, reference = proposal.reference, "pending proposal expired");
            return Err(LedgerError::ExpiredTransaction);
        }

        let category = resolve_category(state, &proposal, chosen, dirty)?;
        let now = self.clock.now();
        let prior_savings = state.ledger.savings_deposits();
        let committed = state
            .ledger
            .append(Transaction::new(
                proposal.amount,
                proposal.kind,
                category.clone(),
                proposal.description.clone(),
                now.to_rfc3339(),
            ))
            .clone();
        state.conversation = Conversation::Idle;
        dirty.extend([StoreKey::Transactions, StoreKey::Incomes]);
        info!(
            user = %user_id,
            id = committed.id,
            kind = %committed.kind,
            amount = %committed.amount,
            category = %committed.category,
            "transaction committed"
        );

        let learned = learn_from_override(
            &mut self.learned_write(),
            proposal.kind,
            &proposal.raw_text,
            &proposal.suggested_category,
            &category,
        );
        if learned > 0 {
            dirty.push(StoreKey::LearnedPatterns);
            info!(user = %user_id, words = learned, category = %category, "learned from correction");
        }

        let month = now.format("%Y-%m").to_string();
        let notices = budget::record(
            &mut state.budget,
            &month,
            committed.kind,
            &committed.category,
            committed.amount,
        );
        for notice in &notices {
            info!(user = %user_id, notice = ?notice, month = %month, "budget threshold crossed");
        }

        let mut messages = vec![Message::Committed(committed.clone())];
        messages.extend(notices.into_iter().map(Message::BudgetNotice));
        if committed.is_income() {
            messages.push(Message::SavingsAdvice(savings::recommend(
                committed.amount,
                prior_savings,
            )));
        }
        Ok(messages)
    }

    fn is_expired(&self, proposal: &PendingProposal) -> bool {
        let Some(ttl) = self.options.pending_ttl else {
            return false;
        };
        match DateTime::parse_from_rfc3339(&proposal.created_at) {
            Ok(created) => self.clock.now().signed_duration_since(created) > ttl,
            Err(_) => true,
        }
    }

    // ── Delete selection ─────────────────────────────────────

    /// Single shot: whatever the reply, the user leaves delete mode.
    fn select_for_deletion(
        &self,
        user_id: &UserId,
        state: &mut UserState,
        listed: usize,
        reply: &str,
        dirty: &mut Vec<StoreKey>,
    ) -> Message {
        state.conversation = Conversation::Idle;

        if reply.is_empty() || !reply.bytes().all(|b| b.is_ascii_digit()) {
            info!(user = %user_id, "delete selection cancelled");
            return Message::DeleteCancelled;
        }
        let choice = reply.parse::<usize>().unwrap_or(usize::MAX);
        if choice == 0 {
            info!(user = %user_id, "delete selection closed");
            return Message::DeleteCancelled;
        }
        if choice > listed {
            return Message::Failed(LedgerError::InvalidSelection(choice));
        }

        match state.ledger.delete(choice) {
            Some(removed) => {
                dirty.push(StoreKey::Transactions);
                info!(
                    user = %user_id,
                    position = choice,
                    remaining = state.ledger.len(),
                    "transaction deleted"
                );
                Message::Deleted(removed)
            }
            None => Message::Failed(LedgerError::InvalidSelection(choice)),
        }
    }

    // ── Persistence ──────────────────────────────────────────

    /// Save every dirty key. Keys that still fail after the configured
    /// retries stay dirty for the next flush.
    pub(crate) fn flush(&self) -> Result<()> {
        let keys = self.dirty.take();
        if keys.is_empty() {
            return Ok(());
        }

        let mut failed = Vec::new();
        for key in keys {
            let result = self
                .encode(key)
                .and_then(|bytes| self.save_with_retries(key, &bytes).map(|()| bytes.len()));
            match result {
                Ok(bytes) => debug!(key = %key, bytes, "flushed"),
                Err(e) => {
                    error!(key = %key, error = %e, "flush failed, keeping changes in memory");
                    failed.push(key);
                }
            }
        }

        if failed.is_empty() {
            return Ok(());
        }
        self.dirty.mark(&failed);
        let names: Vec<&str> = failed.iter().map(|k| k.as_str()).collect();
        bail!("Failed to persist: {}", names.join(", "))
    }

    pub(crate) fn has_unsaved_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    fn save_with_retries(&self, key: StoreKey, bytes: &[u8]) -> Result<()> {
        let attempts = self.options.flush_retries.max(1);
        let mut last_err = None;
        for attempt in 1..=attempts {
            match self.storage.save(key.as_str(), bytes) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(key = %key, attempt, error = %e, "save failed");
                    last_err = Some(e);
                    if attempt < attempts {
                        std::thread::sleep(RETRY_BACKOFF * attempt);
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("no save attempted for '{key}'")))
    }

    /// Serialize one key from clones taken under each user's lock. No lock
    /// is held while encoding or saving.
    fn encode(&self, key: StoreKey) -> Result<Vec<u8>> {
        let encoded = match key {
            StoreKey::Transactions => serde_json::to_vec(&self.collect(|s| s.ledger.clone())),
            StoreKey::Incomes => serde_json::to_vec(&self.collect(UserState::income_record)),
            StoreKey::Categories => serde_json::to_vec(&self.collect(|s| s.categories.clone())),
            StoreKey::Languages => serde_json::to_vec(&self.collect(|s| s.language.clone())),
            StoreKey::LearnedPatterns => {
                let learned = self.learned_read().clone();
                serde_json::to_vec(&learned)
            }
        };
        encoded.with_context(|| format!("Failed to encode '{key}'"))
    }

    fn collect<T>(&self, f: impl Fn(&UserState) -> T) -> UserDocument<T> {
        self.users
            .slots()
            .into_iter()
            .map(|(id, slot)| {
                let value = f(&lock(&slot));
                (id, value)
            })
            .collect()
    }

    fn load_all(&self) {
        let languages: UserDocument<String> = self.load_document(StoreKey::Languages);
        let mut transactions: UserDocument<Ledger> = self.load_document(StoreKey::Transactions);
        let mut incomes: UserDocument<IncomeRecord> = self.load_document(StoreKey::Incomes);
        let mut categories: UserDocument<CategoryTable> = self.load_document(StoreKey::Categories);
        let learned: LearnedPatterns = self.load_document(StoreKey::LearnedPatterns);

        let ids: BTreeSet<UserId> = languages
            .keys()
            .chain(transactions.keys())
            .chain(incomes.keys())
            .chain(categories.keys())
            .cloned()
            .collect();

        for id in ids {
            let language = languages
                .get(&id)
                .map_or(self.options.default_language.as_str(), String::as_str);
            let mut state = UserState::new(language);
            if let Some(ledger) = transactions.remove(&id) {
                state.ledger = Ledger::from_transactions(ledger.list().to_vec());
            }
            if let Some(record) = incomes.remove(&id) {
                state.monthly_income = record.monthly_income;
                state.budget = record.budget;
            }
            if let Some(mut table) = categories.remove(&id) {
                table.normalize();
                state.categories = table;
            }
            self.users.insert(id, state);
        }

        info!(users = self.users.len(), learned = learned.len(), "state loaded");
        *self.learned_write() = learned;
    }

    /// Decode one stored document. Absent, unreadable or undecodable data
    /// all start empty.
    fn load_document<T: DeserializeOwned + Default>(&self, key: StoreKey) -> T {
        match self.storage.load(key.as_str()) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "undecodable document, starting empty");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                error!(key = %key, error = %e, "load failed, starting empty");
                T::default()
            }
        }
    }

    // ── State access ─────────────────────────────────────────

    fn slot(&self, user_id: &UserId) -> Arc<std::sync::Mutex<UserState>> {
        let (slot, created) = self.users.slot(user_id, &self.options.default_language);
        if created {
            self.dirty.mark(&[StoreKey::Languages]);
            info!(user = %user_id, "new user registered");
        }
        slot
    }

    fn learned_read(&self) -> RwLockReadGuard<'_, LearnedPatterns> {
        self.learned.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn learned_write(&self) -> RwLockWriteGuard<'_, LearnedPatterns> {
        self.learned.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn user_state(&self, user_id: &UserId) -> Option<UserState> {
        self.users.get(user_id).map(|slot| lock(&slot).clone())
    }

    #[cfg(test)]
    pub(crate) fn learned_patterns(&self) -> LearnedPatterns {
        self.learned_read().clone()
    }

    #[cfg(test)]
    pub(crate) fn is_dirty(&self, key: StoreKey) -> bool {
        self.dirty.contains(key)
    }
}

fn reply(user_id: &UserId, state: &UserState, message: Message) -> OutboundMessage {
    OutboundMessage::new(user_id, &state.language, message)
}

/// The category name to commit. Fixed-menu kinds must pick from their
/// menu; an expense may name any valid category, which is added to the
/// user's table if new.
fn resolve_category(
    state: &mut UserState,
    proposal: &PendingProposal,
    chosen: &str,
    dirty: &mut Vec<StoreKey>,
) -> Result<String, LedgerError> {
    let chosen = chosen.trim();
    if let Some(menu) = fixed_menu(proposal.kind) {
        return menu
            .iter()
            .find(|m| m.eq_ignore_ascii_case(chosen))
            .map(|m| (*m).to_string())
            .ok_or_else(|| LedgerError::UnknownCategory(chosen.to_string()));
    }

    if state.categories.ensure(chosen)? {
        dirty.push(StoreKey::Categories);
    }
    Ok(state
        .categories
        .find(chosen)
        .map_or_else(|| chosen.to_string(), |c| c.name.clone()))
}
