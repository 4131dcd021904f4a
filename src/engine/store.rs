use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::Ledger;
use crate::models::{CategoryTable, MonthlyBudget, PendingProposal, UserId};

/// Lock a mutex, taking the data back from a panicked holder.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Logical storage keys. Each holds one JSON document for every user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum StoreKey {
    Transactions,
    Incomes,
    Categories,
    Languages,
    LearnedPatterns,
}

impl StoreKey {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Transactions => "transactions",
            Self::Incomes => "incomes",
            Self::Categories => "categories",
            Self::Languages => "languages",
            Self::LearnedPatterns => "learned_patterns",
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a user is in the conversation. Confirmation and delete selection
/// exclude each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) enum Conversation {
    #[default]
    Idle,
    AwaitingConfirmation(PendingProposal),
    /// Transactions 1..=listed were shown to the user.
    DeleteSelection { listed: usize },
}

/// The income document's per-user entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct IncomeRecord {
    #[serde(default)]
    pub monthly_income: Option<Decimal>,
    #[serde(default)]
    pub budget: MonthlyBudget,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UserState {
    pub language: String,
    pub monthly_income: Option<Decimal>,
    pub categories: CategoryTable,
    pub ledger: Ledger,
    pub budget: MonthlyBudget,
    pub conversation: Conversation,
    next_reference: u64,
}

impl UserState {
    pub(crate) fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            monthly_income: None,
            categories: CategoryTable::default(),
            ledger: Ledger::default(),
            budget: MonthlyBudget::default(),
            conversation: Conversation::Idle,
            next_reference: 0,
        }
    }

    pub(crate) fn next_reference(&mut self) -> u64 {
        self.next_reference += 1;
        self.next_reference
    }

    pub(crate) fn pending(&self) -> Option<&PendingProposal> {
        match &self.conversation {
            Conversation::AwaitingConfirmation(p) => Some(p),
            _ => None,
        }
    }

    /// Clear everything the user owns except the language preference.
    /// Proposal references keep counting so old buttons stay stale.
    pub(crate) fn reset(&mut self) {
        let next_reference = self.next_reference;
        *self = Self::new(&self.language);
        self.next_reference = next_reference;
    }

    pub(crate) fn income_record(&self) -> IncomeRecord {
        IncomeRecord {
            monthly_income: self.monthly_income,
            budget: self.budget.clone(),
        }
    }
}

/// Per-user state slots. The map lock is only held to find or create a
/// slot; work for a user happens under that user's own lock.
#[derive(Default)]
pub(crate) struct UserStore {
    users: Mutex<HashMap<UserId, Arc<Mutex<UserState>>>>,
}

impl UserStore {
    /// The user's slot and whether it was just created.
    pub(crate) fn slot(&self, id: &UserId, language: &str) -> (Arc<Mutex<UserState>>, bool) {
        let mut users = lock(&self.users);
        if let Some(slot) = users.get(id) {
            return (Arc::clone(slot), false);
        }
        let slot = Arc::new(Mutex::new(UserState::new(language)));
        users.insert(id.clone(), Arc::clone(&slot));
        (slot, true)
    }

    pub(crate) fn insert(&self, id: UserId, state: UserState) {
        lock(&self.users).insert(id, Arc::new(Mutex::new(state)));
    }

    pub(crate) fn get(&self, id: &UserId) -> Option<Arc<Mutex<UserState>>> {
        lock(&self.users).get(id).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.users).len()
    }

    /// Every slot, sorted by user id.
    pub(crate) fn slots(&self) -> Vec<(UserId, Arc<Mutex<UserState>>)> {
        let mut slots: Vec<_> = lock(&self.users)
            .iter()
            .map(|(id, slot)| (id.clone(), Arc::clone(slot)))
            .collect();
        slots.sort_by(|a, b| a.0.cmp(&b.0));
        slots
    }
}

/// Keys changed since the last successful save.
#[derive(Default)]
pub(crate) struct DirtyKeys {
    keys: Mutex<BTreeSet<StoreKey>>,
}

impl DirtyKeys {
    pub(crate) fn mark(&self, keys: &[StoreKey]) {
        lock(&self.keys).extend(keys.iter().copied());
    }

    pub(crate) fn take(&self) -> BTreeSet<StoreKey> {
        std::mem::take(&mut *lock(&self.keys))
    }

    pub(crate) fn is_empty(&self) -> bool {
        lock(&self.keys).is_empty()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: StoreKey) -> bool {
        lock(&self.keys).contains(&key)
    }
}

/// Per-key documents assembled from every user's state for one flush.
pub(crate) type UserDocument<T> = BTreeMap<UserId, T>;
