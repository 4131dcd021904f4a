use rust_decimal::Decimal;

use crate::budget::savings::SavingsRecommendation;
use crate::error::LedgerError;
use crate::ledger::LedgerSummary;
use crate::models::{BudgetNotice, MonthlyBudget, Transaction, TxnKind, UserId};

const BUTTONS_PER_ROW: usize = 2;

/// What the engine wants to say. The transport picks the wording for the
/// user's language.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Message {
    Help {
        commands: Vec<(&'static str, &'static str)>,
        /// Closest known command when the user typed an unknown one.
        suggestion: Option<&'static str>,
    },
    Usage {
        command: &'static str,
        description: &'static str,
    },
    SelectCategory {
        reference: u64,
        amount: Decimal,
        kind: TxnKind,
        suggested: String,
    },
    Committed(Transaction),
    BudgetNotice(BudgetNotice),
    SavingsAdvice(SavingsRecommendation),
    Summary(LedgerSummary),
    Budget(MonthlyBudget),
    /// Category names with their protected flag.
    Categories(Vec<(String, bool)>),
    CategoryAdded {
        name: String,
        created: bool,
    },
    CategoryRemoved(String),
    DeleteList(Vec<Transaction>),
    NothingToDelete,
    Deleted(Transaction),
    DeleteCancelled,
    ProposalCancelled,
    NothingToCancel,
    IncomeSet(Decimal),
    LanguageSet(String),
    ResetDone,
    Failed(LedgerError),
}

impl Message {
    fn parse_mode(&self) -> Option<ParseMode> {
        match self {
            Self::Summary(_) | Self::Budget(_) | Self::DeleteList(_) | Self::Help { .. } => {
                Some(ParseMode::Markdown)
            }
            _ => None,
        }
    }
}

impl From<LedgerError> for Message {
    fn from(err: LedgerError) -> Self {
        Self::Failed(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParseMode {
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Button {
    pub label: String,
    pub callback_value: String,
}

/// A send request handed to the messaging transport.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OutboundMessage {
    pub user_id: UserId,
    pub language: String,
    pub message: Message,
    pub buttons: Vec<Vec<Button>>,
    pub parse_mode: Option<ParseMode>,
}

impl OutboundMessage {
    pub(crate) fn new(user_id: &UserId, language: &str, message: Message) -> Self {
        Self {
            user_id: user_id.clone(),
            language: language.to_string(),
            parse_mode: message.parse_mode(),
            message,
            buttons: Vec::new(),
        }
    }

    pub(crate) fn with_buttons(mut self, buttons: Vec<Vec<Button>>) -> Self {
        self.buttons = buttons;
        self
    }
}

/// One button per option, two to a row. The callback carries the category.
pub(crate) fn button_rows(options: &[String]) -> Vec<Vec<Button>> {
    options
        .chunks(BUTTONS_PER_ROW)
        .map(|row| {
            row.iter()
                .map(|name| Button {
                    label: name.clone(),
                    callback_value: name.clone(),
                })
                .collect()
        })
        .collect()
}
