use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TxnKind;

/// An extracted but unconfirmed transaction, one slot per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingProposal {
    /// Echoed back by the confirmation button so stale buttons can be told
    /// apart from the current proposal.
    pub reference: u64,
    pub amount: Decimal,
    pub raw_text: String,
    pub description: String,
    pub suggested_category: String,
    pub kind: TxnKind,
    pub created_at: String,
}
