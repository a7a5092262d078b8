use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Platform channel id (numeric). Also identifies channel categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

/// Platform role id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(pub u64);

/// Ticket lifecycle state. Deletion is terminal and removes the record, so it
/// never appears here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketState {
    Open,
    Closed,
}

/// Persisted record for one ticket channel.
///
/// `owner_id` and `number` are immutable once assigned; only `state` is
/// mutated over the ticket's life.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub owner_id: UserId,
    pub number: u64,
    pub state: TicketState,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle transitions, as reported to the audit sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketAction {
    Created,
    Closed,
    Reopened,
    Saved,
    Deleted,
}

impl TicketAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketAction::Created => "Ticket Created",
            TicketAction::Closed => "Ticket Closed",
            TicketAction::Reopened => "Ticket Reopened",
            TicketAction::Saved => "Ticket Saved",
            TicketAction::Deleted => "Ticket Deleted",
        }
    }
}
