use crate::domain::ChannelId;

/// Core error type for the ticket system.
///
/// Adapter crates should map their platform-specific errors into this type so
/// the lifecycle core can handle failures consistently (user-facing outcome
/// vs logged-and-swallowed best-effort step).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("required setting missing: {0}")]
    ConfigurationMissing(&'static str),

    #[error("channel {0:?} is not a ticket channel")]
    NotATicket(ChannelId),

    #[error("channel {0:?} already has a ticket record")]
    AlreadyExists(ChannelId),

    #[error("not permitted")]
    PermissionDenied,

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("collaborator error: {0}")]
    Collaborator(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
