use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    domain::{ChannelId, RoleId, UserId},
    Result,
};

/// Who a channel permission entry applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Principal {
    /// The server-wide default role.
    Everyone,
    User(UserId),
    Role(RoleId),
}

/// Read/write visibility for one principal on one channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visibility {
    pub read: bool,
    pub write: bool,
}

impl Visibility {
    pub const HIDDEN: Visibility = Visibility {
        read: false,
        write: false,
    };
    pub const READ_WRITE: Visibility = Visibility {
        read: true,
        write: true,
    };
}

/// A platform-neutral notice posted into a channel. Adapters decide how to
/// render it (embed, plain text, ...); core only supplies structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub fields: Vec<(String, String)>,
}

impl Notice {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }
}

/// One message of a channel's history, as consumed by the archive exporter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchivedMessage {
    pub sent_at: DateTime<Utc>,
    pub author_name: String,
    pub author_id: UserId,
    pub content: String,
    pub attachment_urls: Vec<String>,
    pub has_embeds: bool,
}

/// A resolved member, as far as authorization and ticket naming care.
#[derive(Clone, Debug)]
pub struct Member {
    pub id: UserId,
    pub display_name: String,
    pub roles: Vec<RoleId>,
    pub is_platform_admin: bool,
    pub is_bot: bool,
}

#[derive(Clone, Debug)]
pub struct RoleInfo {
    pub id: RoleId,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
}

/// Channel-management surface of the chat platform.
///
/// The first adapter is Discord-shaped, but nothing here names Discord;
/// platform-specific concepts stay in the adapter.
#[async_trait]
pub trait ChannelSurface: Send + Sync {
    /// Create a channel under `category`, visible only per `overwrites`.
    async fn create_restricted_channel(
        &self,
        category: ChannelId,
        name: &str,
        overwrites: &[(Principal, Visibility)],
    ) -> Result<ChannelId>;

    async fn set_visibility(
        &self,
        channel: ChannelId,
        principal: Principal,
        visibility: Visibility,
    ) -> Result<()>;

    async fn delete_channel(&self, channel: ChannelId) -> Result<()>;

    async fn post(&self, channel: ChannelId, notice: Notice) -> Result<()>;

    /// Post a notice with a file attached (archive delivery).
    async fn post_file(&self, channel: ChannelId, file: &Path, notice: Notice) -> Result<()>;

    /// Full history, oldest first, no artificial limit.
    async fn fetch_history(&self, channel: ChannelId) -> Result<Vec<ArchivedMessage>>;
}

/// Member/role lookup surface used for authorization and naming.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn resolve_member(&self, user: UserId) -> Result<Member>;
    async fn resolve_role(&self, role: RoleId) -> Result<Option<RoleInfo>>;
    async fn resolve_channel(&self, channel: ChannelId) -> Result<Option<ChannelInfo>>;
}
