use std::sync::Arc;

use crate::{
    domain::{ChannelId, TicketAction, UserId},
    ports::{ChannelSurface, Directory, Notice},
    store::ConfigHandle,
};

/// Best-effort audit notifications to the configured log channel.
///
/// Silent no-op when no log channel is configured or it cannot be resolved.
/// Failures are logged and swallowed; an audit miss must never fail or block
/// the lifecycle operation that triggered it.
pub struct AuditNotifier {
    config: Arc<ConfigHandle>,
    channels: Arc<dyn ChannelSurface>,
    directory: Arc<dyn Directory>,
}

impl AuditNotifier {
    pub fn new(
        config: Arc<ConfigHandle>,
        channels: Arc<dyn ChannelSurface>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            config,
            channels,
            directory,
        }
    }

    pub async fn notify(&self, action: TicketAction, actor: UserId, number: u64, source: ChannelId) {
        if let Err(err) = self.try_notify(action, actor, number, source).await {
            tracing::warn!(action = action.as_str(), %err, "audit notification failed");
        }
    }

    async fn try_notify(
        &self,
        action: TicketAction,
        actor: UserId,
        number: u64,
        source: ChannelId,
    ) -> crate::Result<()> {
        let Some(log_channel) = self.config.read().await?.log_channel_id else {
            return Ok(());
        };
        if self.directory.resolve_channel(log_channel).await?.is_none() {
            return Ok(());
        }

        let actor_label = match self.directory.resolve_member(actor).await {
            Ok(member) => format!("{} ({})", member.display_name, actor.0),
            Err(_) => format!("({})", actor.0),
        };
        let channel_label = match self.directory.resolve_channel(source).await {
            Ok(Some(info)) => format!("{} ({})", info.name, source.0),
            _ => format!("({})", source.0),
        };

        let notice = Notice::new(
            format!("Ticket Log - {}", action.as_str()),
            format!("`{}` was executed on ticket {number}.", action.as_str()),
        )
        .field("User", actor_label)
        .field("Channel", channel_label);

        self.channels.post(log_channel, notice).await
    }
}
