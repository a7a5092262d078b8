use std::sync::Arc;

use crate::{
    auth,
    domain::{ChannelId, RoleId, UserId},
    errors::Error,
    lifecycle::Reply,
    ports::Directory,
    store::ConfigHandle,
    Result,
};

/// Administrative settings surface exposed to the platform adapter.
///
/// Every command is gated by the same privilege check as the lifecycle
/// operations. The operator console in the `stb` binary bypasses this and
/// edits the document directly; platform actors never do.
pub struct AdminSurface {
    config: Arc<ConfigHandle>,
    directory: Arc<dyn Directory>,
}

impl AdminSurface {
    pub fn new(config: Arc<ConfigHandle>, directory: Arc<dyn Directory>) -> Self {
        Self { config, directory }
    }

    pub async fn set_ticket_category(&self, actor: UserId, category: ChannelId) -> Result<Reply> {
        self.ensure_privileged(actor).await?;
        let name = self.channel_label(category).await;
        self.config
            .update(|cfg| {
                cfg.ticket_category_id = Some(category);
                Ok(())
            })
            .await?;
        Ok(Reply::new(format!("Ticket category set to {name}.")))
    }

    pub async fn set_log_channel(&self, actor: UserId, channel: ChannelId) -> Result<Reply> {
        self.ensure_privileged(actor).await?;
        let name = self.channel_label(channel).await;
        self.config
            .update(|cfg| {
                cfg.log_channel_id = Some(channel);
                Ok(())
            })
            .await?;
        Ok(Reply::new(format!("Ticket logs will be sent to {name}.")))
    }

    pub async fn set_verify_role(&self, actor: UserId, role: RoleId) -> Result<Reply> {
        self.ensure_privileged(actor).await?;
        self.config
            .update(|cfg| {
                cfg.verify_role_id = Some(role);
                Ok(())
            })
            .await?;
        Ok(Reply::new("Verification role updated."))
    }

    pub async fn add_admin_role(&self, actor: UserId, role: RoleId) -> Result<Reply> {
        self.ensure_privileged(actor).await?;
        let added = self
            .config
            .update(|cfg| Ok(cfg.admin_role_ids.insert(role)))
            .await?;
        if added {
            Ok(Reply::new("Role added to the admin roles."))
        } else {
            Ok(Reply::new("That role is already an admin role."))
        }
    }

    pub async fn remove_admin_role(&self, actor: UserId, role: RoleId) -> Result<Reply> {
        self.ensure_privileged(actor).await?;
        let removed = self
            .config
            .update(|cfg| Ok(cfg.admin_role_ids.remove(&role)))
            .await?;
        if removed {
            Ok(Reply::new("Role removed from the admin roles."))
        } else {
            Ok(Reply::new("That role is not an admin role."))
        }
    }

    pub async fn list_admin_roles(&self, actor: UserId) -> Result<Reply> {
        self.ensure_privileged(actor).await?;
        let roles = self.config.read().await?.admin_role_ids;
        if roles.is_empty() {
            return Ok(Reply::new(
                "No admin roles configured. Users with server management permissions \
                 can still manage tickets.",
            ));
        }
        let mut labels = Vec::new();
        for role in roles {
            match self.directory.resolve_role(role).await {
                Ok(Some(info)) => labels.push(info.name),
                _ => labels.push(format!("(ID:{})", role.0)),
            }
        }
        Ok(Reply::new(format!("Admin roles: {}", labels.join(", "))))
    }

    pub async fn add_whitelist_user(&self, actor: UserId, user: UserId) -> Result<Reply> {
        self.ensure_privileged(actor).await?;
        let added = self
            .config
            .update(|cfg| Ok(cfg.whitelist_user_ids.insert(user)))
            .await?;
        if added {
            Ok(Reply::new("User added to the whitelist."))
        } else {
            Ok(Reply::new("That user is already whitelisted."))
        }
    }

    pub async fn remove_whitelist_user(&self, actor: UserId, user: UserId) -> Result<Reply> {
        self.ensure_privileged(actor).await?;
        let removed = self
            .config
            .update(|cfg| Ok(cfg.whitelist_user_ids.remove(&user)))
            .await?;
        if removed {
            Ok(Reply::new("User removed from the whitelist."))
        } else {
            Ok(Reply::new("That user is not on the whitelist."))
        }
    }

    async fn ensure_privileged(&self, actor: UserId) -> Result<()> {
        let cfg = self.config.read().await?;
        if auth::check(self.directory.as_ref(), &cfg, actor).await {
            Ok(())
        } else {
            Err(Error::PermissionDenied)
        }
    }

    async fn channel_label(&self, channel: ChannelId) -> String {
        match self.directory.resolve_channel(channel).await {
            Ok(Some(info)) => format!("#{}", info.name),
            _ => format!("channel {}", channel.0),
        }
    }
}
