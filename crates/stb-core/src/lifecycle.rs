use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    auth,
    config::{GlobalConfig, Settings},
    domain::{ChannelId, TicketAction, TicketRecord, TicketState, UserId},
    errors::Error,
    export::TempArchive,
    notify::AuditNotifier,
    ports::{ChannelSurface, Directory, Notice, Principal, Visibility},
    registry::TicketRegistry,
    store::ConfigHandle,
    Result,
};

/// A user-initiated lifecycle request, as delivered by the platform adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketIntent {
    Create { actor: UserId },
    Close { channel: ChannelId, actor: UserId },
    Reopen { channel: ChannelId, actor: UserId },
    Save { channel: ChannelId, actor: UserId },
    Delete { channel: ChannelId, actor: UserId },
}

/// The single user-visible outcome of one intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
}

impl Reply {
    pub(crate) fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Derive the deterministic channel name for a new ticket.
///
/// Spaces in the owner name become dashes and the name is capped at 20
/// characters, matching the platform's channel-name restrictions.
pub fn ticket_channel_name(number: u64, owner_name: &str) -> String {
    let safe: String = owner_name.replace(' ', "-").chars().take(20).collect();
    format!("ticket-{number}-{safe}")
}

/// The create/close/reopen/save/delete protocol.
///
/// Owns the registry and the audit sink; talks to the platform exclusively
/// through the `ChannelSurface` and `Directory` ports.
pub struct TicketLifecycle {
    settings: Settings,
    config: Arc<ConfigHandle>,
    registry: TicketRegistry,
    channels: Arc<dyn ChannelSurface>,
    directory: Arc<dyn Directory>,
    notifier: AuditNotifier,
    shutdown: CancellationToken,
}

impl TicketLifecycle {
    pub fn new(
        settings: Settings,
        config: Arc<ConfigHandle>,
        channels: Arc<dyn ChannelSurface>,
        directory: Arc<dyn Directory>,
        shutdown: CancellationToken,
    ) -> Self {
        let registry = TicketRegistry::new(config.clone());
        let notifier = AuditNotifier::new(config.clone(), channels.clone(), directory.clone());
        Self {
            settings,
            config,
            registry,
            channels,
            directory,
            notifier,
            shutdown,
        }
    }

    pub fn registry(&self) -> &TicketRegistry {
        &self.registry
    }

    /// Boundary for externally triggered operations: every internal error is
    /// converted into one user-visible outcome. Nothing escapes.
    pub async fn handle(&self, intent: TicketIntent) -> Reply {
        let result = match intent {
            TicketIntent::Create { actor } => self.create(actor).await,
            TicketIntent::Close { channel, actor } => self.close(channel, actor).await,
            TicketIntent::Reopen { channel, actor } => self.reopen(channel, actor).await,
            TicketIntent::Save { channel, actor } => self.save(channel, actor).await,
            TicketIntent::Delete { channel, actor } => self.delete(channel, actor).await,
        };
        result.unwrap_or_else(|err| {
            match &err {
                Error::ConfigurationMissing(_) | Error::NotATicket(_) | Error::PermissionDenied => {
                    tracing::info!(?intent, %err, "ticket operation rejected");
                }
                _ => tracing::error!(?intent, %err, "ticket operation failed"),
            }
            Reply::new(user_message(&err))
        })
    }

    /// Open a new ticket for `actor`.
    pub async fn create(&self, actor: UserId) -> Result<Reply> {
        let member = self
            .directory
            .resolve_member(actor)
            .await
            .map_err(|e| Error::Collaborator(format!("resolve creator: {e}")))?;
        if member.is_bot {
            return Err(Error::PermissionDenied);
        }

        let cfg = self.config.read().await?;
        let category = cfg
            .ticket_category_id
            .ok_or(Error::ConfigurationMissing("ticket category"))?;
        if self.directory.resolve_channel(category).await?.is_none() {
            return Err(Error::ConfigurationMissing("ticket category"));
        }

        let number = self.registry.next_ticket_number().await?;
        let name = ticket_channel_name(number, &member.display_name);

        let mut overwrites = vec![
            (Principal::Everyone, Visibility::HIDDEN),
            (Principal::User(actor), Visibility::READ_WRITE),
        ];
        for role in &cfg.admin_role_ids {
            overwrites.push((Principal::Role(*role), Visibility::READ_WRITE));
        }

        // The channel must exist before the record is registered.
        let channel = self
            .channels
            .create_restricted_channel(category, &name, &overwrites)
            .await?;

        if let Err(err) = self.registry.register(channel, actor, number).await {
            // Compensate: without a record the channel would be orphaned and
            // unreachable by every privileged operation.
            if let Err(del) = self.channels.delete_channel(channel).await {
                tracing::warn!(channel = channel.0, %del, "failed to delete orphaned channel");
            }
            return Err(err);
        }

        let notice = Notice::new(
            "Ticket created",
            "This is your support ticket. Staff will be with you shortly.",
        )
        .field("Ticket number", number.to_string());
        if let Err(err) = self.channels.post(channel, notice).await {
            tracing::warn!(channel = channel.0, %err, "failed to post creation notice");
        }

        self.notifier
            .notify(TicketAction::Created, actor, number, channel)
            .await;
        Ok(Reply::new(format!("Ticket {number} created.")))
    }

    /// Close an open ticket: revoke the owner's visibility (best-effort) and
    /// flip the record to Closed.
    pub async fn close(&self, channel: ChannelId, actor: UserId) -> Result<Reply> {
        let (record, _) = self.authorize(channel, actor).await?;

        self.set_owner_visibility(channel, record.owner_id, Visibility::HIDDEN)
            .await;
        let record = self.registry.set_state(channel, TicketState::Closed).await?;

        let notice = Notice::new(
            "Ticket closed",
            "This ticket has been closed. Staff can save, reopen or delete it.",
        )
        .field("Ticket number", record.number.to_string());
        if let Err(err) = self.channels.post(channel, notice).await {
            tracing::warn!(channel = channel.0, %err, "failed to post closed notice");
        }

        self.notifier
            .notify(TicketAction::Closed, record.owner_id, record.number, channel)
            .await;
        Ok(Reply::new("Ticket closed."))
    }

    /// Reopen a closed ticket: restore the owner's visibility (best-effort)
    /// and flip the record back to Open.
    pub async fn reopen(&self, channel: ChannelId, actor: UserId) -> Result<Reply> {
        let (record, _) = self.authorize(channel, actor).await?;

        self.set_owner_visibility(channel, record.owner_id, Visibility::READ_WRITE)
            .await;
        let record = self.registry.set_state(channel, TicketState::Open).await?;

        if let Err(err) = self
            .channels
            .post(channel, Notice::new("Ticket reopened", "This ticket has been reopened."))
            .await
        {
            tracing::warn!(channel = channel.0, %err, "failed to post reopened notice");
        }

        self.notifier
            .notify(TicketAction::Reopened, record.owner_id, record.number, channel)
            .await;
        Ok(Reply::new("Ticket reopened."))
    }

    /// Archive the full channel history and deliver it to the log channel.
    /// Ticket state is never altered; failures are reported to the invoker.
    pub async fn save(&self, channel: ChannelId, actor: UserId) -> Result<Reply> {
        let (record, cfg) = self.authorize(channel, actor).await?;

        self.export_and_deliver(channel, &record, &cfg, "Saved (HTML)")
            .await?;

        let notice = Notice::new(
            "Log saved",
            format!("The log for ticket {} has been saved and delivered.", record.number),
        );
        if let Err(err) = self.channels.post(channel, notice).await {
            tracing::warn!(channel = channel.0, %err, "failed to post save-complete notice");
        }

        self.notifier
            .notify(TicketAction::Saved, record.owner_id, record.number, channel)
            .await;
        Ok(Reply::new("Ticket log saved and delivered."))
    }

    /// Delete the ticket: archive best-effort, drop the record, then tear
    /// down the channel. The channel is deleted even when archival failed;
    /// losing the history in that path is accepted.
    pub async fn delete(&self, channel: ChannelId, actor: UserId) -> Result<Reply> {
        let (record, cfg) = self.authorize(channel, actor).await?;

        if let Err(err) = self
            .export_and_deliver(channel, &record, &cfg, "Deleted (Saved)")
            .await
        {
            tracing::warn!(channel = channel.0, %err, "archival before delete failed; continuing");
        }

        self.registry.remove(channel).await?;

        self.notifier
            .notify(TicketAction::Deleted, record.owner_id, record.number, channel)
            .await;

        self.channels.delete_channel(channel).await?;
        Ok(Reply::new("Ticket deleted."))
    }

    /// Common preamble of every privileged operation: check the acting user,
    /// then require a ticket record for the channel.
    async fn authorize(
        &self,
        channel: ChannelId,
        actor: UserId,
    ) -> Result<(TicketRecord, GlobalConfig)> {
        let cfg = self.config.read().await?;
        if !auth::check(self.directory.as_ref(), &cfg, actor).await {
            return Err(Error::PermissionDenied);
        }
        let record = self
            .registry
            .get(channel)
            .await?
            .ok_or(Error::NotATicket(channel))?;
        Ok((record, cfg))
    }

    async fn set_owner_visibility(
        &self,
        channel: ChannelId,
        owner: UserId,
        visibility: Visibility,
    ) {
        if let Err(err) = self
            .channels
            .set_visibility(channel, Principal::User(owner), visibility)
            .await
        {
            tracing::warn!(channel = channel.0, %err, "failed to change owner visibility");
        }
    }

    /// Fetch the full history, spool the archive and deliver it to the log
    /// channel if one is configured. The artifact is removed on every exit
    /// path by the `TempArchive` drop guard.
    ///
    /// The fetch is bounded by the export timeout and the shutdown token so a
    /// slow export never blocks other tickets' operations past shutdown.
    async fn export_and_deliver(
        &self,
        channel: ChannelId,
        record: &TicketRecord,
        cfg: &GlobalConfig,
        delivery_label: &str,
    ) -> Result<()> {
        let fetch = tokio::time::timeout(
            self.settings.export_timeout,
            self.channels.fetch_history(channel),
        );
        let history = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                return Err(Error::Collaborator("export cancelled by shutdown".into()));
            }
            res = fetch => {
                res.map_err(|_| Error::Collaborator("history fetch timed out".into()))??
            }
        };

        let channel_name = match self.directory.resolve_channel(channel).await {
            Ok(Some(info)) => info.name,
            _ => format!("channel-{}", channel.0),
        };

        let archive = TempArchive::write(&self.settings.spool_dir, &channel_name, &history)?;

        if let Some(log_channel) = cfg.log_channel_id {
            let notice = Notice::new(
                format!("Ticket Log - {delivery_label}"),
                format!("Archive of ticket {} ({channel_name}).", record.number),
            )
            .field("Owner", record.owner_id.0.to_string())
            .field("Channel", format!("{channel_name} ({})", channel.0));
            self.channels
                .post_file(log_channel, archive.path(), notice)
                .await?;
        }

        Ok(())
    }
}

fn user_message(err: &Error) -> String {
    match err {
        Error::ConfigurationMissing(what) => {
            format!("The {what} is not configured. Please contact an administrator.")
        }
        Error::NotATicket(_) => "This is not a ticket channel.".to_string(),
        Error::PermissionDenied => "You do not have permission to do that.".to_string(),
        Error::AlreadyExists(_) => {
            "This channel is already registered as a ticket.".to_string()
        }
        _ => "The ticket operation failed. Please try again or contact staff.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RoleId;
    use crate::ports::testing::{member, FakeChannels, FakeDirectory};
    use crate::ports::{ArchivedMessage, Member};
    use crate::store::MemoryStore;
    use chrono::Utc;
    use std::path::PathBuf;
    use std::time::Duration;

    const CATEGORY: ChannelId = ChannelId(500);
    const LOG: ChannelId = ChannelId(900);
    const ADMIN_ROLE: RoleId = RoleId(10);
    const STAFF: UserId = UserId(7);
    const ALICE: UserId = UserId(42);
    const BOB: UserId = UserId(43);

    fn spool_dir() -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = PathBuf::from(format!("/tmp/stb-lifecycle-{}-{ts}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn staff_member() -> Member {
        Member {
            roles: vec![ADMIN_ROLE],
            ..member(STAFF, "staff")
        }
    }

    struct Fixture {
        lifecycle: TicketLifecycle,
        channels: Arc<FakeChannels>,
        directory: Arc<FakeDirectory>,
        config: Arc<ConfigHandle>,
    }

    async fn fixture(directory: FakeDirectory) -> Fixture {
        let config = Arc::new(ConfigHandle::new(Box::<MemoryStore>::default()));
        config
            .update(|cfg| {
                cfg.ticket_category_id = Some(CATEGORY);
                cfg.log_channel_id = Some(LOG);
                cfg.admin_role_ids.insert(ADMIN_ROLE);
                Ok(())
            })
            .await
            .unwrap();

        let channels = Arc::new(FakeChannels::default());
        let settings = Settings {
            spool_dir: spool_dir(),
            export_timeout: Duration::from_secs(5),
        };
        let directory = Arc::new(
            directory
                .with_channel(CATEGORY, "support")
                .with_channel(LOG, "ticket-log"),
        );
        let lifecycle = TicketLifecycle::new(
            settings,
            config.clone(),
            channels.clone(),
            directory.clone(),
            CancellationToken::new(),
        );
        Fixture {
            lifecycle,
            channels,
            directory,
            config,
        }
    }

    fn directory_with_users() -> FakeDirectory {
        FakeDirectory::default()
            .with_member(member(ALICE, "alice"))
            .with_member(member(BOB, "bob the builder"))
            .with_member(staff_member())
    }

    #[test]
    fn channel_name_is_sanitized_and_truncated() {
        assert_eq!(ticket_channel_name(3, "alice"), "ticket-3-alice");
        assert_eq!(
            ticket_channel_name(1, "a very long user name indeed"),
            "ticket-1-a-very-long-user-nam"
        );
    }

    #[tokio::test]
    async fn create_without_category_is_rejected() {
        let fx = fixture(directory_with_users()).await;
        fx.config
            .update(|cfg| {
                cfg.ticket_category_id = None;
                Ok(())
            })
            .await
            .unwrap();

        let reply = fx.lifecycle.handle(TicketIntent::Create { actor: ALICE }).await;
        assert!(reply.text.contains("not configured"));
        assert!(fx.channels.created().is_empty());
        assert_eq!(fx.config.read().await.unwrap().ticket_count, 0);
    }

    #[tokio::test]
    async fn create_builds_restricted_channel_and_open_record() {
        let fx = fixture(directory_with_users()).await;
        let reply = fx.lifecycle.create(ALICE).await.unwrap();
        assert_eq!(reply.text, "Ticket 1 created.");

        let created = fx.channels.created();
        assert_eq!(created.len(), 1);
        let (channel, name, overwrites) = &created[0];
        assert_eq!(name, "ticket-1-alice");
        assert!(overwrites.contains(&(Principal::Everyone, Visibility::HIDDEN)));
        assert!(overwrites.contains(&(Principal::User(ALICE), Visibility::READ_WRITE)));
        assert!(overwrites.contains(&(Principal::Role(ADMIN_ROLE), Visibility::READ_WRITE)));

        let record = fx.lifecycle.registry().get(*channel).await.unwrap().unwrap();
        assert_eq!(record.owner_id, ALICE);
        assert_eq!(record.number, 1);
        assert_eq!(record.state, TicketState::Open);

        // Creation notice in the ticket channel plus the audit notification.
        let posts = fx.channels.posts();
        assert!(posts.iter().any(|(c, n)| c == channel && n.title == "Ticket created"));
        assert!(posts
            .iter()
            .any(|(c, n)| *c == LOG && n.title.contains("Ticket Created")));
    }

    #[tokio::test]
    async fn create_assigns_sequential_numbers() {
        let fx = fixture(directory_with_users()).await;
        fx.lifecycle.create(ALICE).await.unwrap();
        let reply = fx.lifecycle.create(BOB).await.unwrap();
        assert_eq!(reply.text, "Ticket 2 created.");

        let created = fx.channels.created();
        assert_eq!(created[1].1, "ticket-2-bob-the-builder");
        let record = fx
            .lifecycle
            .registry()
            .get(created[1].0)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.number, 2);
        assert_eq!(record.owner_id, BOB);
    }

    #[tokio::test]
    async fn create_cleans_up_channel_when_registration_fails() {
        let fx = fixture(directory_with_users()).await;
        // Occupy the channel id the fake will hand out next, so registration
        // hits AlreadyExists after the channel exists.
        fx.lifecycle
            .registry()
            .register(ChannelId(1000), BOB, 99)
            .await
            .unwrap();

        let reply = fx.lifecycle.handle(TicketIntent::Create { actor: ALICE }).await;
        assert!(reply.text.contains("already registered"));
        assert_eq!(fx.channels.deleted(), vec![ChannelId(1000)]);
        // Bob's pre-existing record is untouched.
        let record = fx
            .lifecycle
            .registry()
            .get(ChannelId(1000))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.owner_id, BOB);
    }

    #[tokio::test]
    async fn bot_users_cannot_create() {
        let bot = Member {
            is_bot: true,
            ..member(UserId(666), "helper-bot")
        };
        let fx = fixture(directory_with_users().with_member(bot)).await;
        let reply = fx
            .lifecycle
            .handle(TicketIntent::Create { actor: UserId(666) })
            .await;
        assert!(reply.text.contains("not have permission"));
        assert!(fx.channels.created().is_empty());
    }

    async fn created_ticket(fx: &Fixture, owner: UserId) -> ChannelId {
        fx.lifecycle.create(owner).await.unwrap();
        let (channel, name, _) = fx.channels.created().last().unwrap().clone();
        // The platform would index the new channel; mirror that in the fake.
        fx.directory.add_channel(channel, &name);
        channel
    }

    #[tokio::test]
    async fn close_requires_privilege() {
        let fx = fixture(directory_with_users()).await;
        let channel = created_ticket(&fx, ALICE).await;

        let reply = fx
            .lifecycle
            .handle(TicketIntent::Close { channel, actor: ALICE })
            .await;
        assert!(reply.text.contains("not have permission"));
        let record = fx.lifecycle.registry().get(channel).await.unwrap().unwrap();
        assert_eq!(record.state, TicketState::Open);
    }

    #[tokio::test]
    async fn close_hides_owner_and_transitions_state() {
        let fx = fixture(directory_with_users()).await;
        let channel = created_ticket(&fx, ALICE).await;

        let reply = fx.lifecycle.close(channel, STAFF).await.unwrap();
        assert_eq!(reply.text, "Ticket closed.");

        let record = fx.lifecycle.registry().get(channel).await.unwrap().unwrap();
        assert_eq!(record.state, TicketState::Closed);
        assert!(fx
            .channels
            .visibility_changes()
            .contains(&(channel, Principal::User(ALICE), Visibility::HIDDEN)));
        assert!(fx
            .channels
            .posts()
            .iter()
            .any(|(c, n)| *c == LOG && n.title.contains("Ticket Closed")));
    }

    #[tokio::test]
    async fn close_survives_visibility_failure() {
        let fx = fixture(directory_with_users()).await;
        let channel = created_ticket(&fx, ALICE).await;
        fx.channels.fail_visibility();

        fx.lifecycle.close(channel, STAFF).await.unwrap();
        let record = fx.lifecycle.registry().get(channel).await.unwrap().unwrap();
        assert_eq!(record.state, TicketState::Closed);
    }

    #[tokio::test]
    async fn operations_on_non_ticket_channels_are_rejected() {
        let fx = fixture(directory_with_users()).await;
        for intent in [
            TicketIntent::Close { channel: ChannelId(12345), actor: STAFF },
            TicketIntent::Reopen { channel: ChannelId(12345), actor: STAFF },
            TicketIntent::Save { channel: ChannelId(12345), actor: STAFF },
            TicketIntent::Delete { channel: ChannelId(12345), actor: STAFF },
        ] {
            let reply = fx.lifecycle.handle(intent).await;
            assert_eq!(reply.text, "This is not a ticket channel.");
        }
    }

    #[tokio::test]
    async fn reopen_restores_owner_visibility() {
        let fx = fixture(directory_with_users()).await;
        let channel = created_ticket(&fx, ALICE).await;
        fx.lifecycle.close(channel, STAFF).await.unwrap();

        let reply = fx.lifecycle.reopen(channel, STAFF).await.unwrap();
        assert_eq!(reply.text, "Ticket reopened.");

        let record = fx.lifecycle.registry().get(channel).await.unwrap().unwrap();
        assert_eq!(record.state, TicketState::Open);
        assert!(fx
            .channels
            .visibility_changes()
            .contains(&(channel, Principal::User(ALICE), Visibility::READ_WRITE)));
    }

    #[tokio::test]
    async fn save_delivers_archive_and_removes_artifact() {
        let fx = fixture(directory_with_users()).await;
        let channel = created_ticket(&fx, ALICE).await;
        fx.channels.seed_history(
            channel,
            vec![ArchivedMessage {
                sent_at: Utc::now(),
                author_name: "alice".into(),
                author_id: ALICE,
                content: "my app is broken".into(),
                attachment_urls: Vec::new(),
                has_embeds: false,
            }],
        );

        let reply = fx.lifecycle.save(channel, STAFF).await.unwrap();
        assert_eq!(reply.text, "Ticket log saved and delivered.");

        let files = fx.channels.files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, LOG);
        assert!(files[0].1.to_string_lossy().contains("ticket-1-alice"));
        // The spooled artifact is gone after the operation.
        assert!(!files[0].1.exists());

        // Save-complete notice in the ticket channel; state untouched.
        assert!(fx
            .channels
            .posts()
            .iter()
            .any(|(c, n)| *c == channel && n.title == "Log saved"));
        let record = fx.lifecycle.registry().get(channel).await.unwrap().unwrap();
        assert_eq!(record.state, TicketState::Open);
    }

    #[tokio::test]
    async fn save_with_empty_history_produces_header_only_archive() {
        let fx = fixture(directory_with_users()).await;
        let channel = created_ticket(&fx, ALICE).await;

        fx.lifecycle.save(channel, STAFF).await.unwrap();
        let files = fx.channels.files();
        assert_eq!(files.len(), 1);
        assert!(!files[0].1.exists());
    }

    #[tokio::test]
    async fn save_failure_reports_and_keeps_state() {
        let fx = fixture(directory_with_users()).await;
        let channel = created_ticket(&fx, ALICE).await;
        fx.channels.fail_history();

        let reply = fx
            .lifecycle
            .handle(TicketIntent::Save { channel, actor: STAFF })
            .await;
        assert!(reply.text.contains("failed"));
        assert!(fx.channels.files().is_empty());
        let record = fx.lifecycle.registry().get(channel).await.unwrap().unwrap();
        assert_eq!(record.state, TicketState::Open);
    }

    #[tokio::test]
    async fn save_delivery_failure_still_cleans_artifact() {
        let fx = fixture(directory_with_users()).await;
        let channel = created_ticket(&fx, ALICE).await;
        fx.channels.fail_posts();

        let reply = fx
            .lifecycle
            .handle(TicketIntent::Save { channel, actor: STAFF })
            .await;
        assert!(reply.text.contains("failed"));

        // The artifact is removed even though delivery failed.
        let leftovers: Vec<_> = std::fs::read_dir(&fx.lifecycle.settings.spool_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert!(leftovers.is_empty(), "no spooled artifact may remain");
        let record = fx.lifecycle.registry().get(channel).await.unwrap().unwrap();
        assert_eq!(record.state, TicketState::Open);
    }

    #[tokio::test]
    async fn delete_removes_record_and_channel() {
        let fx = fixture(directory_with_users()).await;
        let channel = created_ticket(&fx, ALICE).await;

        let reply = fx.lifecycle.delete(channel, STAFF).await.unwrap();
        assert_eq!(reply.text, "Ticket deleted.");

        assert!(fx.lifecycle.registry().get(channel).await.unwrap().is_none());
        assert!(fx.channels.deleted().contains(&channel));
        // Archive was delivered before teardown.
        assert_eq!(fx.channels.files().len(), 1);
    }

    #[tokio::test]
    async fn delete_proceeds_when_archival_fails() {
        let fx = fixture(directory_with_users()).await;
        let channel = created_ticket(&fx, ALICE).await;
        fx.channels.fail_history();

        let reply = fx.lifecycle.delete(channel, STAFF).await.unwrap();
        assert_eq!(reply.text, "Ticket deleted.");
        assert!(fx.lifecycle.registry().get(channel).await.unwrap().is_none());
        assert!(fx.channels.deleted().contains(&channel));
        assert!(fx.channels.files().is_empty());
    }

    #[tokio::test]
    async fn delete_notification_carries_ticket_number() {
        let fx = fixture(directory_with_users()).await;
        fx.lifecycle.create(ALICE).await.unwrap();
        let second = created_ticket(&fx, BOB).await;

        fx.lifecycle.delete(second, STAFF).await.unwrap();
        let posts = fx.channels.posts();
        let audit = posts
            .iter()
            .find(|(c, n)| *c == LOG && n.title.contains("Ticket Deleted"))
            .expect("deletion audit notice");
        assert!(audit.1.body.contains("ticket 2"));
    }

    #[tokio::test]
    async fn export_honors_shutdown_token() {
        let fx = fixture(directory_with_users()).await;
        let channel = created_ticket(&fx, ALICE).await;

        fx.lifecycle.shutdown.cancel();
        let err = fx.lifecycle.save(channel, STAFF).await.unwrap_err();
        assert!(matches!(err, Error::Collaborator(_)));
    }
}
