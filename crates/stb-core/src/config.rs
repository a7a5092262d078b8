use std::{env, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{ChannelId, RoleId, TicketRecord, UserId};

/// The persisted configuration document — one per deployment.
///
/// Wire layout is fixed (see `store`): `tickets` is keyed by stringified
/// channel id, states serialize as "open"/"closed", timestamps as RFC3339.
/// `ticket_count` is the monotone ticket counter; its key name is part of the
/// on-disk format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub log_channel_id: Option<ChannelId>,
    pub ticket_count: u64,
    pub tickets: BTreeMap<ChannelId, TicketRecord>,
    pub verify_role_id: Option<RoleId>,
    pub ticket_category_id: Option<ChannelId>,
    pub admin_role_ids: BTreeSet<RoleId>,
    pub whitelist_user_ids: BTreeSet<UserId>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_channel_id: None,
            ticket_count: 0,
            tickets: BTreeMap::new(),
            verify_role_id: None,
            ticket_category_id: None,
            admin_role_ids: BTreeSet::new(),
            whitelist_user_ids: BTreeSet::new(),
        }
    }
}

/// Process-level runtime settings, loaded from the environment. The path of
/// the persisted document itself is the adapter/binary's concern.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Directory where archive artifacts are spooled before delivery.
    pub spool_dir: PathBuf,
    /// Upper bound on a single history fetch + archive render.
    pub export_timeout: Duration,
}

impl Settings {
    pub fn load() -> crate::Result<Self> {
        let spool_dir =
            PathBuf::from(env_str("STB_SPOOL_DIR").unwrap_or_else(|| "/tmp/stb-archives".to_string()));
        let export_timeout =
            Duration::from_millis(env_u64("STB_EXPORT_TIMEOUT_MS").unwrap_or(120_000));

        std::fs::create_dir_all(&spool_dir)?;

        Ok(Self {
            spool_dir,
            export_timeout,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key)?.parse().ok()
}
