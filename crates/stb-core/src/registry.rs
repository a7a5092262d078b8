use std::sync::Arc;

use chrono::Utc;

use crate::{
    domain::{ChannelId, TicketRecord, TicketState, UserId},
    errors::Error,
    store::ConfigHandle,
    Result,
};

/// Channel → ticket record mapping, backed by the shared config document.
///
/// The registry is the sole mutator of `tickets` and `ticket_count`; every
/// method is one locked read-modify-write cycle on the document.
pub struct TicketRegistry {
    config: Arc<ConfigHandle>,
}

impl TicketRegistry {
    pub fn new(config: Arc<ConfigHandle>) -> Self {
        Self { config }
    }

    /// Mint the next ticket number. The increment and the persist happen
    /// under the document lock, so concurrent creates can never share a
    /// number. This is the only minting path.
    pub async fn next_ticket_number(&self) -> Result<u64> {
        self.config
            .update(|cfg| {
                cfg.ticket_count += 1;
                Ok(cfg.ticket_count)
            })
            .await
    }

    /// Insert a fresh Open record for `channel`.
    pub async fn register(
        &self,
        channel: ChannelId,
        owner: UserId,
        number: u64,
    ) -> Result<TicketRecord> {
        self.config
            .update(|cfg| {
                if cfg.tickets.contains_key(&channel) {
                    return Err(Error::AlreadyExists(channel));
                }
                let record = TicketRecord {
                    owner_id: owner,
                    number,
                    state: TicketState::Open,
                    created_at: Utc::now(),
                };
                cfg.tickets.insert(channel, record.clone());
                Ok(record)
            })
            .await
    }

    pub async fn get(&self, channel: ChannelId) -> Result<Option<TicketRecord>> {
        Ok(self.config.read().await?.tickets.get(&channel).cloned())
    }

    /// Transition the record's state. Setting the current state again is a
    /// no-op that still persists successfully.
    pub async fn set_state(&self, channel: ChannelId, state: TicketState) -> Result<TicketRecord> {
        self.config
            .update(|cfg| {
                let record = cfg
                    .tickets
                    .get_mut(&channel)
                    .ok_or(Error::NotATicket(channel))?;
                record.state = state;
                Ok(record.clone())
            })
            .await
    }

    /// Remove the record. Idempotent: removing an absent record is fine.
    pub async fn remove(&self, channel: ChannelId) -> Result<()> {
        self.config
            .update(|cfg| {
                cfg.tickets.remove(&channel);
                Ok(())
            })
            .await
    }
}
