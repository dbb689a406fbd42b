//! Record store seam between the standup/attendance logic and persistence.

use crate::database::models::{
    BotConfig, BotConfigPatch, CheckInRecord, NewCheckIn, NewStandup, ProjectChannelMapping,
    StandupRecord,
};
use crate::database::queries;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store error: {0}")]
    Backend(#[from] anyhow::Error),

    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Durable storage for standups, check-ins, channel routing and bot configuration.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn append_standup(&self, standup: NewStandup) -> Result<StandupRecord, StoreError>;

    /// Whether `user_id` already submitted a standup for the civil `date`.
    async fn has_standup_on(&self, user_id: &str, date: NaiveDate) -> Result<bool, StoreError>;

    async fn append_check_in(&self, entry: NewCheckIn) -> Result<CheckInRecord, StoreError>;

    async fn latest_check_in(&self, user_id: &str) -> Result<Option<CheckInRecord>, StoreError>;

    async fn active_channel_for(
        &self,
        project: &str,
    ) -> Result<Option<ProjectChannelMapping>, StoreError>;

    async fn upsert_channel_mapping(
        &self,
        project: &str,
        channel_id: &str,
        channel_name: &str,
    ) -> Result<(), StoreError>;

    /// Returns false when no active mapping existed.
    async fn deactivate_channel_mapping(&self, project: &str) -> Result<bool, StoreError>;

    async fn channel_mappings(&self) -> Result<Vec<ProjectChannelMapping>, StoreError>;

    async fn bot_config(&self) -> Result<Option<BotConfig>, StoreError>;

    /// Merges `patch` into the stored (or default) config and returns the result.
    async fn update_bot_config(&self, patch: BotConfigPatch) -> Result<BotConfig, StoreError>;
}

/// Reads the bot configuration, falling back to the built-in defaults.
pub async fn load_bot_config(store: &dyn RecordStore) -> BotConfig {
    match store.bot_config().await {
        Ok(Some(config)) => config,
        Ok(None) => BotConfig::default(),
        Err(e) => {
            tracing::warn!("Failed to read bot config, using defaults: {}", e);
            BotConfig::default()
        }
    }
}

#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn append_standup(&self, standup: NewStandup) -> Result<StandupRecord, StoreError> {
        Ok(queries::create_standup(&self.pool, &standup).await?)
    }

    async fn has_standup_on(&self, user_id: &str, date: NaiveDate) -> Result<bool, StoreError> {
        Ok(queries::standup_exists_for_date(&self.pool, user_id, date).await?)
    }

    async fn append_check_in(&self, entry: NewCheckIn) -> Result<CheckInRecord, StoreError> {
        Ok(queries::create_check_in(&self.pool, &entry).await?)
    }

    async fn latest_check_in(&self, user_id: &str) -> Result<Option<CheckInRecord>, StoreError> {
        Ok(queries::get_latest_check_in(&self.pool, user_id).await?)
    }

    async fn active_channel_for(
        &self,
        project: &str,
    ) -> Result<Option<ProjectChannelMapping>, StoreError> {
        Ok(queries::get_active_channel(&self.pool, project).await?)
    }

    async fn upsert_channel_mapping(
        &self,
        project: &str,
        channel_id: &str,
        channel_name: &str,
    ) -> Result<(), StoreError> {
        Ok(queries::upsert_channel_mapping(&self.pool, project, channel_id, channel_name).await?)
    }

    async fn deactivate_channel_mapping(&self, project: &str) -> Result<bool, StoreError> {
        Ok(queries::deactivate_channel_mapping(&self.pool, project).await?)
    }

    async fn channel_mappings(&self) -> Result<Vec<ProjectChannelMapping>, StoreError> {
        Ok(queries::get_channel_mappings(&self.pool).await?)
    }

    async fn bot_config(&self) -> Result<Option<BotConfig>, StoreError> {
        Ok(queries::get_bot_config(&self.pool).await?)
    }

    async fn update_bot_config(&self, patch: BotConfigPatch) -> Result<BotConfig, StoreError> {
        let current = queries::get_bot_config(&self.pool).await?.unwrap_or_default();
        let merged = patch.merge_into(current);
        queries::save_bot_config(&self.pool, &merged).await?;
        Ok(merged)
    }
}
