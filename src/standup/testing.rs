//! In-memory doubles for the record store and form gateway.

use crate::database::models::{
    BotConfig, BotConfigPatch, CheckInRecord, NewCheckIn, NewStandup, ProjectChannelMapping,
    StandupRecord,
};
use crate::database::store::{RecordStore, StoreError};
use crate::standup::gateway::{FormGateway, FormHandle, FormView, GatewayError};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

#[derive(Default)]
pub struct MemoryRecordStore {
    next_id: AtomicI64,
    standups: Mutex<Vec<StandupRecord>>,
    check_ins: Mutex<Vec<CheckInRecord>>,
    channels: Mutex<Vec<ProjectChannelMapping>>,
    config: Mutex<Option<BotConfig>>,
    fail_appends: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BotConfig) -> Self {
        let store = Self::new();
        *store.config.lock().unwrap() = Some(config);
        store
    }

    /// Makes every append fail as if the database were unreachable.
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub fn standups(&self) -> Vec<StandupRecord> {
        self.standups.lock().unwrap().clone()
    }

    pub fn check_ins(&self) -> Vec<CheckInRecord> {
        self.check_ins.lock().unwrap().clone()
    }

    pub fn map_channel(&self, project: &str, channel_id: &str, channel_name: &str) {
        let mut channels = self.channels.lock().unwrap();
        channels.retain(|m| m.project != project);
        channels.push(ProjectChannelMapping {
            id: self.next_id(),
            project: project.to_string(),
            channel_id: channel_id.to_string(),
            channel_name: channel_name.to_string(),
            active: true,
        });
    }

    pub fn unmap_channel(&self, project: &str) {
        for mapping in self.channels.lock().unwrap().iter_mut() {
            if mapping.project == project {
                mapping.active = false;
            }
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn append_standup(&self, standup: NewStandup) -> Result<StandupRecord, StoreError> {
        self.check_available()?;
        let record = StandupRecord {
            id: self.next_id(),
            user_id: standup.user_id,
            display_name: standup.display_name,
            feeling: standup.feeling,
            yesterday: standup.yesterday,
            today: standup.today,
            blockers: standup.blockers,
            date: standup.date,
            created_at: Utc::now(),
        };
        self.standups.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn has_standup_on(&self, user_id: &str, date: NaiveDate) -> Result<bool, StoreError> {
        Ok(self
            .standups
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.user_id == user_id && s.date == date))
    }

    async fn append_check_in(&self, entry: NewCheckIn) -> Result<CheckInRecord, StoreError> {
        self.check_available()?;
        let record = CheckInRecord {
            id: self.next_id(),
            user_id: entry.user_id,
            display_name: entry.display_name,
            contact: entry.contact,
            kind: entry.kind,
            standup_id: entry.standup_id,
            created_at: Utc::now(),
        };
        self.check_ins.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn latest_check_in(&self, user_id: &str) -> Result<Option<CheckInRecord>, StoreError> {
        Ok(self
            .check_ins
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    async fn active_channel_for(
        &self,
        project: &str,
    ) -> Result<Option<ProjectChannelMapping>, StoreError> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.active && m.project.eq_ignore_ascii_case(project))
            .cloned())
    }

    async fn upsert_channel_mapping(
        &self,
        project: &str,
        channel_id: &str,
        channel_name: &str,
    ) -> Result<(), StoreError> {
        self.map_channel(project, channel_id, channel_name);
        Ok(())
    }

    async fn deactivate_channel_mapping(&self, project: &str) -> Result<bool, StoreError> {
        let mut channels = self.channels.lock().unwrap();
        let mut changed = false;
        for mapping in channels.iter_mut() {
            if mapping.active && mapping.project.eq_ignore_ascii_case(project) {
                mapping.active = false;
                changed = true;
            }
        }
        Ok(changed)
    }

    async fn channel_mappings(&self) -> Result<Vec<ProjectChannelMapping>, StoreError> {
        Ok(self.channels.lock().unwrap().clone())
    }

    async fn bot_config(&self) -> Result<Option<BotConfig>, StoreError> {
        Ok(self.config.lock().unwrap().clone())
    }

    async fn update_bot_config(&self, patch: BotConfigPatch) -> Result<BotConfig, StoreError> {
        let mut config = self.config.lock().unwrap();
        let merged = patch.merge_into(config.clone().unwrap_or_default());
        *config = Some(merged.clone());
        Ok(merged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    Open(FormView),
    Update(FormView),
    Error(String),
    Post { channel_id: String, content: String },
}

/// Records everything the orchestrator asks the platform to show.
#[derive(Default)]
pub struct RecordingGateway {
    events: Mutex<Vec<GatewayEvent>>,
    failing_channels: Mutex<HashSet<String>>,
    fail_forms: AtomicBool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_channel(&self, channel_id: &str) {
        self.failing_channels.lock().unwrap().insert(channel_id.to_string());
    }

    /// Makes form rendering fail, as with an expired interaction.
    pub fn set_fail_forms(&self, fail: bool) {
        self.fail_forms.store(fail, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<GatewayEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                GatewayEvent::Post { channel_id, content } => Some((channel_id, content)),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                GatewayEvent::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    /// The most recently opened or updated form.
    pub fn last_view(&self) -> Option<FormView> {
        self.events().into_iter().rev().find_map(|e| match e {
            GatewayEvent::Open(view) | GatewayEvent::Update(view) => Some(view),
            _ => None,
        })
    }

    fn record_form(&self, event: GatewayEvent) -> Result<(), GatewayError> {
        if self.fail_forms.load(Ordering::SeqCst) {
            return Err(GatewayError::Platform("interaction expired".to_string()));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[async_trait]
impl FormGateway for RecordingGateway {
    async fn open(&self, _handle: &FormHandle, view: &FormView) -> Result<(), GatewayError> {
        self.record_form(GatewayEvent::Open(view.clone()))
    }

    async fn update(&self, _handle: &FormHandle, view: &FormView) -> Result<(), GatewayError> {
        self.record_form(GatewayEvent::Update(view.clone()))
    }

    async fn report_error(&self, _handle: &FormHandle, message: &str) -> Result<(), GatewayError> {
        self.record_form(GatewayEvent::Error(message.to_string()))
    }

    async fn post_message(&self, channel_id: &str, content: &str) -> Result<(), GatewayError> {
        if self.failing_channels.lock().unwrap().contains(channel_id) {
            return Err(GatewayError::Platform(format!("cannot post to {}", channel_id)));
        }
        self.events.lock().unwrap().push(GatewayEvent::Post {
            channel_id: channel_id.to_string(),
            content: content.to_string(),
        });
        Ok(())
    }
}
