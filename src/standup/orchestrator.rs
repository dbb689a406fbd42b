//! Drives one user at a time through the standup forms:
//! feeling → yesterday → today → blockers, then saves and distributes.

use crate::database::models::{BotConfig, CheckInKind, NewCheckIn, NewStandup, StandupRecord};
use crate::database::store::{RecordStore, load_bot_config};
use crate::standup::distribution::Distributor;
use crate::standup::error::FlowError;
use crate::standup::flow::{FlowOrigin, FlowStateStore, FlowStep, StandupSession, TaskList};
use crate::standup::gateway::{FormGateway, FormHandle, FormView};
use crate::utils::time::current_date_in;
use crate::utils::validation::{TaskForm, ValidationError, build_task_entry, validate_feeling};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub struct StandupOrchestrator {
    sessions: Arc<dyn FlowStateStore>,
    store: Arc<dyn RecordStore>,
    gateway: Arc<dyn FormGateway>,
    distributor: Distributor,
}

impl StandupOrchestrator {
    pub fn new(
        sessions: Arc<dyn FlowStateStore>,
        store: Arc<dyn RecordStore>,
        gateway: Arc<dyn FormGateway>,
    ) -> Self {
        let distributor = Distributor::new(store.clone(), gateway.clone());
        Self {
            sessions,
            store,
            gateway,
            distributor,
        }
    }

    pub async fn bot_config(&self) -> BotConfig {
        load_bot_config(self.store.as_ref()).await
    }

    /// Starts a fresh flow, replacing any session the user already had.
    pub async fn start_flow(&self, handle: &FormHandle, user_id: &str, display_name: &str) -> FlowStep {
        let session = StandupSession::new(user_id, display_name, FlowOrigin::Command, Utc::now());
        self.begin(handle, session).await
    }

    /// Starts a flow whose completion also records the user's check-in.
    pub async fn start_flow_for_check_in(
        &self,
        handle: &FormHandle,
        user_id: &str,
        display_name: &str,
        contact: &str,
    ) -> FlowStep {
        let origin = FlowOrigin::CheckIn {
            contact: contact.to_string(),
        };
        let session = StandupSession::new(user_id, display_name, origin, Utc::now());
        self.begin(handle, session).await
    }

    async fn begin(&self, handle: &FormHandle, session: StandupSession) -> FlowStep {
        if let Some(previous) = self.sessions.get(&session.user_id).await {
            info!(
                "Replacing standup flow for {} that was at step {}",
                previous.user_id, previous.step
            );
        }

        let view = FormView::Feeling {
            display_name: session.display_name.clone(),
        };
        info!("Starting standup flow for {} ({})", session.display_name, session.user_id);
        self.sessions.put(session).await;
        self.render(handle, &view, true).await;
        FlowStep::Feeling
    }

    pub async fn submit_feeling(
        &self,
        handle: &FormHandle,
        user_id: &str,
        feeling: Option<&str>,
    ) -> Result<FlowStep, FlowError> {
        let mut session = match self.session_at(user_id, FlowStep::Feeling).await {
            Ok(session) => session,
            Err(e) => return self.reject(handle, e).await,
        };
        let feeling = match validate_feeling(feeling) {
            Ok(feeling) => feeling,
            Err(e) => return self.reject(handle, e.into()).await,
        };

        session.feeling = Some(feeling);
        session.advance();
        session.touch(Utc::now());

        let config = self.bot_config().await;
        let view = view_for(&session, &config);
        let step = session.step;
        self.sessions.put(session).await;
        self.render(handle, &view, false).await;
        Ok(step)
    }

    /// Appends a task to `which`; stays on the step when `add_another` is set.
    pub async fn submit_task(
        &self,
        handle: &FormHandle,
        user_id: &str,
        which: TaskList,
        form: &TaskForm,
        add_another: bool,
    ) -> Result<FlowStep, FlowError> {
        let mut session = match self.session_at(user_id, which.step()).await {
            Ok(session) => session,
            Err(e) => return self.reject(handle, e).await,
        };
        let config = self.bot_config().await;
        let entry = match build_task_entry(form, &config) {
            Ok(entry) => entry,
            Err(e) => return self.reject(handle, e.into()).await,
        };

        debug!("Adding {} task for {}: {}", which.as_str(), user_id, entry.title);
        session.push_task(which, entry);
        if !add_another {
            session.advance();
        }
        session.touch(Utc::now());

        let view = view_for(&session, &config);
        let step = session.step;
        self.sessions.put(session).await;
        self.render(handle, &view, false).await;
        Ok(step)
    }

    /// "Done" without another task; leaves `which` as it is, possibly empty.
    pub async fn finish_tasks(
        &self,
        handle: &FormHandle,
        user_id: &str,
        which: TaskList,
    ) -> Result<FlowStep, FlowError> {
        let mut session = match self.session_at(user_id, which.step()).await {
            Ok(session) => session,
            Err(e) => return self.reject(handle, e).await,
        };

        session.advance();
        session.touch(Utc::now());

        let config = self.bot_config().await;
        let view = view_for(&session, &config);
        let step = session.step;
        self.sessions.put(session).await;
        self.render(handle, &view, false).await;
        Ok(step)
    }

    /// Saves the standup and distributes it.
    ///
    /// The session is only removed once the record is stored, so a failed save
    /// can be resubmitted without losing the collected tasks.
    pub async fn submit_blockers(
        &self,
        handle: &FormHandle,
        user_id: &str,
        blockers: &str,
    ) -> Result<StandupRecord, FlowError> {
        let mut session = match self.session_at(user_id, FlowStep::Blockers).await {
            Ok(session) => session,
            Err(e) => return self.reject(handle, e).await,
        };
        let Some(feeling) = session.feeling else {
            let e = ValidationError::new("feeling", "Please pick how you are feeling");
            return self.reject(handle, e.into()).await;
        };

        let config = self.bot_config().await;
        // The date is taken at submission, so a flow crossing midnight lands on the later day.
        let standup = NewStandup {
            user_id: session.user_id.clone(),
            display_name: session.display_name.clone(),
            feeling,
            yesterday: session.yesterday.clone(),
            today: session.today.clone(),
            blockers: blockers.trim().to_string(),
            date: current_date_in(&config.timezone),
        };

        let record = match self.store.append_standup(standup).await {
            Ok(record) => record,
            Err(e) => {
                session.touch(Utc::now());
                self.sessions.put(session).await;
                return self.reject(handle, e.into()).await;
            }
        };

        self.sessions.remove(user_id).await;
        info!(
            "Saved standup {} for {} ({} yesterday, {} today)",
            record.id,
            record.display_name,
            record.yesterday.len(),
            record.today.len()
        );

        let checked_in = match &session.origin {
            FlowOrigin::Command => false,
            FlowOrigin::CheckIn { contact } => self.record_check_in(&record, contact).await,
        };

        let view = FormView::Submitted {
            record: record.clone(),
            checked_in,
        };
        self.render(handle, &view, false).await;

        let report = self.distributor.distribute(&record).await;
        debug!(
            "Distribution of standup {}: {} posted, {} unmapped, {} failed",
            record.id,
            report.posted.len(),
            report.unmapped.len(),
            report.failed.len()
        );

        Ok(record)
    }

    async fn record_check_in(&self, record: &StandupRecord, contact: &str) -> bool {
        let entry = NewCheckIn {
            user_id: record.user_id.clone(),
            display_name: record.display_name.clone(),
            contact: contact.to_string(),
            kind: CheckInKind::CheckIn,
            standup_id: Some(record.id),
        };

        match self.store.append_check_in(entry).await {
            Ok(check_in) => {
                info!(
                    "Checked in {} (record {}) with standup {}",
                    record.user_id, check_in.id, record.id
                );
                true
            }
            Err(e) => {
                error!("Failed to record check-in for {}: {}", record.user_id, e);
                false
            }
        }
    }

    /// Drops the user's session, if any.
    pub async fn cancel_flow(&self, user_id: &str) -> bool {
        let removed = self.sessions.remove(user_id).await.is_some();
        if removed {
            info!("Cancelled standup flow for {}", user_id);
        }
        removed
    }

    pub async fn has_active_flow(&self, user_id: &str) -> bool {
        self.sessions.get(user_id).await.is_some()
    }

    pub async fn sweep_expired_sessions(&self, max_age: Duration) -> usize {
        self.sweep_expired_sessions_at(Utc::now(), max_age).await
    }

    pub async fn sweep_expired_sessions_at(&self, now: DateTime<Utc>, max_age: Duration) -> usize {
        let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
        let cutoff = now.checked_sub_signed(max_age).unwrap_or(DateTime::<Utc>::MIN_UTC);

        let removed = self.sessions.remove_idle_since(cutoff).await;
        if !removed.is_empty() {
            info!("Expired {} idle standup flow(s): {:?}", removed.len(), removed);
        }
        removed.len()
    }

    /// Runs the expiry sweep every `every` until the runtime shuts down.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration, max_age: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                self.sweep_expired_sessions(max_age).await;
            }
        })
    }

    async fn session_at(&self, user_id: &str, expected: FlowStep) -> Result<StandupSession, FlowError> {
        let session = self
            .sessions
            .get(user_id)
            .await
            .ok_or_else(|| FlowError::NoActiveFlow {
                user_id: user_id.to_string(),
            })?;

        if session.step != expected {
            return Err(FlowError::StaleForm {
                submitted: expected,
                current: session.step,
            });
        }
        Ok(session)
    }

    /// Reports `err` next to the form and hands it back to the caller.
    async fn reject<T>(&self, handle: &FormHandle, err: FlowError) -> Result<T, FlowError> {
        match &err {
            FlowError::Validation(e) => debug!("Rejected {} field: {}", e.field, e.message),
            FlowError::NoActiveFlow { .. } | FlowError::StaleForm { .. } => {
                warn!("Ignoring standup callback: {}", err)
            }
            FlowError::Store(e) => error!("Standup could not be saved: {}", e),
        }

        if let Err(e) = self.gateway.report_error(handle, &err.user_message()).await {
            warn!("Failed to report standup error to user: {}", e);
        }
        Err(err)
    }

    async fn render(&self, handle: &FormHandle, view: &FormView, open: bool) {
        let result = if open {
            self.gateway.open(handle, view).await
        } else {
            self.gateway.update(handle, view).await
        };

        if let Err(e) = result {
            warn!("Failed to render standup form: {}", e);
        }
    }
}

/// The form matching the session's current step.
fn view_for(session: &StandupSession, config: &BotConfig) -> FormView {
    match session.step {
        FlowStep::Feeling => FormView::Feeling {
            display_name: session.display_name.clone(),
        },
        FlowStep::Yesterday | FlowStep::Today => {
            let which = if session.step == FlowStep::Yesterday {
                TaskList::Yesterday
            } else {
                TaskList::Today
            };
            FormView::Tasks {
                which,
                entries: session.tasks(which).to_vec(),
                projects: config.projects.clone(),
                time_estimates: config.time_estimates.clone(),
            }
        }
        FlowStep::Blockers | FlowStep::Complete => FormView::Blockers {
            yesterday_count: session.yesterday.len(),
            today_count: session.today.len(),
        },
    }
}
