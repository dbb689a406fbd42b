//! In-progress standup sessions and the per-user table holding them.

use crate::database::models::{Feeling, TaskEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FlowStep {
    Feeling,
    Yesterday,
    Today,
    Blockers,
    Complete,
}

impl FlowStep {
    pub fn next(self) -> FlowStep {
        match self {
            FlowStep::Feeling => FlowStep::Yesterday,
            FlowStep::Yesterday => FlowStep::Today,
            FlowStep::Today => FlowStep::Blockers,
            FlowStep::Blockers | FlowStep::Complete => FlowStep::Complete,
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlowStep::Feeling => "feeling",
            FlowStep::Yesterday => "yesterday",
            FlowStep::Today => "today",
            FlowStep::Blockers => "blockers",
            FlowStep::Complete => "complete",
        })
    }
}

/// Which of the two task lists a form is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskList {
    Yesterday,
    Today,
}

impl TaskList {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskList::Yesterday => "yesterday",
            TaskList::Today => "today",
        }
    }

    pub fn parse(s: &str) -> Option<TaskList> {
        match s {
            "yesterday" => Some(TaskList::Yesterday),
            "today" => Some(TaskList::Today),
            _ => None,
        }
    }

    /// The step during which this list is filled.
    pub fn step(&self) -> FlowStep {
        match self {
            TaskList::Yesterday => FlowStep::Yesterday,
            TaskList::Today => FlowStep::Today,
        }
    }
}

/// What started the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOrigin {
    Command,
    /// Check-in waiting on the standup; recorded when the standup is saved.
    CheckIn { contact: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandupSession {
    pub user_id: String,
    pub display_name: String,
    pub step: FlowStep,
    pub feeling: Option<Feeling>,
    pub yesterday: Vec<TaskEntry>,
    pub today: Vec<TaskEntry>,
    pub origin: FlowOrigin,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StandupSession {
    pub fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        origin: FlowOrigin,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            step: FlowStep::Feeling,
            feeling: None,
            yesterday: Vec::new(),
            today: Vec::new(),
            origin,
            started_at: now,
            updated_at: now,
        }
    }

    /// Moves one step forward; steps never go back.
    pub fn advance(&mut self) {
        self.step = self.step.next();
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    pub fn tasks(&self, which: TaskList) -> &[TaskEntry] {
        match which {
            TaskList::Yesterday => &self.yesterday,
            TaskList::Today => &self.today,
        }
    }

    pub fn push_task(&mut self, which: TaskList, entry: TaskEntry) {
        match which {
            TaskList::Yesterday => self.yesterday.push(entry),
            TaskList::Today => self.today.push(entry),
        }
    }
}

/// Per-user table of live sessions.
///
/// The in-process implementation is enough for a single bot process; running
/// several processes needs an implementation backed by a shared atomic store.
#[async_trait]
pub trait FlowStateStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Option<StandupSession>;

    /// Inserts or replaces the session keyed by its user id.
    async fn put(&self, session: StandupSession);

    async fn remove(&self, user_id: &str) -> Option<StandupSession>;

    /// Removes every session last touched before `cutoff`, returning their user ids.
    async fn remove_idle_since(&self, cutoff: DateTime<Utc>) -> Vec<String>;

    async fn len(&self) -> usize;
}

#[derive(Default)]
pub struct MemoryFlowStateStore {
    sessions: DashMap<String, StandupSession>,
}

impl MemoryFlowStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlowStateStore for MemoryFlowStateStore {
    async fn get(&self, user_id: &str) -> Option<StandupSession> {
        self.sessions.get(user_id).map(|entry| entry.value().clone())
    }

    async fn put(&self, session: StandupSession) {
        self.sessions.insert(session.user_id.clone(), session);
    }

    async fn remove(&self, user_id: &str) -> Option<StandupSession> {
        self.sessions.remove(user_id).map(|(_, session)| session)
    }

    async fn remove_idle_since(&self, cutoff: DateTime<Utc>) -> Vec<String> {
        let mut removed = Vec::new();
        self.sessions.retain(|user_id, session| {
            if session.updated_at < cutoff {
                removed.push(user_id.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    async fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn steps_only_move_forward() {
        let mut step = FlowStep::Feeling;
        let mut seen = vec![step];
        while step != FlowStep::Complete {
            let next = step.next();
            assert!(next > step);
            step = next;
            seen.push(step);
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(FlowStep::Complete.next(), FlowStep::Complete);
    }

    #[test]
    fn task_list_names_round_trip() {
        for list in [TaskList::Yesterday, TaskList::Today] {
            assert_eq!(TaskList::parse(list.as_str()), Some(list));
        }
        assert_eq!(TaskList::parse("tomorrow"), None);
    }

    #[tokio::test]
    async fn sessions_are_keyed_per_user() {
        let store = MemoryFlowStateStore::new();
        let now = Utc::now();
        store.put(StandupSession::new("a", "Alice", FlowOrigin::Command, now)).await;
        store.put(StandupSession::new("b", "Bob", FlowOrigin::Command, now)).await;

        let mut alice = store.get("a").await.unwrap();
        alice.advance();
        store.put(alice).await;

        assert_eq!(store.get("a").await.unwrap().step, FlowStep::Yesterday);
        assert_eq!(store.get("b").await.unwrap().step, FlowStep::Feeling);
        assert_eq!(store.len().await, 2);

        assert!(store.remove("a").await.is_some());
        assert!(store.remove("a").await.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn idle_sessions_are_removed_by_last_touch() {
        let store = MemoryFlowStateStore::new();
        let now = Utc::now();
        let old = now - Duration::minutes(90);

        store.put(StandupSession::new("stale", "Stale", FlowOrigin::Command, old)).await;
        let mut touched = StandupSession::new("touched", "Touched", FlowOrigin::Command, old);
        touched.touch(now);
        store.put(touched).await;

        let removed = store.remove_idle_since(now - Duration::minutes(60)).await;
        assert_eq!(removed, vec!["stale".to_string()]);
        assert!(store.get("touched").await.is_some());
    }
}
