//! The form gateway: how the orchestrator shows forms and posts messages
//! without knowing anything about the chat platform.

use crate::database::models::{StandupRecord, TaskEntry};
use crate::standup::flow::TaskList;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("platform request failed: {0}")]
    Platform(String),

    #[error("invalid channel id: {0}")]
    InvalidChannel(String),
}

/// Identifies the user interaction a form is rendered into.
///
/// Handles are short-lived; rendering into an expired one fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormHandle {
    pub interaction_id: u64,
    pub token: String,
}

impl FormHandle {
    pub fn new(interaction_id: u64, token: impl Into<String>) -> Self {
        Self {
            interaction_id,
            token: token.into(),
        }
    }
}

/// Platform-neutral description of a form step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormView {
    Feeling {
        display_name: String,
    },
    Tasks {
        which: TaskList,
        entries: Vec<TaskEntry>,
        projects: Vec<String>,
        time_estimates: Vec<String>,
    },
    Blockers {
        yesterday_count: usize,
        today_count: usize,
    },
    Submitted {
        record: StandupRecord,
        /// Set when the submission also completed a pending check-in.
        checked_in: bool,
    },
    Cancelled,
}

#[async_trait]
pub trait FormGateway: Send + Sync {
    /// Renders a new form instance in response to `handle`.
    async fn open(&self, handle: &FormHandle, view: &FormView) -> Result<(), GatewayError>;

    /// Replaces the content of the form `handle` was triggered from.
    async fn update(&self, handle: &FormHandle, view: &FormView) -> Result<(), GatewayError>;

    /// Shows a validation or flow error next to the form, leaving it open.
    async fn report_error(&self, handle: &FormHandle, message: &str) -> Result<(), GatewayError>;

    /// Posts a one-way message to a channel.
    async fn post_message(&self, channel_id: &str, content: &str) -> Result<(), GatewayError>;
}
