//! Custom ids carried by standup buttons, selects and modals.

use crate::standup::TaskList;

const PREFIX: &str = "standup";

/// A component (button or select) on a standup form message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandupAction {
    SelectFeeling,
    OpenTaskForm { which: TaskList, add_another: bool },
    FinishTasks { which: TaskList },
    OpenBlockersForm,
    Cancel,
}

/// A submitted standup modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandupModal {
    Task { which: TaskList, add_another: bool },
    Blockers,
}

fn more_flag(add_another: bool) -> &'static str {
    if add_another { "more" } else { "last" }
}

fn parse_more_flag(s: &str) -> Option<bool> {
    match s {
        "more" => Some(true),
        "last" => Some(false),
        _ => None,
    }
}

impl StandupAction {
    pub fn custom_id(&self) -> String {
        match self {
            StandupAction::SelectFeeling => format!("{}:feeling", PREFIX),
            StandupAction::OpenTaskForm { which, add_another } => {
                format!("{}:task:{}:{}", PREFIX, which.as_str(), more_flag(*add_another))
            }
            StandupAction::FinishTasks { which } => format!("{}:done:{}", PREFIX, which.as_str()),
            StandupAction::OpenBlockersForm => format!("{}:blockers", PREFIX),
            StandupAction::Cancel => format!("{}:cancel", PREFIX),
        }
    }

    pub fn parse(custom_id: &str) -> Option<StandupAction> {
        let mut parts = custom_id.split(':');
        if parts.next() != Some(PREFIX) {
            return None;
        }

        let action = match (parts.next()?, parts.next(), parts.next()) {
            ("feeling", None, None) => StandupAction::SelectFeeling,
            ("task", Some(which), Some(flag)) => StandupAction::OpenTaskForm {
                which: TaskList::parse(which)?,
                add_another: parse_more_flag(flag)?,
            },
            ("done", Some(which), None) => StandupAction::FinishTasks {
                which: TaskList::parse(which)?,
            },
            ("blockers", None, None) => StandupAction::OpenBlockersForm,
            ("cancel", None, None) => StandupAction::Cancel,
            _ => return None,
        };

        parts.next().is_none().then_some(action)
    }
}

impl StandupModal {
    pub fn custom_id(&self) -> String {
        match self {
            StandupModal::Task { which, add_another } => format!(
                "{}_modal:task:{}:{}",
                PREFIX,
                which.as_str(),
                more_flag(*add_another)
            ),
            StandupModal::Blockers => format!("{}_modal:blockers", PREFIX),
        }
    }

    pub fn parse(custom_id: &str) -> Option<StandupModal> {
        let rest = custom_id.strip_prefix(PREFIX)?.strip_prefix("_modal:")?;
        let parts: Vec<&str> = rest.split(':').collect();

        match parts.as_slice() {
            ["task", which, flag] => Some(StandupModal::Task {
                which: TaskList::parse(which)?,
                add_another: parse_more_flag(flag)?,
            }),
            ["blockers"] => Some(StandupModal::Blockers),
            _ => None,
        }
    }
}
