use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder stored when a task has no ticket reference.
pub const NO_TICKET: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feeling {
    Great,
    Good,
    Okay,
    Tired,
    Stressed,
}

impl Feeling {
    pub const ALL: [Feeling; 5] = [
        Feeling::Great,
        Feeling::Good,
        Feeling::Okay,
        Feeling::Tired,
        Feeling::Stressed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feeling::Great => "great",
            Feeling::Good => "good",
            Feeling::Okay => "okay",
            Feeling::Tired => "tired",
            Feeling::Stressed => "stressed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Feeling::Great => "Great",
            Feeling::Good => "Good",
            Feeling::Okay => "Okay",
            Feeling::Tired => "Tired",
            Feeling::Stressed => "Stressed",
        }
    }
}

impl fmt::Display for Feeling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feeling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "great" => Ok(Feeling::Great),
            "good" => Ok(Feeling::Good),
            "okay" => Ok(Feeling::Okay),
            "tired" => Ok(Feeling::Tired),
            "stressed" => Ok(Feeling::Stressed),
            other => Err(format!("unknown feeling: {}", other)),
        }
    }
}

/// One unit of reported work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    pub project: String,
    pub ticket: String,
    pub title: String,
    pub time_estimate: String,
    pub confidence: u8,
    pub difficulty: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandupRecord {
    pub id: i64,
    pub user_id: String,
    pub display_name: String,
    pub feeling: Feeling,
    pub yesterday: Vec<TaskEntry>,
    pub today: Vec<TaskEntry>,
    pub blockers: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl StandupRecord {
    pub fn all_tasks(&self) -> impl Iterator<Item = &TaskEntry> {
        self.yesterday.iter().chain(self.today.iter())
    }
}

/// A standup ready to be appended; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStandup {
    pub user_id: String,
    pub display_name: String,
    pub feeling: Feeling,
    pub yesterday: Vec<TaskEntry>,
    pub today: Vec<TaskEntry>,
    pub blockers: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInKind {
    CheckIn,
    CheckOut,
}

impl CheckInKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckInKind::CheckIn => "check_in",
            CheckInKind::CheckOut => "check_out",
        }
    }
}

impl FromStr for CheckInKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check_in" => Ok(CheckInKind::CheckIn),
            "check_out" => Ok(CheckInKind::CheckOut),
            other => Err(format!("invalid check-in kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInRecord {
    pub id: i64,
    pub user_id: String,
    pub display_name: String,
    pub contact: String,
    pub kind: CheckInKind,
    pub standup_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheckIn {
    pub user_id: String,
    pub display_name: String,
    pub contact: String,
    pub kind: CheckInKind,
    pub standup_id: Option<i64>,
}

/// A user is checked in when their most recent record is a check-in.
pub fn is_checked_in(latest: Option<&CheckInRecord>) -> bool {
    matches!(latest, Some(record) if record.kind == CheckInKind::CheckIn)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectChannelMapping {
    pub id: i64,
    pub project: String,
    pub channel_id: String,
    pub channel_name: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    pub projects: Vec<String>,
    pub time_estimates: Vec<String>,
    pub standup_mandatory: bool,
    pub timezone: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            projects: vec!["General".to_string()],
            time_estimates: ["<1h", "1-2h", "2-3h", "3-5h", "5h+"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            standup_mandatory: false,
            timezone: "+09:00".to_string(),
        }
    }
}

impl BotConfig {
    /// Canonical spelling of a configured project, matched case-insensitively.
    pub fn find_project(&self, input: &str) -> Option<&str> {
        let input = input.trim();
        self.projects
            .iter()
            .find(|p| p.eq_ignore_ascii_case(input))
            .map(String::as_str)
    }

    /// Canonical spelling of a configured time estimate; whitespace is ignored.
    pub fn find_time_estimate(&self, input: &str) -> Option<&str> {
        let wanted = squash(input);
        self.time_estimates
            .iter()
            .find(|e| squash(e) == wanted)
            .map(String::as_str)
    }
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Partial update for [`BotConfig`]; `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotConfigPatch {
    pub projects: Option<Vec<String>>,
    pub time_estimates: Option<Vec<String>>,
    pub standup_mandatory: Option<bool>,
    pub timezone: Option<String>,
}

impl BotConfigPatch {
    pub fn is_empty(&self) -> bool {
        self == &BotConfigPatch::default()
    }

    pub fn merge_into(self, mut config: BotConfig) -> BotConfig {
        if let Some(projects) = self.projects {
            config.projects = projects;
        }
        if let Some(time_estimates) = self.time_estimates {
            config.time_estimates = time_estimates;
        }
        if let Some(standup_mandatory) = self.standup_mandatory {
            config.standup_mandatory = standup_mandatory;
        }
        if let Some(timezone) = self.timezone {
            config.timezone = timezone;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feeling_parses_case_insensitively() {
        assert_eq!("Great".parse::<Feeling>(), Ok(Feeling::Great));
        assert_eq!(" stressed ".parse::<Feeling>(), Ok(Feeling::Stressed));
        assert!("".parse::<Feeling>().is_err());
        assert!("meh".parse::<Feeling>().is_err());
    }

    #[test]
    fn checked_in_is_derived_from_latest_record() {
        let mut record = CheckInRecord {
            id: 1,
            user_id: "u1".into(),
            display_name: "Alice".into(),
            contact: "<@u1>".into(),
            kind: CheckInKind::CheckIn,
            standup_id: None,
            created_at: Utc::now(),
        };
        assert!(!is_checked_in(None));
        assert!(is_checked_in(Some(&record)));
        record.kind = CheckInKind::CheckOut;
        assert!(!is_checked_in(Some(&record)));
    }

    #[test]
    fn config_lookups_return_canonical_spelling() {
        let config = BotConfig {
            projects: vec!["Alpha".into(), "Beta".into()],
            ..BotConfig::default()
        };
        assert_eq!(config.find_project(" alpha "), Some("Alpha"));
        assert_eq!(config.find_project("Gamma"), None);
        assert_eq!(config.find_time_estimate("2 - 3H"), Some("2-3h"));
        assert_eq!(config.find_time_estimate("forever"), None);
    }

    #[test]
    fn patch_keeps_unspecified_fields() {
        let base = BotConfig::default();
        let merged = BotConfigPatch {
            standup_mandatory: Some(true),
            ..BotConfigPatch::default()
        }
        .merge_into(base.clone());

        assert!(merged.standup_mandatory);
        assert_eq!(merged.projects, base.projects);
        assert_eq!(merged.timezone, base.timezone);
        assert!(BotConfigPatch::default().is_empty());
    }
}
