use crate::database::models::{BotConfig, Feeling, NO_TICKET, TaskEntry};
use thiserror::Error;

const DEFAULT_SCORE: u8 = 3;

/// A form field rejected during a standup step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Raw values of a submitted task form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub project: String,
    pub ticket: String,
    pub title: String,
    pub time_estimate: String,
    pub confidence: Option<String>,
    pub difficulty: Option<String>,
}

pub fn validate_feeling(raw: Option<&str>) -> Result<Feeling, ValidationError> {
    let raw = raw.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Err(ValidationError::new("feeling", "Please pick how you are feeling"));
    }
    raw.parse::<Feeling>()
        .map_err(|_| ValidationError::new("feeling", format!("Unknown feeling \"{}\"", raw)))
}

pub fn build_task_entry(form: &TaskForm, config: &BotConfig) -> Result<TaskEntry, ValidationError> {
    let project = form.project.trim();
    if project.is_empty() {
        return Err(ValidationError::new("project", "Project is required"));
    }
    let project = config.find_project(project).ok_or_else(|| {
        ValidationError::new(
            "project",
            format!(
                "Unknown project \"{}\". Known projects: {}",
                project,
                config.projects.join(", ")
            ),
        )
    })?;

    let title = form.title.trim();
    if title.is_empty() {
        return Err(ValidationError::new("title", "Task title is required"));
    }

    let time_estimate = config.find_time_estimate(&form.time_estimate).ok_or_else(|| {
        ValidationError::new(
            "time_estimate",
            format!(
                "Time estimate must be one of: {}",
                config.time_estimates.join(", ")
            ),
        )
    })?;

    let ticket = form.ticket.trim();
    let ticket = if ticket.is_empty() { NO_TICKET } else { ticket };

    Ok(TaskEntry {
        project: project.to_string(),
        ticket: ticket.to_string(),
        title: title.to_string(),
        time_estimate: time_estimate.to_string(),
        confidence: parse_score("confidence", form.confidence.as_deref())?,
        difficulty: parse_score("difficulty", form.difficulty.as_deref())?,
    })
}

/// Missing scores default to 3; present ones must be 1-5.
pub fn parse_score(field: &'static str, raw: Option<&str>) -> Result<u8, ValidationError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(DEFAULT_SCORE),
        Some(raw) => raw,
    };

    match raw.parse::<u8>() {
        Ok(score @ 1..=5) => Ok(score),
        _ => Err(ValidationError::new(
            field,
            format!("{} must be a number from 1 to 5", field),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BotConfig {
        BotConfig {
            projects: vec!["Alpha".into(), "Beta".into()],
            ..BotConfig::default()
        }
    }

    fn form() -> TaskForm {
        TaskForm {
            project: "alpha".into(),
            ticket: "".into(),
            title: "Fix bug".into(),
            time_estimate: "2-3h".into(),
            confidence: Some("4".into()),
            difficulty: Some("2".into()),
        }
    }

    #[test]
    fn blank_ticket_becomes_placeholder() {
        let entry = build_task_entry(&form(), &config()).unwrap();
        assert_eq!(entry.ticket, NO_TICKET);
        assert_eq!(entry.project, "Alpha");
        assert_eq!((entry.confidence, entry.difficulty), (4, 2));
    }

    #[test]
    fn missing_scores_default_to_three() {
        let entry = build_task_entry(
            &TaskForm {
                confidence: None,
                difficulty: Some("  ".into()),
                ..form()
            },
            &config(),
        )
        .unwrap();
        assert_eq!((entry.confidence, entry.difficulty), (3, 3));
    }

    #[test]
    fn invalid_fields_are_keyed() {
        let cases = [
            (TaskForm { project: "".into(), ..form() }, "project"),
            (TaskForm { project: "Gamma".into(), ..form() }, "project"),
            (TaskForm { title: " \n ".into(), ..form() }, "title"),
            (TaskForm { time_estimate: "a week".into(), ..form() }, "time_estimate"),
            (TaskForm { confidence: Some("6".into()), ..form() }, "confidence"),
            (TaskForm { difficulty: Some("hard".into()), ..form() }, "difficulty"),
        ];

        for (input, field) in cases {
            let err = build_task_entry(&input, &config()).unwrap_err();
            assert_eq!(err.field, field, "{:?}", input);
        }
    }

    #[test]
    fn multiline_titles_are_kept() {
        let entry = build_task_entry(
            &TaskForm {
                title: "Refactor parser\n- split lexer".into(),
                ..form()
            },
            &config(),
        )
        .unwrap();
        assert_eq!(entry.title, "Refactor parser\n- split lexer");
    }

    #[test]
    fn feeling_must_be_present_and_known() {
        assert_eq!(validate_feeling(Some("good")), Ok(Feeling::Good));
        assert_eq!(validate_feeling(None).unwrap_err().field, "feeling");
        assert_eq!(validate_feeling(Some(" ")).unwrap_err().field, "feeling");
        assert!(validate_feeling(Some("elated")).is_err());
    }
}
