use crate::database::models::{ProjectChannelMapping, StandupRecord, TaskEntry};
use crate::utils::attendance::AttendanceStatus;
use crate::utils::time::format_time_in;
use poise::serenity_prelude as serenity;

/// Discord rejects message content longer than this.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

pub fn feeling_emoji(feeling: &str) -> &'static str {
    match feeling {
        "great" => "😄",
        "good" => "🙂",
        "okay" => "😐",
        "tired" => "😓",
        "stressed" => "😰",
        _ => "🙂",
    }
}

pub fn format_standup_summary(record: &StandupRecord) -> String {
    let mut summary = format!(
        "{} **Daily standup: {}** ({})\n",
        feeling_emoji(record.feeling.as_str()),
        record.display_name,
        record.date.format("%Y-%m-%d")
    );

    push_task_block(&mut summary, "📋 Yesterday", &record.yesterday);
    push_task_block(&mut summary, "🎯 Today", &record.today);

    let blockers = record.blockers.trim();
    if !blockers.is_empty() {
        summary.push_str("\n**🚧 Blockers**\n");
        summary.push_str(blockers);
        summary.push('\n');
    }

    truncate_message(&summary, DISCORD_MESSAGE_LIMIT)
}

fn push_task_block(out: &mut String, label: &str, tasks: &[TaskEntry]) {
    out.push_str(&format!("\n**{}**\n", label));

    if tasks.is_empty() {
        out.push_str("_No tasks_\n");
        return;
    }

    for (i, task) in tasks.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, task.title.replace('\n', "\n   ")));
        out.push_str(&format!(
            "   Project: {} | Ticket: {} | Estimate: {}\n",
            task.project, task.ticket, task.time_estimate
        ));
        out.push_str(&format!(
            "   Confidence: {} | Difficulty: {}\n",
            "⭐".repeat(task.confidence as usize),
            "🔥".repeat(task.difficulty as usize)
        ));
    }
}

/// Short one-line-per-task listing shown while a form is still open.
pub fn format_task_list(tasks: &[TaskEntry]) -> String {
    if tasks.is_empty() {
        return "_No tasks added yet_".to_string();
    }

    tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let title = task.title.lines().next().unwrap_or_default();
            format!(
                "{}. {} ({}, {}, {})",
                i + 1,
                title,
                task.project,
                task.ticket,
                task.time_estimate
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cuts `text` to at most `limit` characters, marking the cut with an ellipsis.
pub fn truncate_message(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(limit.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

pub fn format_channel_mappings(mappings: &[ProjectChannelMapping]) -> String {
    if mappings.is_empty() {
        return "No project channels are configured".to_string();
    }

    mappings
        .iter()
        .map(|m| {
            format!(
                "{} **{}** → <#{}> ({}){}",
                if m.active { "🟢" } else { "⚪" },
                m.project,
                m.channel_id,
                m.channel_name,
                if m.active { "" } else { " inactive" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_error_message(error: &str) -> String {
    format!("❌ **Error**: {}", error)
}

pub fn format_success_message(message: &str) -> String {
    format!("✅ {}", message)
}

pub fn format_info_message(message: &str) -> String {
    format!("ℹ️ {}", message)
}

pub fn create_info_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(0x3498db) // Blue
        .timestamp(chrono::Utc::now())
}

pub fn create_status_embed(
    username: &str,
    status: &AttendanceStatus,
    timezone: &str,
) -> serenity::CreateEmbed {
    let attendance = match &status.last_change {
        Some(record) if status.checked_in => {
            format!("🟢 **Checked in** since {}", format_time_in(record.created_at, timezone))
        }
        Some(record) => {
            format!("🔴 **Checked out** at {}", format_time_in(record.created_at, timezone))
        }
        None => "⚪ No check-ins recorded yet".to_string(),
    };
    let standup = if status.standup_submitted {
        "📝 Today's standup has been submitted"
    } else {
        "📝 Today's standup is still missing"
    };

    serenity::CreateEmbed::new()
        .title("📊 Status")
        .description(format!("{}\n{}", attendance, standup))
        .color(if status.checked_in { 0x00ff00 } else { 0x95a5a6 })
        .author(serenity::CreateEmbedAuthor::new(username))
        .footer(serenity::CreateEmbedFooter::new(
            status.date.format("%Y-%m-%d").to_string(),
        ))
        .timestamp(chrono::Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Feeling;
    use chrono::{NaiveDate, Utc};

    fn task(title: &str, confidence: u8, difficulty: u8) -> TaskEntry {
        TaskEntry {
            project: "Alpha".into(),
            ticket: "N/A".into(),
            title: title.into(),
            time_estimate: "2-3h".into(),
            confidence,
            difficulty,
        }
    }

    fn record(feeling: Feeling, blockers: &str) -> StandupRecord {
        StandupRecord {
            id: 1,
            user_id: "u1".into(),
            display_name: "alice".into(),
            feeling,
            yesterday: vec![task("Fix bug", 4, 2)],
            today: vec![],
            blockers: blockers.into(),
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn emoji_is_keyed_by_feeling_with_default() {
        assert_eq!(feeling_emoji("great"), "😄");
        assert_eq!(feeling_emoji("stressed"), "😰");
        assert_eq!(feeling_emoji("bewildered"), "🙂");
    }

    #[test]
    fn summary_lists_tasks_with_scores() {
        let summary = format_standup_summary(&record(Feeling::Tired, ""));

        assert!(summary.starts_with("😓 **Daily standup: alice** (2026-10-16)"));
        assert!(summary.contains("1. Fix bug"));
        assert!(summary.contains("Project: Alpha | Ticket: N/A | Estimate: 2-3h"));
        assert!(summary.contains("Confidence: ⭐⭐⭐⭐ | Difficulty: 🔥🔥\n"));
        assert!(summary.contains("_No tasks_"));
    }

    #[test]
    fn blockers_block_only_when_non_blank() {
        assert!(!format_standup_summary(&record(Feeling::Good, "  \n")).contains("Blockers"));

        let summary = format_standup_summary(&record(Feeling::Good, "Waiting on review"));
        assert!(summary.ends_with("**🚧 Blockers**\nWaiting on review\n"));
    }

    #[test]
    fn long_summaries_fit_one_message() {
        let mut long = record(Feeling::Good, "");
        long.today = (0..100).map(|i| task(&format!("Task number {}", i), 5, 5)).collect();

        let summary = format_standup_summary(&long);
        assert_eq!(summary.chars().count(), DISCORD_MESSAGE_LIMIT);
        assert!(summary.ends_with('…'));
    }

    #[test]
    fn task_list_shows_first_title_line() {
        let listing = format_task_list(&[task("Refactor\nsecond line", 3, 3)]);
        assert_eq!(listing, "1. Refactor (Alpha, N/A, 2-3h)");
        assert_eq!(format_task_list(&[]), "_No tasks added yet_");
    }
}
