use crate::database::models::{
    BotConfig, CheckInKind, CheckInRecord, Feeling, NewCheckIn, NewStandup, ProjectChannelMapping,
    StandupRecord, TaskEntry,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const BOT_CONFIG_KEY: &str = "default";

// Standup queries
pub async fn create_standup(pool: &SqlitePool, standup: &NewStandup) -> Result<StandupRecord> {
    let yesterday = serde_json::to_string(&standup.yesterday)?;
    let today = serde_json::to_string(&standup.today)?;

    let result = sqlx::query(
        "INSERT INTO standups (user_id, display_name, feeling, yesterday_tasks, today_tasks, blockers, date)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&standup.user_id)
    .bind(&standup.display_name)
    .bind(standup.feeling.as_str())
    .bind(yesterday)
    .bind(today)
    .bind(&standup.blockers)
    .bind(standup.date)
    .execute(pool)
    .await?;

    get_standup_by_id(pool, result.last_insert_rowid()).await
}

pub async fn get_standup_by_id(pool: &SqlitePool, standup_id: i64) -> Result<StandupRecord> {
    let row = sqlx::query(
        "SELECT id, user_id, display_name, feeling, yesterday_tasks, today_tasks, blockers, date, created_at
         FROM standups WHERE id = ?",
    )
    .bind(standup_id)
    .fetch_one(pool)
    .await?;

    standup_from_row(&row)
}

pub async fn standup_exists_for_date(
    pool: &SqlitePool,
    user_id: &str,
    date: NaiveDate,
) -> Result<bool> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM standups WHERE user_id = ? AND date = ?")
            .bind(user_id)
            .bind(date)
            .fetch_one(pool)
            .await?;

    Ok(count > 0)
}

fn standup_from_row(row: &SqliteRow) -> Result<StandupRecord> {
    let feeling: String = row.get("feeling");
    let yesterday: String = row.get("yesterday_tasks");
    let today: String = row.get("today_tasks");

    Ok(StandupRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        display_name: row.get("display_name"),
        feeling: feeling.parse::<Feeling>().map_err(|e| anyhow::anyhow!(e))?,
        yesterday: serde_json::from_str::<Vec<TaskEntry>>(&yesterday)
            .context("malformed yesterday task list")?,
        today: serde_json::from_str::<Vec<TaskEntry>>(&today)
            .context("malformed today task list")?,
        blockers: row.get("blockers"),
        date: row.get("date"),
        created_at: row.get("created_at"),
    })
}

// Check-in queries
pub async fn create_check_in(pool: &SqlitePool, entry: &NewCheckIn) -> Result<CheckInRecord> {
    let result = sqlx::query(
        "INSERT INTO check_ins (user_id, display_name, contact, kind, standup_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&entry.user_id)
    .bind(&entry.display_name)
    .bind(&entry.contact)
    .bind(entry.kind.as_str())
    .bind(entry.standup_id)
    .execute(pool)
    .await?;

    let row = sqlx::query(
        "SELECT id, user_id, display_name, contact, kind, standup_id, created_at
         FROM check_ins WHERE id = ?",
    )
    .bind(result.last_insert_rowid())
    .fetch_one(pool)
    .await?;

    check_in_from_row(&row)
}

pub async fn get_latest_check_in(pool: &SqlitePool, user_id: &str) -> Result<Option<CheckInRecord>> {
    let row_opt = sqlx::query(
        "SELECT id, user_id, display_name, contact, kind, standup_id, created_at
         FROM check_ins
         WHERE user_id = ?
         ORDER BY created_at DESC, id DESC
         LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row_opt.as_ref().map(check_in_from_row).transpose()
}

fn check_in_from_row(row: &SqliteRow) -> Result<CheckInRecord> {
    let kind: String = row.get("kind");

    Ok(CheckInRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        display_name: row.get("display_name"),
        contact: row.get("contact"),
        kind: kind.parse::<CheckInKind>().map_err(|e| anyhow::anyhow!(e))?,
        standup_id: row.get("standup_id"),
        created_at: row.get("created_at"),
    })
}

// Project channel queries
pub async fn get_active_channel(
    pool: &SqlitePool,
    project: &str,
) -> Result<Option<ProjectChannelMapping>> {
    let row_opt = sqlx::query(
        "SELECT id, project, channel_id, channel_name, active
         FROM project_channels
         WHERE project = ? COLLATE NOCASE AND active = TRUE
         LIMIT 1",
    )
    .bind(project)
    .fetch_optional(pool)
    .await?;

    Ok(row_opt.as_ref().map(mapping_from_row))
}

pub async fn upsert_channel_mapping(
    pool: &SqlitePool,
    project: &str,
    channel_id: &str,
    channel_name: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO project_channels (project, channel_id, channel_name, active)
         VALUES (?, ?, ?, TRUE)
         ON CONFLICT(project) DO UPDATE SET
             channel_id = excluded.channel_id,
             channel_name = excluded.channel_name,
             active = TRUE,
             updated_at = CURRENT_TIMESTAMP",
    )
    .bind(project)
    .bind(channel_id)
    .bind(channel_name)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn deactivate_channel_mapping(pool: &SqlitePool, project: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE project_channels
         SET active = FALSE, updated_at = CURRENT_TIMESTAMP
         WHERE project = ? COLLATE NOCASE AND active = TRUE",
    )
    .bind(project)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get_channel_mappings(pool: &SqlitePool) -> Result<Vec<ProjectChannelMapping>> {
    let rows = sqlx::query(
        "SELECT id, project, channel_id, channel_name, active
         FROM project_channels
         ORDER BY project ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(mapping_from_row).collect())
}

fn mapping_from_row(row: &SqliteRow) -> ProjectChannelMapping {
    ProjectChannelMapping {
        id: row.get("id"),
        project: row.get("project"),
        channel_id: row.get("channel_id"),
        channel_name: row.get("channel_name"),
        active: row.get("active"),
    }
}

// Bot config queries
pub async fn get_bot_config(pool: &SqlitePool) -> Result<Option<BotConfig>> {
    let row_opt = sqlx::query(
        "SELECT projects, time_estimates, standup_mandatory, timezone FROM bot_config WHERE key = ?",
    )
    .bind(BOT_CONFIG_KEY)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row_opt else {
        return Ok(None);
    };

    let projects: String = row.get("projects");
    let time_estimates: String = row.get("time_estimates");

    Ok(Some(BotConfig {
        projects: serde_json::from_str(&projects).context("malformed project list")?,
        time_estimates: serde_json::from_str(&time_estimates)
            .context("malformed time estimate list")?,
        standup_mandatory: row.get("standup_mandatory"),
        timezone: row.get("timezone"),
    }))
}

pub async fn save_bot_config(pool: &SqlitePool, config: &BotConfig) -> Result<()> {
    sqlx::query(
        "INSERT INTO bot_config (key, projects, time_estimates, standup_mandatory, timezone)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET
             projects = excluded.projects,
             time_estimates = excluded.time_estimates,
             standup_mandatory = excluded.standup_mandatory,
             timezone = excluded.timezone,
             updated_at = CURRENT_TIMESTAMP",
    )
    .bind(BOT_CONFIG_KEY)
    .bind(serde_json::to_string(&config.projects)?)
    .bind(serde_json::to_string(&config.time_estimates)?)
    .bind(config.standup_mandatory)
    .bind(&config.timezone)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;

    fn task(project: &str) -> TaskEntry {
        TaskEntry {
            project: project.to_string(),
            ticket: "ABC-1".to_string(),
            title: "Fix bug\nand add a test".to_string(),
            time_estimate: "2-3h".to_string(),
            confidence: 4,
            difficulty: 2,
        }
    }

    #[tokio::test]
    async fn standup_is_stored_with_tasks_and_date() {
        let pool = test_pool().await;
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let new = NewStandup {
            user_id: "u1".into(),
            display_name: "Alice".into(),
            feeling: Feeling::Good,
            yesterday: vec![task("Alpha")],
            today: vec![],
            blockers: String::new(),
            date,
        };

        let stored = create_standup(&pool, &new).await.unwrap();
        assert_eq!(stored.feeling, Feeling::Good);
        assert_eq!(stored.yesterday, vec![task("Alpha")]);
        assert!(stored.today.is_empty());
        assert_eq!(stored.date, date);

        assert!(standup_exists_for_date(&pool, "u1", date).await.unwrap());
        assert!(!standup_exists_for_date(&pool, "u1", date.succ_opt().unwrap()).await.unwrap());
        assert!(!standup_exists_for_date(&pool, "u2", date).await.unwrap());
    }

    #[tokio::test]
    async fn latest_check_in_follows_insertion_order() {
        let pool = test_pool().await;
        assert!(get_latest_check_in(&pool, "u1").await.unwrap().is_none());

        for kind in [CheckInKind::CheckIn, CheckInKind::CheckOut] {
            create_check_in(
                &pool,
                &NewCheckIn {
                    user_id: "u1".into(),
                    display_name: "Alice".into(),
                    contact: "<@u1>".into(),
                    kind,
                    standup_id: None,
                },
            )
            .await
            .unwrap();
        }

        let latest = get_latest_check_in(&pool, "u1").await.unwrap().unwrap();
        assert_eq!(latest.kind, CheckInKind::CheckOut);
    }

    #[tokio::test]
    async fn deactivated_mapping_is_not_returned() {
        let pool = test_pool().await;
        upsert_channel_mapping(&pool, "Alpha", "100", "alpha-team").await.unwrap();

        let found = get_active_channel(&pool, "alpha").await.unwrap().unwrap();
        assert_eq!(found.channel_id, "100");

        upsert_channel_mapping(&pool, "Alpha", "200", "alpha-new").await.unwrap();
        let found = get_active_channel(&pool, "Alpha").await.unwrap().unwrap();
        assert_eq!(found.channel_id, "200");

        assert!(deactivate_channel_mapping(&pool, "Alpha").await.unwrap());
        assert!(get_active_channel(&pool, "Alpha").await.unwrap().is_none());
        assert!(!deactivate_channel_mapping(&pool, "Alpha").await.unwrap());

        let all = get_channel_mappings(&pool).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].active);
    }

    #[tokio::test]
    async fn bot_config_is_absent_until_saved() {
        let pool = test_pool().await;
        assert!(get_bot_config(&pool).await.unwrap().is_none());

        let config = BotConfig {
            projects: vec!["Alpha".into(), "Beta".into()],
            standup_mandatory: true,
            ..BotConfig::default()
        };
        save_bot_config(&pool, &config).await.unwrap();

        assert_eq!(get_bot_config(&pool).await.unwrap(), Some(config));
    }
}
