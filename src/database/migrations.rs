use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    create_standups_table(pool).await?;
    create_check_ins_table(pool).await?;
    create_project_channels_table(pool).await?;
    create_bot_config_table(pool).await?;

    info!("Database migrations completed successfully");
    Ok(())
}

async fn create_standups_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS standups (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            display_name TEXT NOT NULL,
            feeling TEXT NOT NULL,
            yesterday_tasks TEXT NOT NULL,
            today_tasks TEXT NOT NULL,
            blockers TEXT NOT NULL DEFAULT '',
            date DATE NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_standups_user_date ON standups (user_id, date)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_check_ins_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS check_ins (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            display_name TEXT NOT NULL,
            contact TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('check_in', 'check_out')),
            standup_id INTEGER,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (standup_id) REFERENCES standups (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_project_channels_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS project_channels (
            id INTEGER PRIMARY KEY,
            project TEXT UNIQUE NOT NULL COLLATE NOCASE,
            channel_id TEXT NOT NULL,
            channel_name TEXT NOT NULL,
            active BOOLEAN DEFAULT TRUE,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_bot_config_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bot_config (
            key TEXT PRIMARY KEY,
            projects TEXT NOT NULL,
            time_estimates TEXT NOT NULL,
            standup_mandatory BOOLEAN NOT NULL DEFAULT FALSE,
            timezone TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
