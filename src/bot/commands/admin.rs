//! Server-admin commands for project channel routing and standup settings.

use crate::bot::{Context, Error};
use crate::database::models::{BotConfig, BotConfigPatch};
use crate::utils::format::{
    create_info_embed, format_channel_mappings, format_error_message, format_success_message,
};
use crate::utils::time::is_valid_timezone;
use poise::serenity_prelude as serenity;

/// Route standup summaries to project channels
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "MANAGE_GUILD",
    subcommands("channel_set", "channel_remove", "channel_list"),
    subcommand_required
)]
pub async fn project_channel(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Post standups that mention a project to a channel
#[poise::command(slash_command, guild_only, rename = "set")]
pub async fn channel_set(
    ctx: Context<'_>,
    #[description = "Project name"] project: String,
    #[description = "Channel that receives the standups"] channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let project = project.trim();
    if project.is_empty() {
        ctx.say(format_error_message("Project name must not be empty")).await?;
        return Ok(());
    }

    let store = &ctx.data().store;
    match store
        .upsert_channel_mapping(project, &channel.id.to_string(), &channel.name)
        .await
    {
        Ok(()) => {
            tracing::info!("Project {} now posts to #{} ({})", project, channel.name, channel.id);
            let msg = format_success_message(&format!(
                "Standups for **{}** will be posted to <#{}>",
                project, channel.id
            ));
            ctx.say(msg).await?;
        }
        Err(e) => {
            tracing::error!("Failed to map project {}: {}", project, e);
            ctx.say(format_error_message(&format!("Failed to save the mapping: {}", e)))
                .await?;
        }
    }

    Ok(())
}

/// Stop posting standups for a project
#[poise::command(slash_command, guild_only, rename = "remove")]
pub async fn channel_remove(
    ctx: Context<'_>,
    #[description = "Project name"] project: String,
) -> Result<(), Error> {
    let project = project.trim();

    match ctx.data().store.deactivate_channel_mapping(project).await {
        Ok(true) => {
            tracing::info!("Project {} no longer posts standups", project);
            ctx.say(format_success_message(&format!(
                "Standups for **{}** will no longer be posted",
                project
            )))
            .await?;
        }
        Ok(false) => {
            ctx.say(format_error_message(&format!(
                "No active channel is configured for **{}**",
                project
            )))
            .await?;
        }
        Err(e) => {
            tracing::error!("Failed to remove mapping for {}: {}", project, e);
            ctx.say(format_error_message(&format!("Failed to remove the mapping: {}", e)))
                .await?;
        }
    }

    Ok(())
}

/// List project channels
#[poise::command(slash_command, guild_only, rename = "list")]
pub async fn channel_list(ctx: Context<'_>) -> Result<(), Error> {
    match ctx.data().store.channel_mappings().await {
        Ok(mappings) => {
            let embed = create_info_embed("📢 Project channels", &format_channel_mappings(&mappings));
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => {
            tracing::error!("Failed to list channel mappings: {}", e);
            ctx.say(format_error_message(&format!("Failed to load the mappings: {}", e)))
                .await?;
        }
    }

    Ok(())
}

/// View or change standup settings
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "MANAGE_GUILD",
    subcommands("config_show", "config_set"),
    subcommand_required
)]
pub async fn standup_config(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show the current standup settings
#[poise::command(slash_command, guild_only, rename = "show")]
pub async fn config_show(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let config = data.orchestrator.bot_config().await;
    let max_age_minutes = data.config.session_max_age.as_secs() / 60;

    let embed = create_info_embed("⚙️ Standup settings", &describe_config(&config))
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Unfinished standups expire after {} minutes of inactivity",
            max_age_minutes
        )));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Change standup settings; omitted options keep their value
#[poise::command(slash_command, guild_only, rename = "set")]
pub async fn config_set(
    ctx: Context<'_>,
    #[description = "Comma-separated project names"] projects: Option<String>,
    #[description = "Comma-separated time estimates"] estimates: Option<String>,
    #[description = "Require a standup before checking in"] mandatory: Option<bool>,
    #[description = "UTC offset such as +09:00"] timezone: Option<String>,
) -> Result<(), Error> {
    let patch = match build_patch(projects, estimates, mandatory, timezone) {
        Ok(patch) => patch,
        Err(message) => {
            ctx.say(format_error_message(&message)).await?;
            return Ok(());
        }
    };
    if patch.is_empty() {
        ctx.say(format_error_message("Nothing to change")).await?;
        return Ok(());
    }

    match ctx.data().store.update_bot_config(patch).await {
        Ok(config) => {
            tracing::info!("Standup settings updated by {}", ctx.author().id);
            let embed = create_info_embed("⚙️ Standup settings updated", &describe_config(&config));
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => {
            tracing::error!("Failed to update standup settings: {}", e);
            ctx.say(format_error_message(&format!("Failed to save the settings: {}", e)))
                .await?;
        }
    }

    Ok(())
}

fn build_patch(
    projects: Option<String>,
    estimates: Option<String>,
    mandatory: Option<bool>,
    timezone: Option<String>,
) -> Result<BotConfigPatch, String> {
    let projects = projects.map(|raw| split_list(&raw));
    if projects.as_ref().is_some_and(Vec::is_empty) {
        return Err("At least one project is required".to_string());
    }

    let time_estimates = estimates.map(|raw| split_list(&raw));
    if time_estimates.as_ref().is_some_and(Vec::is_empty) {
        return Err("At least one time estimate is required".to_string());
    }

    let timezone = timezone.map(|tz| tz.trim().to_string());
    if let Some(tz) = timezone.as_deref() {
        if !is_valid_timezone(tz) {
            return Err(format!("{} is not a UTC offset like +09:00", tz));
        }
    }

    Ok(BotConfigPatch {
        projects,
        time_estimates,
        standup_mandatory: mandatory,
        timezone,
    })
}

/// Splits a comma-separated option, dropping blanks and repeats.
fn split_list(raw: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !items.iter().any(|existing| existing.eq_ignore_ascii_case(item)) {
            items.push(item.to_string());
        }
    }
    items
}

fn describe_config(config: &BotConfig) -> String {
    format!(
        "**Projects:** {}\n**Time estimates:** {}\n**Standup before check-in:** {}\n**Timezone:** {}",
        config.projects.join(", "),
        config.time_estimates.join(", "),
        if config.standup_mandatory { "required" } else { "optional" },
        config.timezone
    )
}
