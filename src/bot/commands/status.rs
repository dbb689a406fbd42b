use crate::bot::{Context, Error};
use crate::utils::attendance;
use crate::utils::format::{create_status_embed, format_error_message};
use crate::utils::time::current_date_in;

/// Show your check-in and standup status
#[poise::command(slash_command)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let user_id = ctx.author().id.to_string();
    let config = data.orchestrator.bot_config().await;
    let today = current_date_in(&config.timezone);

    match attendance::status(data.store.as_ref(), &user_id, today).await {
        Ok(current) => {
            let mut embed =
                create_status_embed(ctx.author().display_name(), &current, &config.timezone);
            if data.orchestrator.has_active_flow(&user_id).await {
                embed = embed.field("In progress", "You have an unfinished standup form.", false);
            }
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => {
            tracing::error!("Failed to load status for {}: {}", user_id, e);
            ctx.say(format_error_message(&format!("Failed to load your status: {}", e)))
                .await?;
        }
    }

    Ok(())
}
