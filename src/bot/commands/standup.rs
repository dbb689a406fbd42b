use crate::bot::commands::form_handle;
use crate::bot::{Context, Error};
use crate::utils::format::{format_error_message, format_info_message, format_success_message};
use crate::utils::time::current_date_in;

/// Fill in today's standup
#[poise::command(slash_command)]
pub async fn standup(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let user_id = ctx.author().id.to_string();
    let config = data.orchestrator.bot_config().await;
    let today = current_date_in(&config.timezone);

    match data.store.has_standup_on(&user_id, today).await {
        Ok(true) => {
            let reply = poise::CreateReply::default()
                .content(format_info_message("You already submitted today's standup."))
                .ephemeral(true);
            ctx.send(reply).await?;
            return Ok(());
        }
        Ok(false) => {}
        Err(e) => {
            tracing::error!("Failed to look up today's standup for {}: {}", user_id, e);
            ctx.say(format_error_message(&format!("Failed to load your standups: {}", e)))
                .await?;
            return Ok(());
        }
    }

    let Some(handle) = form_handle(ctx) else {
        ctx.say(format_error_message("Please use the slash command to start a standup."))
            .await?;
        return Ok(());
    };

    data.orchestrator
        .start_flow(&handle, &user_id, ctx.author().display_name())
        .await;
    Ok(())
}

/// Cancel the standup you are filling in
#[poise::command(slash_command)]
pub async fn standup_cancel(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id.to_string();

    let msg = if ctx.data().orchestrator.cancel_flow(&user_id).await {
        format_success_message("Standup cancelled")
    } else {
        format_info_message("You have no standup in progress.")
    };
    ctx.send(poise::CreateReply::default().content(msg).ephemeral(true))
        .await?;

    Ok(())
}
