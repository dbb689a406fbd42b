use crate::bot::commands::{form_handle, mention};
use crate::bot::{Context, Error};
use crate::utils::attendance::{self, CheckInOutcome, CheckOutOutcome, Member};
use crate::utils::format::{format_error_message, format_success_message};
use crate::utils::time::{current_date_in, format_duration_minutes, format_time_in};

fn member(ctx: Context<'_>) -> Member {
    Member {
        user_id: ctx.author().id.to_string(),
        display_name: ctx.author().display_name().to_string(),
        contact: mention(ctx),
    }
}

/// Check in for the day
#[poise::command(slash_command)]
pub async fn checkin(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let member = member(ctx);
    let config = data.orchestrator.bot_config().await;
    let today = current_date_in(&config.timezone);

    match attendance::check_in(data.store.as_ref(), &member, &config, today).await {
        Ok(CheckInOutcome::AlreadyCheckedIn { since }) => {
            let msg = format_error_message(&format!(
                "You are already checked in (since {}). Use `/checkout` first.",
                format_time_in(since, &config.timezone)
            ));
            ctx.say(msg).await?;
        }
        Ok(CheckInOutcome::StandupRequired) => {
            let Some(handle) = form_handle(ctx) else {
                ctx.say(format_error_message("Please use the slash command to check in."))
                    .await?;
                return Ok(());
            };
            // The standup form answers the interaction; the check-in lands when it is submitted.
            data.orchestrator
                .start_flow_for_check_in(
                    &handle,
                    &member.user_id,
                    &member.display_name,
                    &member.contact,
                )
                .await;
        }
        Ok(CheckInOutcome::Recorded(record)) => {
            let msg = format_success_message(&format!(
                "Checked in ({})",
                format_time_in(record.created_at, &config.timezone)
            ));
            ctx.say(msg).await?;
        }
        Err(e) => {
            tracing::error!("Check-in failed for {}: {}", member.user_id, e);
            ctx.say(format_error_message(&format!("Failed to record your check-in: {}", e)))
                .await?;
        }
    }

    Ok(())
}

/// Check out for the day
#[poise::command(slash_command)]
pub async fn checkout(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let member = member(ctx);
    let config = data.orchestrator.bot_config().await;

    match attendance::check_out(data.store.as_ref(), &member).await {
        Ok(CheckOutOutcome::NotCheckedIn) => {
            ctx.say(format_error_message(
                "You are not checked in. Use `/checkin` first.",
            ))
            .await?;
        }
        Ok(CheckOutOutcome::Recorded {
            record,
            worked_minutes,
        }) => {
            let msg = format_success_message(&format!(
                "Checked out ({})\nWorked: {}",
                format_time_in(record.created_at, &config.timezone),
                format_duration_minutes(worked_minutes)
            ));
            ctx.say(msg).await?;
        }
        Err(e) => {
            tracing::error!("Check-out failed for {}: {}", member.user_id, e);
            ctx.say(format_error_message(&format!("Failed to record your check-out: {}", e)))
                .await?;
        }
    }

    Ok(())
}
