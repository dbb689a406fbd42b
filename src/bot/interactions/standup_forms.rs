use crate::bot::interactions::ids::{StandupAction, StandupModal};
use crate::bot::{Data, Error};
use crate::database::models::BotConfig;
use crate::standup::{FormHandle, FormView, TaskList};
use crate::utils::format::truncate_message;
use crate::utils::validation::TaskForm;
use poise::serenity_prelude as serenity;
use std::collections::HashMap;

const PLACEHOLDER_LIMIT: usize = 100;

pub async fn handle_standup_interaction(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some(action) = StandupAction::parse(&interaction.data.custom_id) else {
        return respond_unknown(ctx, interaction).await;
    };

    let handle = FormHandle::new(interaction.id.get(), &interaction.token);
    let user_id = interaction.user.id.to_string();
    let orchestrator = &data.orchestrator;

    let outcome = match action {
        StandupAction::SelectFeeling => {
            let selected = match &interaction.data.kind {
                serenity::ComponentInteractionDataKind::StringSelect { values } => {
                    values.first().cloned()
                }
                _ => None,
            };
            orchestrator
                .submit_feeling(&handle, &user_id, selected.as_deref())
                .await
                .map(|_| ())
        }
        StandupAction::OpenTaskForm { which, add_another } => {
            let config = orchestrator.bot_config().await;
            let modal = task_modal(which, add_another, &config);
            interaction
                .create_response(&ctx.http, serenity::CreateInteractionResponse::Modal(modal))
                .await?;
            Ok(())
        }
        StandupAction::FinishTasks { which } => orchestrator
            .finish_tasks(&handle, &user_id, which)
            .await
            .map(|_| ()),
        StandupAction::OpenBlockersForm => {
            interaction
                .create_response(
                    &ctx.http,
                    serenity::CreateInteractionResponse::Modal(blockers_modal()),
                )
                .await?;
            Ok(())
        }
        StandupAction::Cancel => {
            orchestrator.cancel_flow(&user_id).await;
            if let Err(e) = data.gateway.update(&handle, &FormView::Cancelled).await {
                tracing::warn!("Failed to close cancelled standup form: {}", e);
            }
            Ok(())
        }
    };

    if let Err(e) = outcome {
        tracing::debug!("Standup action {:?} for {} ended with: {}", action, user_id, e);
    }
    Ok(())
}

pub async fn handle_standup_modal(
    ctx: &serenity::Context,
    interaction: &serenity::ModalInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some(modal) = StandupModal::parse(&interaction.data.custom_id) else {
        interaction
            .create_response(
                &ctx.http,
                serenity::CreateInteractionResponse::Message(
                    serenity::CreateInteractionResponseMessage::new()
                        .content("Unknown form")
                        .ephemeral(true),
                ),
            )
            .await?;
        return Ok(());
    };

    let handle = FormHandle::new(interaction.id.get(), &interaction.token);
    let user_id = interaction.user.id.to_string();
    let values = modal_values(&interaction.data.components);

    let outcome = match modal {
        StandupModal::Task { which, add_another } => data
            .orchestrator
            .submit_task(&handle, &user_id, which, &task_form(&values), add_another)
            .await
            .map(|_| ()),
        StandupModal::Blockers => {
            let blockers = values.get("blockers").map(String::as_str).unwrap_or("");
            data.orchestrator
                .submit_blockers(&handle, &user_id, blockers)
                .await
                .map(|_| ())
        }
    };

    if let Err(e) = outcome {
        tracing::debug!("Standup form {:?} for {} ended with: {}", modal, user_id, e);
    }
    Ok(())
}

async fn respond_unknown(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
) -> Result<(), Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content("This button is no longer supported")
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

/// Input values of a submitted modal keyed by input custom id.
fn modal_values(rows: &[serenity::ActionRow]) -> HashMap<String, String> {
    rows.iter()
        .flat_map(|row| row.components.iter())
        .filter_map(|component| match component {
            serenity::ActionRowComponent::InputText(input) => input
                .value
                .clone()
                .map(|value| (input.custom_id.clone(), value)),
            _ => None,
        })
        .collect()
}

fn task_form(values: &HashMap<String, String>) -> TaskForm {
    let field = |key: &str| values.get(key).cloned().unwrap_or_default();
    let (confidence, difficulty) = split_scores(values.get("scores").map(String::as_str));

    TaskForm {
        project: field("project"),
        ticket: field("ticket"),
        title: field("title"),
        time_estimate: field("time_estimate"),
        confidence,
        difficulty,
    }
}

/// Splits a `confidence/difficulty` answer such as `4/2`; blank halves are `None`.
fn split_scores(raw: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(raw) = raw else {
        return (None, None);
    };

    let mut parts = raw.splitn(2, '/').map(str::trim);
    let non_blank = |part: Option<&str>| part.filter(|p| !p.is_empty()).map(str::to_string);
    let confidence = non_blank(parts.next());
    let difficulty = non_blank(parts.next());
    (confidence, difficulty)
}

fn task_modal(which: TaskList, add_another: bool, config: &BotConfig) -> serenity::CreateModal {
    let title = match which {
        TaskList::Yesterday => "Yesterday's task",
        TaskList::Today => "Today's task",
    };
    let modal = StandupModal::Task { which, add_another };

    serenity::CreateModal::new(modal.custom_id(), title).components(vec![
        serenity::CreateActionRow::InputText(
            serenity::CreateInputText::new(serenity::InputTextStyle::Short, "Project", "project")
                .placeholder(truncate_message(&config.projects.join(", "), PLACEHOLDER_LIMIT))
                .required(true)
                .max_length(100),
        ),
        serenity::CreateActionRow::InputText(
            serenity::CreateInputText::new(serenity::InputTextStyle::Short, "Ticket", "ticket")
                .placeholder("e.g. ABC-123 (optional)")
                .required(false)
                .max_length(100),
        ),
        serenity::CreateActionRow::InputText(
            serenity::CreateInputText::new(serenity::InputTextStyle::Paragraph, "Task", "title")
                .placeholder("What is the task about?")
                .required(true)
                .max_length(1000),
        ),
        serenity::CreateActionRow::InputText(
            serenity::CreateInputText::new(
                serenity::InputTextStyle::Short,
                "Time estimate",
                "time_estimate",
            )
            .placeholder(truncate_message(
                &config.time_estimates.join(", "),
                PLACEHOLDER_LIMIT,
            ))
            .required(true)
            .max_length(20),
        ),
        serenity::CreateActionRow::InputText(
            serenity::CreateInputText::new(
                serenity::InputTextStyle::Short,
                "Confidence / difficulty (1-5)",
                "scores",
            )
            .placeholder("e.g. 4/2, blank means 3/3")
            .required(false)
            .max_length(7),
        ),
    ])
}

fn blockers_modal() -> serenity::CreateModal {
    serenity::CreateModal::new(StandupModal::Blockers.custom_id(), "Blockers").components(vec![
        serenity::CreateActionRow::InputText(
            serenity::CreateInputText::new(
                serenity::InputTextStyle::Paragraph,
                "Anything blocking you?",
                "blockers",
            )
            .placeholder("Leave empty if nothing is in your way")
            .required(false)
            .max_length(1000),
        ),
    ])
}
