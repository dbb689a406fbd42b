//! Renders standup forms as Discord interaction responses.

use crate::bot::interactions::ids::StandupAction;
use crate::database::models::Feeling;
use crate::standup::{FormGateway, FormHandle, FormView, GatewayError, TaskList};
use crate::utils::format::{
    feeling_emoji, format_error_message, format_standup_summary, format_success_message,
    format_task_list, truncate_message, DISCORD_MESSAGE_LIMIT,
};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use poise::serenity_prelude::Builder;
use std::sync::Arc;

pub struct DiscordGateway {
    http: Arc<serenity::Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }

    async fn respond(
        &self,
        handle: &FormHandle,
        response: serenity::CreateInteractionResponse,
    ) -> Result<(), GatewayError> {
        response
            .execute(
                self.http.as_ref(),
                (serenity::InteractionId::new(handle.interaction_id), handle.token.as_str()),
            )
            .await
            .map_err(|e| GatewayError::Platform(e.to_string()))
    }
}

#[async_trait]
impl FormGateway for DiscordGateway {
    async fn open(&self, handle: &FormHandle, view: &FormView) -> Result<(), GatewayError> {
        let message = render(view).ephemeral(true);
        self.respond(handle, serenity::CreateInteractionResponse::Message(message))
            .await
    }

    async fn update(&self, handle: &FormHandle, view: &FormView) -> Result<(), GatewayError> {
        self.respond(handle, serenity::CreateInteractionResponse::UpdateMessage(render(view)))
            .await
    }

    async fn report_error(&self, handle: &FormHandle, message: &str) -> Result<(), GatewayError> {
        let message = serenity::CreateInteractionResponseMessage::new()
            .content(format_error_message(message))
            .ephemeral(true);
        self.respond(handle, serenity::CreateInteractionResponse::Message(message))
            .await
    }

    async fn post_message(&self, channel_id: &str, content: &str) -> Result<(), GatewayError> {
        let id = channel_id
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .ok_or_else(|| GatewayError::InvalidChannel(channel_id.to_string()))?;

        serenity::ChannelId::new(id)
            .say(self.http.as_ref(), truncate_message(content, DISCORD_MESSAGE_LIMIT))
            .await
            .map(|_| ())
            .map_err(|e| GatewayError::Platform(e.to_string()))
    }
}

fn render(view: &FormView) -> serenity::CreateInteractionResponseMessage {
    let message = serenity::CreateInteractionResponseMessage::new();

    match view {
        FormView::Feeling { display_name } => {
            let options = Feeling::ALL
                .iter()
                .map(|f| {
                    serenity::CreateSelectMenuOption::new(
                        format!("{} {}", feeling_emoji(f.as_str()), f.label()),
                        f.as_str(),
                    )
                })
                .collect();
            let select = serenity::CreateSelectMenu::new(
                StandupAction::SelectFeeling.custom_id(),
                serenity::CreateSelectMenuKind::String { options },
            )
            .placeholder("How are you feeling today?");

            message
                .content(format!(
                    "👋 Hi {}! **Step 1/4**: how are you feeling today?",
                    display_name
                ))
                .components(vec![
                    serenity::CreateActionRow::SelectMenu(select),
                    serenity::CreateActionRow::Buttons(vec![cancel_button()]),
                ])
        }
        FormView::Tasks {
            which,
            entries,
            projects,
            time_estimates,
        } => {
            let heading = match which {
                TaskList::Yesterday => "**Step 2/4**: what did you work on yesterday?",
                TaskList::Today => "**Step 3/4**: what are you working on today?",
            };
            let content = format!(
                "{}\n\n{} task(s) so far:\n{}\n\nProjects: {}\nEstimates: {}",
                heading,
                entries.len(),
                format_task_list(entries),
                projects.join(", "),
                time_estimates.join(", ")
            );

            message
                .content(truncate_message(&content, DISCORD_MESSAGE_LIMIT))
                .components(vec![serenity::CreateActionRow::Buttons(vec![
                    serenity::CreateButton::new(
                        StandupAction::OpenTaskForm {
                            which: *which,
                            add_another: true,
                        }
                        .custom_id(),
                    )
                    .label("➕ Add task")
                    .style(serenity::ButtonStyle::Primary),
                    serenity::CreateButton::new(
                        StandupAction::OpenTaskForm {
                            which: *which,
                            add_another: false,
                        }
                        .custom_id(),
                    )
                    .label("✅ Add last task")
                    .style(serenity::ButtonStyle::Success),
                    serenity::CreateButton::new(
                        StandupAction::FinishTasks { which: *which }.custom_id(),
                    )
                    .label("⏭️ Done")
                    .style(serenity::ButtonStyle::Secondary),
                    cancel_button(),
                ])])
        }
        FormView::Blockers {
            yesterday_count,
            today_count,
        } => message
            .content(format!(
                "**Step 4/4**: anything blocking you?\n\nYesterday: {} task(s)\nToday: {} task(s)",
                yesterday_count, today_count
            ))
            .components(vec![serenity::CreateActionRow::Buttons(vec![
                serenity::CreateButton::new(StandupAction::OpenBlockersForm.custom_id())
                    .label("📝 Blockers & submit")
                    .style(serenity::ButtonStyle::Success),
                cancel_button(),
            ])]),
        FormView::Submitted { record, checked_in } => {
            let mut content = format_success_message("Standup submitted!\n\n");
            content.push_str(&format_standup_summary(record));
            if *checked_in {
                content.push_str("\n🟢 You are now checked in.");
            }
            message
                .content(truncate_message(&content, DISCORD_MESSAGE_LIMIT))
                .components(vec![])
        }
        FormView::Cancelled => message
            .content("Standup cancelled")
            .components(vec![]),
    }
}

fn cancel_button() -> serenity::CreateButton {
    serenity::CreateButton::new(StandupAction::Cancel.custom_id())
        .label("❌ Cancel")
        .style(serenity::ButtonStyle::Danger)
}
