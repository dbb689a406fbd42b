pub mod admin;
pub mod attendance;
pub mod standup;
pub mod status;

use crate::bot::Context;
use crate::standup::FormHandle;

/// Handle for answering the slash command interaction behind `ctx`.
fn form_handle(ctx: Context<'_>) -> Option<FormHandle> {
    match ctx {
        poise::Context::Application(app) => Some(FormHandle::new(
            app.interaction.id.get(),
            &app.interaction.token,
        )),
        poise::Context::Prefix(_) => None,
    }
}

fn mention(ctx: Context<'_>) -> String {
    format!("<@{}>", ctx.author().id)
}
