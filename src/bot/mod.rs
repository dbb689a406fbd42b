pub mod commands;
pub mod gateway;
pub mod handlers;
pub mod interactions;

use crate::config::Config;
use crate::database;
use crate::database::store::{RecordStore, SqliteRecordStore};
use crate::standup::{FormGateway, MemoryFlowStateStore, StandupOrchestrator};
use anyhow::Result;
use gateway::DiscordGateway;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

#[derive(Clone)]
pub struct Data {
    pub store: Arc<dyn RecordStore>,
    pub orchestrator: Arc<StandupOrchestrator>,
    pub gateway: Arc<dyn FormGateway>,
    pub config: Config,
}

pub async fn create_bot(config: Config) -> Result<serenity::Client> {
    let pool = database::create_connection(&config.database_url).await?;
    let store: Arc<dyn RecordStore> = Arc::new(SqliteRecordStore::new(pool));

    let intents = serenity::GatewayIntents::non_privileged();
    let setup_config = config.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::attendance::checkin(),
                commands::attendance::checkout(),
                commands::standup::standup(),
                commands::standup::standup_cancel(),
                commands::status::status(),
                commands::admin::project_channel(),
                commands::admin::standup_config(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                let gateway: Arc<dyn FormGateway> = Arc::new(DiscordGateway::new(ctx.http.clone()));
                let orchestrator = Arc::new(StandupOrchestrator::new(
                    Arc::new(MemoryFlowStateStore::new()),
                    store.clone(),
                    gateway.clone(),
                ));
                orchestrator
                    .clone()
                    .spawn_sweeper(setup_config.sweep_interval, setup_config.session_max_age);

                Ok(Data {
                    store,
                    orchestrator,
                    gateway,
                    config: setup_config,
                })
            })
        })
        .build();

    let client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    Ok(client)
}
