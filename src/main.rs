use dotenv::dotenv;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands as _;

mod config;
mod handlers;
mod platform;
mod portal;
mod types;
mod wizard;

use config::Config;
use handlers::command::{self, Command};
use handlers::setup::{self, SetupContext};
use types::ConversationState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    log::info!("Starting portal bot");

    let config = Config::from_env()?;
    log::debug!("Config: {:?}", config);

    let ctx = SetupContext {
        portals: config.portal_backend.build(),
        api_timeout: config.api_timeout,
    };
    if ctx.portals.is_none() {
        log::warn!("No portal service configured, setups will not complete");
    }

    let bot = Bot::from_env().parse_mode(teloxide::types::ParseMode::Html);

    bot.set_my_commands(Command::bot_commands()).await?;

    let is_command = |msg: Message| {
        msg.text()
            .map(|text| text.starts_with('/'))
            .unwrap_or(false)
    };

    // Groups and channels never enter the wizard
    let public_tree = dptree::filter(|msg: Message| !msg.chat.is_private())
        .filter(is_command)
        .endpoint(command::receive_public_command);

    let private_tree = dptree::filter(|msg: Message| msg.chat.is_private())
        .enter_dialogue::<Message, InMemStorage<ConversationState>, ConversationState>()
        .branch(dptree::filter(is_command).endpoint(command::receive_command))
        .branch(dptree::case![ConversationState::Idle].endpoint(setup::receive_idle))
        .branch(
            dptree::case![ConversationState::AwaitingChannel { draft }]
                .endpoint(setup::receive_channel),
        )
        .branch(
            dptree::case![ConversationState::AwaitingGroup { draft }]
                .endpoint(setup::receive_group),
        )
        .branch(
            dptree::case![ConversationState::AwaitingWelcome { draft }]
                .endpoint(setup::receive_welcome),
        );

    let message_tree = Update::filter_message()
        .branch(public_tree)
        .branch(private_tree);

    log::debug!("Starting dispatcher");

    Dispatcher::builder(bot, message_tree)
        .dependencies(dptree::deps![
            InMemStorage::<ConversationState>::new(),
            ctx
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
