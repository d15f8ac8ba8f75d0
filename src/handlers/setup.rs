use std::sync::Arc;
use std::time::Duration;

use teloxide::types::{Me, Message};

use super::send_message::BetterSendMessage as _;
use crate::platform::TelegramClient;
use crate::portal::PortalService;
use crate::types::{BotType, DialogueWithState, HandlerResult};
use crate::wizard::{self, InputShape, SetupDraft, Transition, WelcomeInput};

/// What the setup endpoints need besides the bot and the dialogue.
#[derive(Clone)]
pub struct SetupContext {
    pub portals: Option<Arc<dyn PortalService>>,
    pub api_timeout: Duration,
}

impl SetupContext {
    pub fn client(&self, bot: BotType, me: &Me) -> TelegramClient {
        TelegramClient::new(bot, me.user.id, self.api_timeout)
    }

    pub fn portal_service(&self) -> Option<&dyn PortalService> {
        self.portals.as_deref()
    }
}

pub async fn apply_transition(
    dialogue: &DialogueWithState,
    transition: Transition,
) -> HandlerResult {
    match transition {
        Transition::Stay => {}
        Transition::Next(state) => dialogue.update(state).await?,
        Transition::Finish => {
            // A lost session has nothing stored to remove
            if dialogue.get().await?.is_some() {
                dialogue.exit().await?;
            }
        }
    }

    Ok(())
}

/// Only the user who started a setup may answer its steps.
pub fn sent_by_owner(draft: &SetupDraft, msg: &Message) -> bool {
    msg.from
        .as_ref()
        .map(|user| user.id == draft.owner_id)
        .unwrap_or(false)
}

pub async fn receive_channel(
    ctx: SetupContext,
    bot: BotType,
    me: Me,
    dialogue: DialogueWithState,
    msg: Message,
    draft: SetupDraft,
) -> HandlerResult {
    if !sent_by_owner(&draft, &msg) {
        log::debug!("Ignoring channel answer from a non-owner in {:?}", msg.chat.id);
        return Ok(());
    }

    let client = ctx.client(bot, &me);
    let transition =
        wizard::receive_channel(&client, msg.chat.id, draft, InputShape::from_message(&msg)).await?;

    apply_transition(&dialogue, transition).await
}

pub async fn receive_group(
    ctx: SetupContext,
    bot: BotType,
    me: Me,
    dialogue: DialogueWithState,
    msg: Message,
    draft: SetupDraft,
) -> HandlerResult {
    if !sent_by_owner(&draft, &msg) {
        log::debug!("Ignoring group answer from a non-owner in {:?}", msg.chat.id);
        return Ok(());
    }

    let client = ctx.client(bot, &me);
    let transition =
        wizard::receive_group(&client, msg.chat.id, draft, InputShape::from_message(&msg)).await?;

    apply_transition(&dialogue, transition).await
}

pub async fn receive_welcome(
    ctx: SetupContext,
    bot: BotType,
    me: Me,
    dialogue: DialogueWithState,
    msg: Message,
    draft: SetupDraft,
) -> HandlerResult {
    if !sent_by_owner(&draft, &msg) {
        log::debug!("Ignoring welcome answer from a non-owner in {:?}", msg.chat.id);
        return Ok(());
    }

    let client = ctx.client(bot, &me);

    let transition = match msg.text() {
        Some(text) => {
            wizard::receive_welcome(
                &client,
                ctx.portal_service(),
                msg.chat.id,
                Some(draft),
                WelcomeInput::Text(text.to_string()),
            )
            .await?
        }
        None => wizard::repeat_welcome_prompt(&client, msg.chat.id).await?,
    };

    apply_transition(&dialogue, transition).await
}

/// Messages that arrive while no setup is running.
pub async fn receive_idle(bot: BotType, msg: Message) -> HandlerResult {
    log::debug!("Ignoring idle message in {:?}", msg.chat.id);

    if msg.chat.is_private() {
        bot.send_message_easy(msg.chat.id, "Send /portal setup to link a channel to a group.")
            .await?;
    }

    Ok(())
}
