use anyhow::Result;
use teloxide::types::{ChatId, UserId};

use crate::platform::{ChatInfo, ChatTarget, ChatType, PlatformClient, Reply};
use crate::portal::PortalService;
use crate::types::ConversationState;
use crate::wizard::draft::{ChannelBinding, GroupBinding, SetupDraft};
use crate::wizard::input::{is_valid_handle, InputShape, WelcomeInput};
use crate::wizard::messages::{self, CANCEL};
use crate::wizard::SetupError;

/// Where the conversation goes after a step has replied.
#[derive(Debug, PartialEq)]
pub enum Transition {
    /// Keep the current state (and the draft stored with it).
    Stay,
    Next(ConversationState),
    /// Leave the dialogue, dropping the draft.
    Finish,
}

pub async fn start<P>(client: &P, chat_id: ChatId, owner_id: UserId) -> Result<Transition>
where
    P: PlatformClient + ?Sized,
{
    log::debug!("Starting portal setup for {:?}", owner_id);

    client.send_reply(chat_id, messages::setup_started()).await?;

    Ok(Transition::Next(ConversationState::AwaitingChannel {
        draft: SetupDraft::new(owner_id),
    }))
}

pub async fn receive_channel<P>(
    client: &P,
    chat_id: ChatId,
    mut draft: SetupDraft,
    input: InputShape,
) -> Result<Transition>
where
    P: PlatformClient + ?Sized,
{
    log::debug!("Channel step input from {:?}: {:?}", draft.owner_id, input);

    let channel = match verify_channel(client, input).await {
        Ok(channel) => channel,
        Err(e) => {
            log::debug!("Channel rejected for {:?}: {}", draft.owner_id, e);

            let text = e.user_message("channel");
            let reply = match e {
                SetupError::InputFormatInvalid | SetupError::NotRequiredChatType { .. } => {
                    messages::channel_usage(&text)
                }
                _ => Reply::with_buttons(text, &[CANCEL]),
            };
            client.send_reply(chat_id, reply).await?;
            return Ok(Transition::Stay);
        }
    };

    let title = display_title(&channel);
    draft.bind_channel(ChannelBinding {
        id: channel.id,
        username: channel.username,
        title: title.clone(),
    });

    client
        .send_reply(chat_id, messages::channel_verified(&title))
        .await?;

    Ok(Transition::Next(ConversationState::AwaitingGroup { draft }))
}

async fn verify_channel<P>(client: &P, input: InputShape) -> Result<ChatInfo, SetupError>
where
    P: PlatformClient + ?Sized,
{
    let chat = match input {
        InputShape::Forwarded(chat) => chat,
        InputShape::Handle(name) => client.get_chat(ChatTarget::Username(name)).await?,
        _ => return Err(SetupError::InputFormatInvalid),
    };

    if chat.kind != ChatType::Channel {
        return Err(SetupError::NotRequiredChatType {
            expected: "channel",
            found: chat.kind,
        });
    }

    let membership = client.get_bot_membership(chat.id).await?;
    if !membership.is_admin() {
        return Err(SetupError::BotNotAdmin);
    }

    Ok(chat)
}

pub async fn receive_group<P>(
    client: &P,
    chat_id: ChatId,
    mut draft: SetupDraft,
    input: InputShape,
) -> Result<Transition>
where
    P: PlatformClient + ?Sized,
{
    log::debug!("Group step input from {:?}: {:?}", draft.owner_id, input);

    let group = match verify_group(client, input).await {
        Ok(group) => group,
        Err(e) => {
            log::debug!("Group rejected for {:?}: {}", draft.owner_id, e);

            let text = e.user_message("group");
            let reply = match e {
                SetupError::InputFormatInvalid | SetupError::NotRequiredChatType { .. } => {
                    messages::group_usage(&text)
                }
                _ => Reply::with_buttons(text, &[CANCEL]),
            };
            client.send_reply(chat_id, reply).await?;
            return Ok(Transition::Stay);
        }
    };

    let title = display_title(&group);
    if let Err(e) = draft.bind_group(GroupBinding {
        id: group.id,
        title: title.clone(),
    }) {
        log::warn!("Group bound before channel for {:?}", draft.owner_id);

        client
            .send_reply(chat_id, Reply::text(e.user_message("group")))
            .await?;
        return Ok(if e.is_terminal() {
            Transition::Finish
        } else {
            Transition::Stay
        });
    }

    log::debug!(
        "Draft for {:?}: channel {:?}, group {:?}",
        draft.owner_id,
        draft.channel(),
        draft.group()
    );

    client
        .send_reply(chat_id, messages::group_verified(&title))
        .await?;

    Ok(Transition::Next(ConversationState::AwaitingWelcome { draft }))
}

async fn verify_group<P>(client: &P, input: InputShape) -> Result<ChatInfo, SetupError>
where
    P: PlatformClient + ?Sized,
{
    let chat = match input {
        InputShape::Forwarded(chat) => chat,
        InputShape::Handle(name) => client.get_chat(ChatTarget::Username(name)).await?,
        InputShape::NumericId(id) => client.get_chat(ChatTarget::Id(id)).await?,
        // Groups may also be named without the `@`
        InputShape::PlainText(name) if is_valid_handle(&name) => {
            client.get_chat(ChatTarget::Username(name)).await?
        }
        _ => return Err(SetupError::InputFormatInvalid),
    };

    if !chat.kind.is_group_like() {
        return Err(SetupError::NotRequiredChatType {
            expected: "group",
            found: chat.kind,
        });
    }

    let membership = client.get_bot_membership(chat.id).await?;
    if !membership.is_admin() {
        return Err(SetupError::BotNotAdmin);
    }
    if !membership.can_invite_users {
        return Err(SetupError::BotLacksInvitePermission);
    }

    Ok(chat)
}

/// Final step. `draft` is `None` when the conversation state was lost, e.g.
/// after a restart.
pub async fn receive_welcome<P>(
    client: &P,
    portals: Option<&dyn PortalService>,
    chat_id: ChatId,
    draft: Option<SetupDraft>,
    input: WelcomeInput,
) -> Result<Transition>
where
    P: PlatformClient + ?Sized,
{
    let welcome_message = input.into_override();

    let portal = match draft
        .ok_or(SetupError::SessionDataLost)
        .and_then(|draft| draft.into_new_portal(welcome_message))
    {
        Ok(portal) => portal,
        Err(e) => return finish_with(client, chat_id, e).await,
    };

    let Some(service) = portals else {
        log::warn!(
            "Portal setup finished for {:?} but no portal service is configured",
            portal.owner_id
        );
        return finish_with(client, chat_id, SetupError::ServiceUnavailable).await;
    };

    let owner_id = portal.owner_id;
    let channel_username = portal.public_channel_username.clone();
    let group_title = portal.private_group_title.clone();

    let reply = match service.create_portal(portal).await {
        Ok(Some(portal_id)) => {
            log::debug!("Portal {} created for {:?}", portal_id, owner_id);
            Reply::text(service.format_setup_message(
                &portal_id,
                channel_username.as_deref(),
                &group_title,
            ))
        }
        Ok(None) => {
            log::debug!("Portal service declined portal for {:?}", owner_id);
            Reply::text(SetupError::PortalCreationFailed.user_message("portal"))
        }
        Err(e) => {
            log::error!("Failed to create portal for {:?}: {:?}", owner_id, e);
            Reply::text(SetupError::PortalCreationFailed.user_message("portal"))
        }
    };

    client.send_reply(chat_id, reply).await?;

    Ok(Transition::Finish)
}

/// Welcome step got something that isn't text.
pub async fn repeat_welcome_prompt<P>(client: &P, chat_id: ChatId) -> Result<Transition>
where
    P: PlatformClient + ?Sized,
{
    client.send_reply(chat_id, messages::welcome_usage()).await?;
    Ok(Transition::Stay)
}

pub async fn cancel<P>(client: &P, chat_id: ChatId) -> Result<Transition>
where
    P: PlatformClient + ?Sized,
{
    client.send_reply(chat_id, messages::cancelled()).await?;
    Ok(Transition::Finish)
}

async fn finish_with<P>(client: &P, chat_id: ChatId, error: SetupError) -> Result<Transition>
where
    P: PlatformClient + ?Sized,
{
    log::debug!("Ending portal setup in {:?}: {}", chat_id, error);

    client
        .send_reply(chat_id, Reply::text(error.user_message("portal")))
        .await?;
    Ok(Transition::Finish)
}

fn display_title(chat: &ChatInfo) -> String {
    match (&chat.title, &chat.username) {
        (Some(title), _) => title.clone(),
        (None, Some(username)) => format!("@{}", username),
        (None, None) => chat.id.0.to_string(),
    }
}
