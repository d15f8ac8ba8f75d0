use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    Chat, ChatId, ChatMember, ChatMemberKind, ChatMemberStatus, Recipient, UserId,
};
use teloxide::RequestError;

use crate::handlers::send_message::BetterSendMessage as _;
use crate::types::BotType;
use crate::wizard::SetupError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatType {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatType {
    pub fn is_group_like(&self) -> bool {
        matches!(self, ChatType::Group | ChatType::Supergroup)
    }
}

/// The parts of a Telegram chat the wizard cares about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatInfo {
    pub id: ChatId,
    pub kind: ChatType,
    pub username: Option<String>,
    pub title: Option<String>,
}

impl From<&Chat> for ChatInfo {
    fn from(chat: &Chat) -> Self {
        let kind = if chat.is_channel() {
            ChatType::Channel
        } else if chat.is_supergroup() {
            ChatType::Supergroup
        } else if chat.is_group() {
            ChatType::Group
        } else {
            ChatType::Private
        };

        ChatInfo {
            id: chat.id,
            kind,
            username: chat.username().map(str::to_owned),
            title: chat.title().map(str::to_owned),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

/// What the bot account is allowed to do inside a chat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BotMembership {
    pub status: MemberStatus,
    pub can_invite_users: bool,
}

impl BotMembership {
    pub fn is_admin(&self) -> bool {
        matches!(
            self.status,
            MemberStatus::Creator | MemberStatus::Administrator
        )
    }
}

impl From<&ChatMember> for BotMembership {
    fn from(member: &ChatMember) -> Self {
        let status = match member.kind.status() {
            ChatMemberStatus::Owner => MemberStatus::Creator,
            ChatMemberStatus::Administrator => MemberStatus::Administrator,
            ChatMemberStatus::Member => MemberStatus::Member,
            ChatMemberStatus::Restricted => MemberStatus::Restricted,
            ChatMemberStatus::Left => MemberStatus::Left,
            ChatMemberStatus::Banned => MemberStatus::Banned,
        };

        // Owners hold every right implicitly
        let can_invite_users = match &member.kind {
            ChatMemberKind::Owner(_) => true,
            ChatMemberKind::Administrator(admin) => admin.can_invite_users,
            _ => false,
        };

        BotMembership {
            status,
            can_invite_users,
        }
    }
}

/// How a chat is addressed in a lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatTarget {
    /// Public username, without the leading `@`.
    Username(String),
    Id(ChatId),
}

impl From<ChatTarget> for Recipient {
    fn from(target: ChatTarget) -> Self {
        match target {
            ChatTarget::Username(name) => Recipient::ChannelUsername(format!("@{}", name)),
            ChatTarget::Id(id) => Recipient::Id(id),
        }
    }
}

/// A message to send back to the user, with optional reply keyboard shortcuts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub buttons: Vec<String>,
}

impl Reply {
    pub fn text<T: Into<String>>(text: T) -> Self {
        Reply {
            text: text.into(),
            buttons: vec![],
        }
    }

    pub fn with_buttons<T: Into<String>>(text: T, buttons: &[&str]) -> Self {
        Reply {
            text: text.into(),
            buttons: buttons.iter().map(|b| b.to_string()).collect(),
        }
    }
}

/// The slice of the Bot API the setup wizard talks to.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn get_chat(&self, target: ChatTarget) -> Result<ChatInfo, SetupError>;

    /// Membership record of the bot account itself in `chat_id`.
    async fn get_bot_membership(&self, chat_id: ChatId) -> Result<BotMembership, SetupError>;

    async fn send_reply(&self, chat_id: ChatId, reply: Reply) -> Result<()>;
}

pub struct TelegramClient {
    bot: BotType,
    bot_id: UserId,
    timeout: Duration,
}

impl TelegramClient {
    pub fn new(bot: BotType, bot_id: UserId, timeout: Duration) -> Self {
        TelegramClient {
            bot,
            bot_id,
            timeout,
        }
    }

    async fn bounded<T, F>(&self, what: &str, request: F) -> Result<T, SetupError>
    where
        F: Future<Output = Result<T, RequestError>> + Send,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                log::warn!("{} failed: {:?}", what, e);
                Err(SetupError::ChatNotFound)
            }
            Err(_) => {
                log::warn!("{} timed out after {:?}", what, self.timeout);
                Err(SetupError::RequestTimedOut)
            }
        }
    }
}

#[async_trait]
impl PlatformClient for TelegramClient {
    async fn get_chat(&self, target: ChatTarget) -> Result<ChatInfo, SetupError> {
        log::debug!("get_chat: {:?}", target);

        let request = self.bot.get_chat(Recipient::from(target)).send();
        let chat = self.bounded("get_chat", request).await?;

        Ok(ChatInfo::from(&chat))
    }

    async fn get_bot_membership(&self, chat_id: ChatId) -> Result<BotMembership, SetupError> {
        log::debug!("get_bot_membership: {:?} in {:?}", self.bot_id, chat_id);

        let request = self.bot.get_chat_member(chat_id, self.bot_id).send();
        let member = self.bounded("get_chat_member", request).await?;

        Ok(BotMembership::from(&member))
    }

    async fn send_reply(&self, chat_id: ChatId, reply: Reply) -> Result<()> {
        self.bot
            .send_message_buttons(chat_id, reply.text, reply.buttons)
            .await?;

        Ok(())
    }
}
