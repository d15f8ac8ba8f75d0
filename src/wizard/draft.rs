use teloxide::types::{ChatId, UserId};

use crate::portal::NewPortal;
use crate::wizard::SetupError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelBinding {
    pub id: ChatId,
    pub username: Option<String>,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupBinding {
    pub id: ChatId,
    pub title: String,
}

/// Answers collected so far by one user's setup conversation.
///
/// Lives inside the dialogue state, so it disappears together with the
/// conversation. Fields fill strictly in step order: a group can only be bound
/// after a channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetupDraft {
    pub owner_id: UserId,
    channel: Option<ChannelBinding>,
    group: Option<GroupBinding>,
}

impl SetupDraft {
    pub fn new(owner_id: UserId) -> Self {
        SetupDraft {
            owner_id,
            channel: None,
            group: None,
        }
    }

    pub fn channel(&self) -> Option<&ChannelBinding> {
        self.channel.as_ref()
    }

    pub fn group(&self) -> Option<&GroupBinding> {
        self.group.as_ref()
    }

    pub fn bind_channel(&mut self, channel: ChannelBinding) {
        self.channel = Some(channel);
    }

    pub fn bind_group(&mut self, group: GroupBinding) -> Result<(), SetupError> {
        if self.channel.is_none() {
            return Err(SetupError::SessionDataLost);
        }

        self.group = Some(group);
        Ok(())
    }

    /// Consumes the draft into a portal creation request.
    pub fn into_new_portal(self, welcome_message: Option<String>) -> Result<NewPortal, SetupError> {
        match (self.channel, self.group) {
            (Some(channel), Some(group)) => Ok(NewPortal {
                owner_id: self.owner_id,
                public_channel_id: channel.id,
                public_channel_username: channel.username,
                public_channel_title: channel.title,
                private_group_id: group.id,
                private_group_title: group.title,
                welcome_message,
            }),
            _ => Err(SetupError::SessionDataLost),
        }
    }
}
