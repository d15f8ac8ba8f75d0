use teloxide::{
    adaptors::DefaultParseMode, dispatching::dialogue::InMemStorage, prelude::Dialogue, Bot,
};

use crate::wizard::SetupDraft;

pub type HandlerResult = anyhow::Result<()>;
pub type DialogueWithState = Dialogue<ConversationState, InMemStorage<ConversationState>>;

pub type BotType = DefaultParseMode<Bot>;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum ConversationState {
    #[default]
    Idle,

    AwaitingChannel {
        draft: SetupDraft,
    },
    AwaitingGroup {
        draft: SetupDraft,
    },
    AwaitingWelcome {
        draft: SetupDraft,
    },
}

impl ConversationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ConversationState::Idle)
    }

    pub fn draft(&self) -> Option<&SetupDraft> {
        match self {
            ConversationState::Idle => None,
            ConversationState::AwaitingChannel { draft }
            | ConversationState::AwaitingGroup { draft }
            | ConversationState::AwaitingWelcome { draft } => Some(draft),
        }
    }
}
