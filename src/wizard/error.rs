use thiserror::Error;

use crate::platform::ChatType;

/// Everything that can go wrong while walking a user through portal setup.
///
/// None of these leave the wizard as a structured error: the step handlers
/// turn them into a reply and decide whether the conversation survives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("input does not match any accepted shape")]
    InputFormatInvalid,

    #[error("chat could not be found or is not accessible")]
    ChatNotFound,

    #[error("chat is a {found:?}, expected a {expected}")]
    NotRequiredChatType {
        expected: &'static str,
        found: ChatType,
    },

    #[error("bot is not an administrator in the chat")]
    BotNotAdmin,

    #[error("bot is not allowed to invite users")]
    BotLacksInvitePermission,

    #[error("setup draft is missing or incomplete")]
    SessionDataLost,

    #[error("portal service is not available")]
    ServiceUnavailable,

    #[error("portal service did not create a portal")]
    PortalCreationFailed,

    #[error("platform request timed out")]
    RequestTimedOut,
}

impl SetupError {
    /// Whether the conversation has to end after reporting this error.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SetupError::SessionDataLost
                | SetupError::ServiceUnavailable
                | SetupError::PortalCreationFailed
        )
    }

    /// Text shown to the user. `target` names the kind of chat the current
    /// step is asking for ("channel" or "group").
    pub fn user_message(&self, target: &str) -> String {
        match self {
            SetupError::InputFormatInvalid => "❌ Invalid input!".to_string(),
            SetupError::ChatNotFound => format!(
                "❌ Could not find that {target} or I don't have access to it.\n\n\
                Please:\n\
                1. Make sure the username is correct\n\
                2. Make me an admin in the {target}\n\
                3. Try forwarding a message from the {target} instead"
            ),
            SetupError::NotRequiredChatType { expected, .. } => format!(
                "❌ That's not a {expected}!\n\n\
                Please send a {expected} username or forward a message from the {expected}."
            ),
            SetupError::BotNotAdmin => format!(
                "❌ I'm not an admin in that {target}!\n\n\
                Please make me an admin and try again."
            ),
            SetupError::BotLacksInvitePermission => {
                "❌ I don't have permission to create invite links!\n\n\
                Please give me <i>Invite users via link</i> permission and try again."
                    .to_string()
            }
            SetupError::SessionDataLost => {
                "❌ Setup data lost. Please start over with /portal setup".to_string()
            }
            SetupError::ServiceUnavailable => {
                "❌ Portal service not available. Please contact the bot admin.".to_string()
            }
            SetupError::PortalCreationFailed => {
                "❌ Failed to create portal. Please try again or contact support.".to_string()
            }
            SetupError::RequestTimedOut => format!(
                "❌ Telegram took too long to answer while checking that {target}. Please try again."
            ),
        }
    }
}
