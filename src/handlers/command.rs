use teloxide::{
    macros::BotCommands,
    types::{Me, Message},
    utils::command::BotCommands as _,
};

use super::send_message::BetterSendMessage;
use super::setup::{apply_transition, sent_by_owner, SetupContext};
use crate::types::{BotType, ConversationState, DialogueWithState, HandlerResult};
use crate::wizard::{self, SetupDraft, WelcomeInput};

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "Show all help for this bot")]
    Help,

    #[command(description = "Start using this bot")]
    Start,

    #[command(description = "Link a public channel to a private group, use: /portal setup")]
    Portal(String),

    #[command(description = "Stop the portal setup")]
    Cancel,

    #[command(description = "Use the default welcome message during setup")]
    Skip,
}

/// Only `/portal setup` opens the wizard.
pub fn is_setup_argument(argument: &str) -> bool {
    argument.trim() == "setup"
}

/// What a command does, given the state of the sender's conversation.
#[derive(Debug, PartialEq)]
pub enum CommandAction {
    Help,
    Start,
    PortalUsage,
    AlreadyRunning,
    StartSetup,
    NothingToCancel,
    CancelSetup,
    /// `None` when `/skip` arrives after the session was lost.
    Skip(Option<SetupDraft>),
    CannotSkip,
    /// Unknown `/...` text sent as the welcome message.
    WelcomeText(SetupDraft),
    Unknown,
}

/// `command` is `None` when the text did not parse as one of ours.
pub fn command_action(state: ConversationState, command: Option<Command>) -> CommandAction {
    let Some(command) = command else {
        return match state {
            ConversationState::AwaitingWelcome { draft } => CommandAction::WelcomeText(draft),
            _ => CommandAction::Unknown,
        };
    };

    match command {
        Command::Help => CommandAction::Help,
        Command::Start => CommandAction::Start,
        Command::Portal(argument) if !is_setup_argument(&argument) => CommandAction::PortalUsage,
        Command::Portal(_) if !state.is_idle() => CommandAction::AlreadyRunning,
        Command::Portal(_) => CommandAction::StartSetup,
        Command::Cancel if state.is_idle() => CommandAction::NothingToCancel,
        Command::Cancel => CommandAction::CancelSetup,
        Command::Skip => match state {
            ConversationState::AwaitingWelcome { draft } => CommandAction::Skip(Some(draft)),
            // Skipping with no setup running means the session was lost
            ConversationState::Idle => CommandAction::Skip(None),
            _ => CommandAction::CannotSkip,
        },
    }
}

fn help_text() -> String {
    format!(
        "<b>Portals</b>\n\
        A portal links your public channel to a private group. \
        People coming from the channel have to verify they are human \
        before they get an invite to the group.\n\
        \n<b>Setup</b>\n\
        Make me an admin in both chats, and give me the \
        <i>Invite users via link</i> permission in the group. \
        Then run <code>/portal setup</code> in a private chat with me \
        and follow the three steps.\n\
        \n<b>Commands</b>\n\
        {}",
        Command::descriptions()
    )
}

const START_TEXT: &str = "You can link a channel to a private group with /portal setup.\n\
    You can also use /help to get more information";

pub async fn receive_command(
    ctx: SetupContext,
    bot: BotType,
    me: Me,
    dialogue: DialogueWithState,
    msg: Message,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let state = dialogue.get_or_default().await?;
    log::debug!("Command {:?} in state {:?}", text, state);

    if let Some(draft) = state.draft() {
        if !sent_by_owner(draft, &msg) {
            log::debug!("Ignoring command from a non-owner in {:?}", msg.chat.id);
            return Ok(());
        }
    }

    let command = Command::parse(text, me.username()).ok();

    match command_action(state, command) {
        CommandAction::Help => {
            bot.send_message_easy(msg.chat.id, help_text()).await?;
        }
        CommandAction::Start => {
            bot.send_message_easy(msg.chat.id, START_TEXT).await?;
        }
        CommandAction::PortalUsage => {
            bot.send_message_easy(msg.chat.id, "Usage: <code>/portal setup</code>")
                .await?;
        }
        CommandAction::AlreadyRunning => {
            bot.send_message_easy(msg.chat.id, "Please finish your action, or /cancel")
                .await?;
        }
        CommandAction::StartSetup => {
            let Some(owner) = msg.from.as_ref() else {
                log::debug!("Portal setup requested without a sender in {:?}", msg.chat.id);
                return Ok(());
            };

            let client = ctx.client(bot, &me);
            let transition = wizard::start(&client, msg.chat.id, owner.id).await?;
            apply_transition(&dialogue, transition).await?;
        }
        CommandAction::NothingToCancel => {
            bot.send_message_easy(msg.chat.id, "Nothing to cancel").await?;
        }
        CommandAction::CancelSetup => {
            let client = ctx.client(bot, &me);
            let transition = wizard::cancel(&client, msg.chat.id).await?;
            apply_transition(&dialogue, transition).await?;
        }
        CommandAction::Skip(draft) => {
            let client = ctx.client(bot, &me);
            let transition = wizard::receive_welcome(
                &client,
                ctx.portal_service(),
                msg.chat.id,
                draft,
                WelcomeInput::Skip,
            )
            .await?;
            apply_transition(&dialogue, transition).await?;
        }
        CommandAction::CannotSkip => {
            bot.send_message_easy(msg.chat.id, "This step can't be skipped")
                .await?;
        }
        CommandAction::WelcomeText(draft) => {
            let client = ctx.client(bot, &me);
            let transition = wizard::receive_welcome(
                &client,
                ctx.portal_service(),
                msg.chat.id,
                Some(draft),
                WelcomeInput::Text(text.to_string()),
            )
            .await?;
            apply_transition(&dialogue, transition).await?;
        }
        CommandAction::Unknown => {
            bot.send_message_easy(msg.chat.id, "Unknown command").await?;
        }
    }

    Ok(())
}

/// What a group or channel gets back for a command. Setup only runs in
/// private chats, and other bots' commands are none of our business.
pub fn public_reply(command: Option<Command>) -> Option<&'static str> {
    match command {
        Some(Command::Help | Command::Start | Command::Portal(_)) => {
            Some("Portal setup happens in private. Message me /portal setup there.")
        }
        _ => None,
    }
}

pub async fn receive_public_command(bot: BotType, me: Me, msg: Message) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let command = Command::parse(text, me.username()).ok();
    if let Some(reply) = public_reply(command) {
        bot.send_message_easy(msg.chat.id, reply).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_setup_entry_point() {
        assert_eq!(
            Command::parse("/portal setup", "portal_bot").unwrap(),
            Command::Portal("setup".to_string())
        );
        assert_eq!(
            Command::parse("/portal@portal_bot setup", "portal_bot").unwrap(),
            Command::Portal("setup".to_string())
        );
        assert_eq!(Command::parse("/skip", "portal_bot").unwrap(), Command::Skip);
        assert_eq!(Command::parse("/cancel", "portal_bot").unwrap(), Command::Cancel);
        assert!(Command::parse("/portals", "portal_bot").is_err());
    }

    #[test]
    fn only_setup_opens_the_wizard() {
        assert!(is_setup_argument("setup"));
        assert!(is_setup_argument(" setup "));
        assert!(!is_setup_argument(""));
        assert!(!is_setup_argument("list"));
        assert!(!is_setup_argument("setup now"));
    }

    fn draft() -> SetupDraft {
        SetupDraft::new(teloxide::types::UserId(1))
    }

    fn running_states() -> Vec<ConversationState> {
        vec![
            ConversationState::AwaitingChannel { draft: draft() },
            ConversationState::AwaitingGroup { draft: draft() },
            ConversationState::AwaitingWelcome { draft: draft() },
        ]
    }

    #[test]
    fn cancel_ends_every_running_step() {
        for state in running_states() {
            assert_eq!(
                command_action(state, Some(Command::Cancel)),
                CommandAction::CancelSetup
            );
        }
        assert_eq!(
            command_action(ConversationState::Idle, Some(Command::Cancel)),
            CommandAction::NothingToCancel
        );
    }

    #[test]
    fn skip_only_works_on_the_welcome_step() {
        assert_eq!(
            command_action(
                ConversationState::AwaitingChannel { draft: draft() },
                Some(Command::Skip)
            ),
            CommandAction::CannotSkip
        );
        assert_eq!(
            command_action(
                ConversationState::AwaitingGroup { draft: draft() },
                Some(Command::Skip)
            ),
            CommandAction::CannotSkip
        );
        assert_eq!(
            command_action(
                ConversationState::AwaitingWelcome { draft: draft() },
                Some(Command::Skip)
            ),
            CommandAction::Skip(Some(draft()))
        );
        assert_eq!(
            command_action(ConversationState::Idle, Some(Command::Skip)),
            CommandAction::Skip(None)
        );
    }

    #[test]
    fn setup_is_refused_while_one_is_running() {
        for state in running_states() {
            assert_eq!(
                command_action(state, Some(Command::Portal("setup".to_string()))),
                CommandAction::AlreadyRunning
            );
        }
        assert_eq!(
            command_action(
                ConversationState::Idle,
                Some(Command::Portal("setup".to_string()))
            ),
            CommandAction::StartSetup
        );
    }

    #[test]
    fn other_portal_arguments_do_not_start_a_setup() {
        for argument in ["", "list", "setup now"] {
            assert_eq!(
                command_action(
                    ConversationState::Idle,
                    Some(Command::Portal(argument.to_string()))
                ),
                CommandAction::PortalUsage
            );
        }
    }

    #[test]
    fn unknown_commands_become_the_welcome_message() {
        let command = Command::parse("/welcome to the club", "portal_bot").ok();
        assert_eq!(command, None);

        assert_eq!(
            command_action(ConversationState::AwaitingWelcome { draft: draft() }, command),
            CommandAction::WelcomeText(draft())
        );
        assert_eq!(
            command_action(ConversationState::AwaitingGroup { draft: draft() }, None),
            CommandAction::Unknown
        );
        assert_eq!(
            command_action(ConversationState::Idle, None),
            CommandAction::Unknown
        );
    }

    #[test]
    fn groups_only_hear_about_setup_commands() {
        assert!(public_reply(Some(Command::Portal("setup".to_string()))).is_some());
        assert!(public_reply(Some(Command::Help)).is_some());
        assert_eq!(public_reply(Some(Command::Cancel)), None);
        assert_eq!(public_reply(Some(Command::Skip)), None);
        assert_eq!(public_reply(None), None);
    }
}
