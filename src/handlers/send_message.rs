use teloxide::{
    payloads::SendMessageSetters,
    requests::Requester,
    types::{KeyboardButton, KeyboardMarkup, KeyboardRemove, Recipient, ReplyMarkup},
};

use crate::types::BotType;

pub trait BetterSendMessage {
    /// Sends `text` with `buttons` as one-time reply keyboard shortcuts. An
    /// empty list removes whatever keyboard the user still has open.
    fn send_message_buttons<C, T, S>(
        &self,
        chat_id: C,
        text: T,
        buttons: Vec<S>,
    ) -> <BotType as Requester>::SendMessage
    where
        C: Into<Recipient>,
        T: Into<String>,
        S: Into<String>;

    fn send_message_easy<C, T>(&self, chat_id: C, text: T) -> <BotType as Requester>::SendMessage
    where
        C: Into<Recipient>,
        T: Into<String>,
    {
        self.send_message_buttons(chat_id, text, vec![] as Vec<&str>)
    }
}

impl BetterSendMessage for BotType {
    fn send_message_buttons<C, T, S>(
        &self,
        chat_id: C,
        text: T,
        buttons: Vec<S>,
    ) -> <BotType as Requester>::SendMessage
    where
        C: Into<Recipient>,
        T: Into<String>,
        S: Into<String>,
    {
        self.send_message(chat_id, text)
            .reply_markup(shortcut_markup(buttons))
    }
}

pub fn shortcut_markup<S: Into<String>>(buttons: Vec<S>) -> ReplyMarkup {
    if buttons.is_empty() {
        return ReplyMarkup::KeyboardRemove(KeyboardRemove::new());
    }

    let row = buttons
        .into_iter()
        .map(|b| KeyboardButton::new(b.into()))
        .collect::<Vec<KeyboardButton>>();

    ReplyMarkup::Keyboard(
        KeyboardMarkup::new(vec![row])
            .resize_keyboard()
            .one_time_keyboard(),
    )
}
