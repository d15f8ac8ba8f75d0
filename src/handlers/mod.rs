pub mod command;
pub mod send_message;
pub mod setup;
