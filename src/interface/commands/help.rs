//! # Help Command
//!
//! Handles the `.help` command.
//! Displays the announcement format and command list.

use crate::domain::traits::ChatProvider;
use crate::domain::types::AdminCommand;

pub async fn handle_help(chat: &impl ChatProvider, cmd: &AdminCommand) {
    super::reply(chat, &cmd.chat_id, crate::strings::help::MAIN).await;
}
