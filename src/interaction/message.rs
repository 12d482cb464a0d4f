use tracing::{debug, info, instrument, warn};

use crate::{
    base::types::Void,
    command::CommandRegistry,
    service::chat::{ChatClient, ChatMessage, NotificationData},
};

use super::{access::ApprovedSenders, reply_for};

/// Run the command in a new message and post the reply.
#[instrument(skip_all, fields(message_id = %data.id))]
pub async fn handle_message(data: &NotificationData, chat: &ChatClient, commands: &CommandRegistry, senders: &ApprovedSenders) -> Void {
    // The bot's own replies also trigger the webhook.
    if data.person_email.as_deref().is_some_and(|email| email.eq_ignore_ascii_case(chat.bot_email())) {
        debug!("Ignoring message sent by the bot.");
        return Ok(());
    }

    let message = chat.get_message(&data.id).await?;

    if message.person_email.eq_ignore_ascii_case(chat.bot_email()) {
        debug!("Ignoring message sent by the bot.");
        return Ok(());
    }

    if !senders.is_approved(&message.person_email) {
        warn!("Ignoring message from unapproved sender {}", message.person_email);
        return Ok(());
    }

    let text = command_text(&message, chat.bot_display_name());

    info!("Message from {}: {}", message.person_email, text);

    let response = reply_for(commands.dispatch(text).await);

    chat.send_response(&message.room_id, &response).await
}

/// The message text with any leading @mention of the bot removed.
///
/// In group spaces the text starts with the bot's display name (or just its
/// first name, depending on how the sender mentioned it).
pub fn command_text<'a>(message: &'a ChatMessage, bot_display_name: &str) -> &'a str {
    let text = message.text.trim();

    if !message.is_group() {
        return text;
    }

    let first_name = bot_display_name.split_whitespace().next().unwrap_or_default();

    [bot_display_name.trim(), first_name]
        .into_iter()
        .filter(|name| !name.is_empty())
        .find_map(|name| strip_prefix_ignore_case(text, name))
        .map(str::trim_start)
        .unwrap_or(text)
}

/// Strip `prefix` from `text` if it starts it as a whole word, ignoring ASCII case.
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    let rest = &text[prefix.len()..];

    if head.eq_ignore_ascii_case(prefix) && rest.chars().next().is_none_or(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}
