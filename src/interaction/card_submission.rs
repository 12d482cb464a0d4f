use tracing::{info, instrument, warn};

use crate::{
    base::types::Void,
    command::CommandRegistry,
    service::chat::{ChatClient, NotificationData},
};

use super::{access::ApprovedSenders, reply_for};

/// Run the command a submitted card routes to and post the reply.
#[instrument(skip_all, fields(action_id = %data.id))]
pub async fn handle_card_submission(data: &NotificationData, chat: &ChatClient, commands: &CommandRegistry, senders: &ApprovedSenders) -> Void {
    let action = chat.get_attachment_action(&data.id).await?;

    // Card submissions carry only the person ID.
    let email = chat.get_person_email(&action.person_id).await?;

    if !senders.is_approved(&email) {
        warn!("Ignoring card submission from unapproved sender {}", email);
        return Ok(());
    }

    info!("Card submission from {}: {:?}", email, action.inputs);

    let response = reply_for(commands.dispatch_submission(action.inputs).await);

    chat.send_response(&action.room_id, &response).await
}
