//! Endpoint isolation (quarantine) through Secure Endpoint.

use tracing::{info, instrument, warn};

use crate::{
    base::{
        templates::COMPUTER_NOT_FOUND,
        types::{BotResponse, Res},
    },
    service::amp::{AmpClient, IsolationResponse},
};

/// Status of an isolation applied to an online computer.
const STATUS_ISOLATED: &str = "isolated";

/// Status of an isolation that applies when an offline computer reconnects.
const STATUS_PENDING_START: &str = "pending_start";

/// Look up a computer by hostname and ask Secure Endpoint to isolate it.
#[instrument(skip(amp))]
pub async fn quarantine_computer(amp: &AmpClient, computer: &str) -> Res<BotResponse> {
    let computer = computer.trim();

    let computers = amp.find_computers(computer).await?;

    let Some(target) = computers.first() else {
        warn!("No computer matches `{}`", computer);
        return Ok(BotResponse::text(COMPUTER_NOT_FOUND));
    };

    info!("Isolating {} ({})", computer, target.connector_guid);

    let response = amp.isolate_computer(&target.connector_guid).await?;

    Ok(BotResponse::text(describe_isolation(computer, &response)))
}

/// Turn an isolation response into a reply.
pub fn describe_isolation(computer: &str, response: &IsolationResponse) -> String {
    match response.data.status.as_deref() {
        None => {
            let error = response.first_error().unwrap_or("no error details were returned");
            format!("Attempted to quarantine {computer}, but got an error: {error}")
        }
        Some(STATUS_ISOLATED) => format!("Successfully quarantined {computer}."),
        Some(STATUS_PENDING_START) => format!("Successfully processed request to quarantine {computer}."),
        Some(status) => format!("Attempted to quarantine {computer}, but got an unrecognized status: {status}"),
    }
}
