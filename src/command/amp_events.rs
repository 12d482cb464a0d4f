//! The `amp events` command: recent Secure Endpoint detections.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info};

use crate::{
    base::{
        lookback::LookbackWindow,
        templates::{NO_EVENTS, lookback_help},
        types::{BotResponse, Invocation, Res},
    },
    card::format::amp_events_card,
    service::amp::AmpClient,
};

use super::Command;

pub const KEYWORD: &str = "amp events";

pub struct AmpEventsCommand {
    amp: AmpClient,
    console_url: String,
}

impl AmpEventsCommand {
    pub fn new(amp: AmpClient, console_url: &str) -> Self {
        Self {
            amp,
            console_url: console_url.to_string(),
        }
    }
}

#[async_trait]
impl Command for AmpEventsCommand {
    fn keyword(&self) -> &str {
        KEYWORD
    }

    fn help_message(&self) -> &str {
        "Retrieve a list of recent AMP events within a recent time period (ex. 4h or 3d)"
    }

    async fn execute(&self, invocation: &Invocation) -> Res<BotResponse> {
        let since = match LookbackWindow::parse(&invocation.argument).and_then(|window| window.start(Utc::now())) {
            Ok(since) => since,
            Err(err) => {
                error!("Invalid lookback period specified: {}", err);
                return Ok(BotResponse::text(lookback_help(KEYWORD)));
            }
        };

        info!("Looking for AMP events generated since {}", since.to_rfc3339());

        let events = self.amp.list_events(since).await?;

        if events.is_empty() {
            return Ok(BotResponse::text(NO_EVENTS));
        }

        Ok(BotResponse::card("AMP events found", amp_events_card(&events, &self.console_url)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeDelta;

    use crate::{card::format::tests::amp_event, service::mocks::MockAmp};

    use super::*;

    fn command(amp: MockAmp) -> AmpEventsCommand {
        AmpEventsCommand::new(AmpClient::new(Arc::new(amp)), "https://console.amp.cisco.com")
    }

    #[tokio::test]
    async fn test_bad_lookback_returns_help() {
        for argument in ["", "soon", "4", "4 hours", "h4", "-1d", "3w"] {
            let mut amp = MockAmp::new();
            amp.expect_list_events().never();

            let response = command(amp).execute(&Invocation::message(KEYWORD, argument)).await.unwrap();

            assert_eq!(response, BotResponse::text(lookback_help(KEYWORD)), "argument `{argument}`");
        }
    }

    #[tokio::test]
    async fn test_lookback_is_applied() {
        let mut amp = MockAmp::new();
        amp.expect_list_events()
            .withf(|since| {
                let age = Utc::now() - *since;
                age >= TimeDelta::hours(4) && age < TimeDelta::hours(4) + TimeDelta::minutes(1)
            })
            .times(1)
            .returning(|_| Ok(vec![]));

        command(amp).execute(&Invocation::message(KEYWORD, "4h")).await.unwrap();
    }

    #[tokio::test]
    async fn test_no_events() {
        let mut amp = MockAmp::new();
        amp.expect_list_events().returning(|_| Ok(vec![]));

        let response = command(amp).execute(&Invocation::message(KEYWORD, "3d")).await.unwrap();

        assert_eq!(response, BotResponse::text("No events found during the specified window."));
    }

    #[tokio::test]
    async fn test_events_card() {
        let mut amp = MockAmp::new();
        amp.expect_list_events().returning(|_| Ok((1..=7).map(|i| amp_event(i, None)).collect()));

        let response = command(amp).execute(&Invocation::message(KEYWORD, "24h")).await.unwrap();
        let attachment = response.attachment().unwrap();

        assert_eq!(response.as_text(), "AMP events found");
        assert_eq!(attachment.content.actions.len(), 5);
        assert_eq!(attachment.content.body.last().and_then(|e| e.as_text()), Some("And 2 additional events."));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let mut amp = MockAmp::new();
        amp.expect_list_events().returning(|_| Err(anyhow::anyhow!("boom")));

        assert!(command(amp).execute(&Invocation::message(KEYWORD, "1h")).await.is_err());
    }
}
