//! The `umbrella events` command: recent security-category DNS events.

use async_trait::async_trait;
use tracing::{error, info};

use crate::{
    base::{
        lookback::LookbackWindow,
        templates::{NO_EVENTS, lookback_help},
        types::{BotResponse, Invocation, Res},
    },
    card::format::umbrella_events_card,
    service::umbrella::UmbrellaClient,
};

use super::Command;

pub const KEYWORD: &str = "umbrella events";

pub struct UmbrellaEventsCommand {
    umbrella: UmbrellaClient,
    dashboard_url: String,
    org_id: String,
}

impl UmbrellaEventsCommand {
    pub fn new(umbrella: UmbrellaClient, dashboard_url: &str, org_id: &str) -> Self {
        Self {
            umbrella,
            dashboard_url: dashboard_url.to_string(),
            org_id: org_id.to_string(),
        }
    }
}

#[async_trait]
impl Command for UmbrellaEventsCommand {
    fn keyword(&self) -> &str {
        KEYWORD
    }

    fn help_message(&self) -> &str {
        "Retrieve a list of recent Umbrella events within a recent time period (ex. 4h or 3d)"
    }

    async fn execute(&self, invocation: &Invocation) -> Res<BotResponse> {
        let window = match LookbackWindow::parse(&invocation.argument) {
            Ok(window) => window,
            Err(err) => {
                error!("Invalid lookback period specified: {}", err);
                return Ok(BotResponse::text(lookback_help(KEYWORD)));
            }
        };

        info!("Looking for Umbrella events in the last {}", window);

        let events = self.umbrella.list_security_events(&window).await?;

        if events.is_empty() {
            return Ok(BotResponse::text(NO_EVENTS));
        }

        Ok(BotResponse::card(
            "Umbrella events found",
            umbrella_events_card(&events, &self.dashboard_url, &self.org_id),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        base::lookback::LookbackUnit,
        card::format::{tests::umbrella_event, umbrella_report_url},
        service::mocks::MockUmbrella,
    };

    use super::*;

    fn command(umbrella: MockUmbrella) -> UmbrellaEventsCommand {
        UmbrellaEventsCommand::new(UmbrellaClient::new(Arc::new(umbrella)), "https://dashboard.umbrella.com", "1234")
    }

    #[tokio::test]
    async fn test_bad_lookback_returns_help() {
        for argument in ["", "yesterday", "12", "d3"] {
            let mut umbrella = MockUmbrella::new();
            umbrella.expect_list_security_events().never();

            let response = command(umbrella).execute(&Invocation::message(KEYWORD, argument)).await.unwrap();

            assert_eq!(response.as_text(), lookback_help(KEYWORD), "argument `{argument}`");
        }
    }

    #[tokio::test]
    async fn test_window_is_passed_through() {
        let mut umbrella = MockUmbrella::new();
        umbrella
            .expect_list_security_events()
            .withf(|window| window.amount == 3 && window.unit == LookbackUnit::Days)
            .times(1)
            .returning(|_| Ok(vec![]));

        let response = command(umbrella).execute(&Invocation::message(KEYWORD, "3d")).await.unwrap();

        assert_eq!(response, BotResponse::text(NO_EVENTS));
    }

    #[tokio::test]
    async fn test_events_card() {
        let mut umbrella = MockUmbrella::new();
        umbrella.expect_list_security_events().returning(|_| Ok(vec![umbrella_event(1), umbrella_event(2)]));

        let response = command(umbrella).execute(&Invocation::message(KEYWORD, "4h")).await.unwrap();
        let attachment = response.attachment().unwrap();
        let body = serde_json::to_string(&attachment.content).unwrap();

        assert_eq!(response.as_text(), "Umbrella events found");
        assert_eq!(attachment.content.actions.len(), 2);
        assert!(body.contains(&umbrella_report_url("https://dashboard.umbrella.com", "1234", "bad2.example.com")));
    }
}
