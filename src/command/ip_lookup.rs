//! The `ip lookup` command: Spamhaus reputation of an IP address.

use std::net::IpAddr;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    base::{
        templates::NO_REPUTATION_DATA,
        types::{BotResponse, Invocation, Res},
    },
    card::format::ip_reputation_card,
    service::reputation::ReputationClient,
};

use super::Command;

pub const KEYWORD: &str = "ip lookup";

const USAGE: &str = "Please provide an IP address to look up (format: ip lookup <ip address>)";

pub struct IpLookupCommand {
    reputation: ReputationClient,
}

impl IpLookupCommand {
    pub fn new(reputation: ReputationClient) -> Self {
        Self { reputation }
    }
}

#[async_trait]
impl Command for IpLookupCommand {
    fn keyword(&self) -> &str {
        KEYWORD
    }

    fn help_message(&self) -> &str {
        "Retrieve IP reputation data from Spamhaus (ex. ip lookup 1.2.3.4)"
    }

    async fn execute(&self, invocation: &Invocation) -> Res<BotResponse> {
        let argument = invocation.argument.trim();

        let Ok(ip_addr) = argument.parse::<IpAddr>() else {
            if !argument.is_empty() {
                warn!("Rejected IP lookup argument `{}`", argument);
            }
            return Ok(BotResponse::text(USAGE));
        };

        info!("Looking up reputation for {}", ip_addr);

        let history = self.reputation.reputation_history(&ip_addr.to_string()).await?;

        let Some(latest) = history.as_deref().and_then(<[_]>::first) else {
            return Ok(BotResponse::text(NO_REPUTATION_DATA));
        };

        Ok(BotResponse::card(format!("IP Reputation data for {ip_addr}"), ip_reputation_card(latest)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::service::{mocks::MockReputation, reputation::ReputationRecord};

    use super::*;

    fn command(reputation: MockReputation) -> IpLookupCommand {
        IpLookupCommand::new(ReputationClient::new(Arc::new(reputation)))
    }

    fn record(detection: &str, seen: i64) -> ReputationRecord {
        ReputationRecord {
            ipaddress: "192.0.2.10".to_string(),
            detection: detection.to_string(),
            heuristic: "sinkhole".to_string(),
            cc: "US".to_string(),
            seen,
        }
    }

    #[tokio::test]
    async fn test_no_data() {
        let mut reputation = MockReputation::new();
        reputation.expect_reputation_history().withf(|ip| ip == "192.0.2.10").returning(|_| Ok(None));

        let response = command(reputation).execute(&Invocation::message(KEYWORD, "192.0.2.10")).await.unwrap();

        assert_eq!(response, BotResponse::text("Sorry, no reputation data was found for that IP address!"));
    }

    #[tokio::test]
    async fn test_empty_history() {
        let mut reputation = MockReputation::new();
        reputation.expect_reputation_history().returning(|_| Ok(Some(vec![])));

        let response = command(reputation).execute(&Invocation::message(KEYWORD, "192.0.2.10")).await.unwrap();

        assert_eq!(response.as_text(), NO_REPUTATION_DATA);
    }

    #[tokio::test]
    async fn test_card_uses_most_recent_record() {
        let mut reputation = MockReputation::new();
        reputation
            .expect_reputation_history()
            .returning(|_| Ok(Some(vec![record("citadel", 1_715_340_729), record("zeus", 1_600_000_000)])));

        let response = command(reputation).execute(&Invocation::message(KEYWORD, "192.0.2.10")).await.unwrap();

        assert_eq!(response.as_text(), "IP Reputation data for 192.0.2.10");
        assert_eq!(response.attachment(), Some(&ip_reputation_card(&record("citadel", 1_715_340_729))));
    }

    #[tokio::test]
    async fn test_missing_argument() {
        let mut reputation = MockReputation::new();
        reputation.expect_reputation_history().never();

        let response = command(reputation).execute(&Invocation::message(KEYWORD, "")).await.unwrap();

        assert!(response.as_text().starts_with("Please provide an IP address"));
    }

    #[tokio::test]
    async fn test_rejects_non_address_arguments() {
        for argument in ["1.2.3.4/../../x", "example.com", "192.0.2.10?limit=500", "300.1.1.1"] {
            let mut reputation = MockReputation::new();
            reputation.expect_reputation_history().never();

            let response = command(reputation).execute(&Invocation::message(KEYWORD, argument)).await.unwrap();

            assert_eq!(response.as_text(), USAGE, "argument: {argument}");
        }
    }

    #[tokio::test]
    async fn test_ipv6_address() {
        let mut reputation = MockReputation::new();
        reputation.expect_reputation_history().withf(|ip| ip == "2001:db8::1").times(1).returning(|_| Ok(None));

        let response = command(reputation).execute(&Invocation::message(KEYWORD, " 2001:db8::1 ")).await.unwrap();

        assert_eq!(response.as_text(), NO_REPUTATION_DATA);
    }
}
