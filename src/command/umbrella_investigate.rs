//! The `umbrella investigate` command: risk, categories and WHOIS for a domain.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    base::{
        templates::URL_NOT_FOUND,
        types::{BotResponse, Invocation, Res},
    },
    card::format::umbrella_investigate_card,
    service::umbrella::{DomainInvestigation, UmbrellaClient},
};

use super::Command;

pub const KEYWORD: &str = "umbrella investigate";

const USAGE: &str = "Please provide a domain to investigate (format: umbrella investigate <domain>)";

/// A domain is sent as a single path segment, so it may not carry separators or whitespace.
fn is_domain_like(domain: &str) -> bool {
    !domain.is_empty() && !domain.chars().any(|c| matches!(c, '/' | '?' | '#' | '%' | '\\') || c.is_whitespace())
}

pub struct UmbrellaInvestigateCommand {
    umbrella: UmbrellaClient,
}

impl UmbrellaInvestigateCommand {
    pub fn new(umbrella: UmbrellaClient) -> Self {
        Self { umbrella }
    }
}

#[async_trait]
impl Command for UmbrellaInvestigateCommand {
    fn keyword(&self) -> &str {
        KEYWORD
    }

    fn help_message(&self) -> &str {
        "Retrieve Umbrella Investigate data on a domain (ex. umbrella investigate cisco.com)"
    }

    async fn execute(&self, invocation: &Invocation) -> Res<BotResponse> {
        let domain = invocation.argument.trim();

        if !is_domain_like(domain) {
            if !domain.is_empty() {
                warn!("Rejected investigate argument `{}`", domain);
            }
            return Ok(BotResponse::text(USAGE));
        }

        info!("Investigating {}", domain);

        let Some(risk_score) = self.umbrella.risk_score(domain).await? else {
            warn!("No investigate data for {}", domain);
            return Ok(BotResponse::text(URL_NOT_FOUND));
        };

        let categories = self.umbrella.categories(domain).await?;
        let whois = self.umbrella.whois(domain).await?;

        let investigation = DomainInvestigation {
            domain: domain.to_string(),
            risk_score,
            categories,
            whois,
        };

        Ok(BotResponse::card(format!("Investigate data for {domain}"), umbrella_investigate_card(&investigation)))
    }
}
