//! Restricting who may talk to the bot.

use crate::base::config::Config;

/// The senders allowed to run commands.
///
/// With no users and no domains configured, everyone is approved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovedSenders {
    users: Vec<String>,
    domains: Vec<String>,
}

impl ApprovedSenders {
    pub fn new(users: Vec<String>, domains: Vec<String>) -> Self {
        Self {
            users: users.into_iter().map(|u| u.to_lowercase()).collect(),
            domains: domains.into_iter().map(|d| d.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.approved_users(), config.approved_domains())
    }

    pub fn is_restricted(&self) -> bool {
        !self.users.is_empty() || !self.domains.is_empty()
    }

    /// Whether the sender with this email address may run commands.
    pub fn is_approved(&self, email: &str) -> bool {
        if !self.is_restricted() {
            return true;
        }

        let email = email.trim().to_lowercase();

        if self.users.contains(&email) {
            return true;
        }

        email.rsplit_once('@').is_some_and(|(_, domain)| self.domains.iter().any(|d| d == domain))
    }
}
