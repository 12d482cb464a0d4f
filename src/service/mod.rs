//! Service integrations for external APIs and clients.
//!
//! This module contains the clients used by the incident response bot:
//! - Chat (Webex)
//! - Cisco Secure Endpoint (AMP)
//! - Cisco Umbrella
//! - IP reputation (Spamhaus)
//! - Mail (SMTP)
//!
//! Each service module defines both a generic trait and a concrete implementation,
//! allowing for extensibility and easy testing.

pub mod amp;
pub mod chat;
pub mod http;
pub mod mail;
pub mod reputation;
pub mod umbrella;

#[cfg(test)]
pub mod mocks;
