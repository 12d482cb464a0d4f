//! Core components, types, and utilities for the incident response bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Fixed message templates (help text, notification mail).
//! - Lookback window parsing for event queries.
//! - Common types and result handling.

pub mod config;
pub mod lookback;
pub mod templates;
pub mod types;
