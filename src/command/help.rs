//! The `help` command, also used as the fallback for unrecognized input.

use async_trait::async_trait;

use crate::base::{
    templates::HELP_HEADER,
    types::{BotResponse, Invocation, Res},
};

use super::{Command, CommandSummary, echo};

pub const KEYWORD: &str = "help";

/// Lists the other registered commands.
pub struct HelpCommand {
    summaries: Vec<CommandSummary>,
}

impl HelpCommand {
    pub fn new(summaries: Vec<CommandSummary>) -> Self {
        Self { summaries }
    }

    /// Bulleted list of commands sorted by keyword, without `help` and `echo`.
    pub fn render(&self) -> String {
        let mut summaries = self
            .summaries
            .iter()
            .filter(|summary| summary.keyword != KEYWORD && summary.keyword != echo::KEYWORD)
            .collect::<Vec<_>>();

        summaries.sort_by(|a, b| a.keyword.cmp(&b.keyword));

        summaries.iter().fold(HELP_HEADER.to_string(), |mut text, summary| {
            text.push_str(&format!("- **{}** *value* - {}\n", summary.keyword, summary.help_message));
            text
        })
    }
}

#[async_trait]
impl Command for HelpCommand {
    fn keyword(&self) -> &str {
        KEYWORD
    }

    fn help_message(&self) -> &str {
        "Returns a short summary of available commands & descriptions."
    }

    async fn execute(&self, _invocation: &Invocation) -> Res<BotResponse> {
        Ok(BotResponse::text(self.render()))
    }
}
