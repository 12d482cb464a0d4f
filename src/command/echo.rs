//! The host's built-in `echo` command.

use async_trait::async_trait;

use crate::base::types::{BotResponse, Invocation, Res};

use super::Command;

pub const KEYWORD: &str = "echo";

const USAGE: &str = "Please provide some text to echo (format: echo <text>)";

/// Replies with the argument unchanged.
pub struct EchoCommand;

#[async_trait]
impl Command for EchoCommand {
    fn keyword(&self) -> &str {
        KEYWORD
    }

    fn help_message(&self) -> &str {
        "Reply back with the same message sent."
    }

    async fn execute(&self, invocation: &Invocation) -> Res<BotResponse> {
        // Webex refuses to post an empty message.
        if invocation.argument.trim().is_empty() {
            return Ok(BotResponse::text(USAGE));
        }

        Ok(BotResponse::text(invocation.argument.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo() {
        let response = EchoCommand.execute(&Invocation::message(KEYWORD, "still alive")).await.unwrap();

        assert_eq!(response, BotResponse::text("still alive"));
    }

    #[tokio::test]
    async fn test_empty_argument_gets_usage() {
        for argument in ["", "   "] {
            let response = EchoCommand.execute(&Invocation::message(KEYWORD, argument)).await.unwrap();

            assert_eq!(response.as_text(), USAGE);
        }
    }
}
