//! Fixed reply and message templates.

/// Header line of the help reply.
pub const HELP_HEADER: &str = "Hello there! Here is a list of supported operations I can perform:\n";

/// Subject of the user notification mail.
pub const NOTIFICATION_SUBJECT: &str = "Notification from Security Team";

/// Body of the user notification mail; `{pc}` is replaced with the hostname.
const NOTIFICATION_BODY: &str = r#####"Hello there!

It appears your computer {pc} has been infected with malware. Please bring it to the helpdesk as soon as possible for inspection.

A temporary device will be provided while yours is being examined.

Thank you,
Security
"#####;

/// Render the notification mail body for the given hostname.
pub fn notification_body(hostname: &str) -> String {
    NOTIFICATION_BODY.replace("{pc}", hostname)
}

/// Reply for a lookback period that could not be parsed.
pub fn lookback_help(command: &str) -> String {
    format!(
        "Sorry, I didn't understand the time period you specified. Please use the format '{command} <time_period>' where time_period is a lookback period from now, specified in days or hours (ex. 4d or 24h)"
    )
}

pub const NO_EVENTS: &str = "No events found during the specified window.";
pub const COMPUTER_NOT_FOUND: &str = "Sorry, I couldn't find that computer.";
pub const ACTIONS_USAGE: &str = "Please provide a computer name (format: actions <computername>)";
pub const URL_NOT_FOUND: &str = "Sorry, that URL was not found";
pub const NO_REPUTATION_DATA: &str = "Sorry, no reputation data was found for that IP address!";
pub const COMMAND_FAILED: &str = "Sorry, something went wrong while running that command.";
