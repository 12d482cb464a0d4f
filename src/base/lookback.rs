//! Lookback windows for event queries (`4h`, `3d`).

use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeDelta, Utc};

use super::types::{Err, Res};

/// Unit of a lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookbackUnit {
    Hours,
    Days,
}

impl LookbackUnit {
    fn suffix(self) -> char {
        match self {
            Self::Hours => 'h',
            Self::Days => 'd',
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Hours => "hours",
            Self::Days => "days",
        }
    }
}

/// The time span, ending now, over which events are queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub amount: u64,
    pub unit: LookbackUnit,
}

impl LookbackWindow {
    /// Parse `<digits>h` or `<digits>d`, ignoring surrounding whitespace.
    pub fn parse(input: &str) -> Res<Self> {
        let input = input.trim();

        let (digits, unit) = if let Some(digits) = input.strip_suffix('h') {
            (digits, LookbackUnit::Hours)
        } else if let Some(digits) = input.strip_suffix('d') {
            (digits, LookbackUnit::Days)
        } else {
            return Err(anyhow::anyhow!("Lookback period `{input}` must end in `h` or `d`."));
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(anyhow::anyhow!("Lookback period `{input}` must start with a whole number."));
        }

        let amount = digits.parse::<u64>()?;

        Ok(Self { amount, unit })
    }

    /// The length of the window.
    pub fn duration(&self) -> Res<TimeDelta> {
        let amount = i64::try_from(self.amount)?;

        let delta = match self.unit {
            LookbackUnit::Hours => TimeDelta::try_hours(amount),
            LookbackUnit::Days => TimeDelta::try_days(amount),
        };

        delta.ok_or_else(|| anyhow::anyhow!("Lookback period `{self}` is too long."))
    }

    /// The start of the window, counted back from `now`.
    pub fn start(&self, now: DateTime<Utc>) -> Res<DateTime<Utc>> {
        now.checked_sub_signed(self.duration()?)
            .ok_or_else(|| anyhow::anyhow!("Lookback period `{self}` is too long."))
    }

    /// The relative form used by the Umbrella reporting API (e.g., `-4hours`).
    pub fn relative(&self) -> String {
        format!("-{}{}", self.amount, self.unit.name())
    }
}

impl fmt::Display for LookbackWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl FromStr for LookbackWindow {
    type Err = Err;

    fn from_str(s: &str) -> Res<Self> {
        Self::parse(s)
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_hours() {
        let window = LookbackWindow::parse("4h").unwrap();

        assert_eq!(window, LookbackWindow { amount: 4, unit: LookbackUnit::Hours });
        assert_eq!(window.start(now()).unwrap(), Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap());
        assert_eq!(window.relative(), "-4hours");
    }

    #[test]
    fn test_parse_days() {
        let window = LookbackWindow::parse(" 3d ").unwrap();

        assert_eq!(window, LookbackWindow { amount: 3, unit: LookbackUnit::Days });
        assert_eq!(window.start(now()).unwrap(), Utc.with_ymd_and_hms(2024, 5, 7, 12, 0, 0).unwrap());
        assert_eq!(window.relative(), "-3days");
    }

    #[test]
    fn test_parse_zero() {
        let window = LookbackWindow::parse("0h").unwrap();

        assert_eq!(window.start(now()).unwrap(), now());
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for input in ["", "h", "d", "4", "4x", "-4h", "+4h", "4 h", "4hd", "four h", "hd", "4.5d", "24hours", "h4"] {
            assert!(LookbackWindow::parse(input).is_err(), "`{input}` should not parse");
        }
    }

    #[test]
    fn test_parse_rejects_letters_elsewhere() {
        // A substring search would have treated this as hours.
        assert!(LookbackWindow::parse("h2d").is_err());
        assert!(LookbackWindow::parse("the 4h").is_err());
    }

    #[test]
    fn test_huge_window_is_an_error() {
        let window = LookbackWindow::parse("99999999999999d").unwrap();

        assert!(window.start(now()).is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let window: LookbackWindow = "24h".parse().unwrap();

        assert_eq!(window.to_string(), "24h");
    }
}
