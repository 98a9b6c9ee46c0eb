use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Symbolic lookback window accepted by `GET /get_bme680_data?range=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RangeToken {
    #[default]
    Minute,
    Hour,
    Day,
    Week,
}

impl RangeToken {
    /// Resolves the raw query value. Absent or unrecognised values fall back
    /// to `Minute` rather than failing the request.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some("hour") => Self::Hour,
            Some("day") => Self::Day,
            Some("week") => Self::Week,
            _ => Self::Minute,
        }
    }

    pub fn window(self) -> TimeDelta {
        match self {
            Self::Minute => TimeDelta::seconds(60),
            Self::Hour => TimeDelta::seconds(3_600),
            Self::Day => TimeDelta::seconds(86_400),
            Self::Week => TimeDelta::seconds(604_800),
        }
    }

    /// Readings strictly newer than this instant fall inside the window.
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

impl fmt::Display for RangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tokens_resolve() {
        assert_eq!(RangeToken::from_param(Some("minute")), RangeToken::Minute);
        assert_eq!(RangeToken::from_param(Some("hour")), RangeToken::Hour);
        assert_eq!(RangeToken::from_param(Some("day")), RangeToken::Day);
        assert_eq!(RangeToken::from_param(Some("week")), RangeToken::Week);
    }

    #[test]
    fn missing_or_unknown_token_defaults_to_minute() {
        assert_eq!(RangeToken::from_param(None), RangeToken::Minute);
        assert_eq!(RangeToken::from_param(Some("")), RangeToken::Minute);
        assert_eq!(RangeToken::from_param(Some("month")), RangeToken::Minute);
        assert_eq!(RangeToken::from_param(Some("HOUR")), RangeToken::Minute);
    }

    #[test]
    fn windows_match_lookback_seconds() {
        assert_eq!(RangeToken::Minute.window().num_seconds(), 60);
        assert_eq!(RangeToken::Hour.window().num_seconds(), 3_600);
        assert_eq!(RangeToken::Day.window().num_seconds(), 86_400);
        assert_eq!(RangeToken::Week.window().num_seconds(), 604_800);
    }

    #[test]
    fn cutoff_subtracts_window_from_now() {
        let now = DateTime::parse_from_rfc3339("2024-06-08T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let expected = DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(RangeToken::Week.cutoff(now), expected);
    }

    #[test]
    fn display_uses_wire_name() {
        assert_eq!(RangeToken::Day.to_string(), "day");
    }
}
