//! Rule pipeline timing configuration.

use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::application::RuleTiming;

/// Rule timing as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Minutes before a wick through the target cancels a resting order.
    #[serde(default = "default_stale_grace")]
    pub stale_grace_minutes: i64,
    /// Minutes before an unfilled order is cancelled.
    #[serde(default = "default_unfilled_timeout")]
    pub unfilled_timeout_minutes: i64,
    /// Session close, `HH:MM` on the exchange clock.
    #[serde(default = "default_session_close")]
    pub session_close: String,
    /// Minutes before the close at which positions are flattened.
    #[serde(default = "default_exit_lead")]
    pub exit_lead_minutes: i64,
    /// IANA time zone of the exchange.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            stale_grace_minutes: default_stale_grace(),
            unfilled_timeout_minutes: default_unfilled_timeout(),
            session_close: default_session_close(),
            exit_lead_minutes: default_exit_lead(),
            timezone: default_timezone(),
        }
    }
}

impl RulesConfig {
    /// Parse into pipeline timing.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a malformed close time, an unknown
    /// time zone, or a negative duration.
    pub fn to_timing(&self) -> Result<RuleTiming, ConfigError> {
        let session_close = NaiveTime::parse_from_str(&self.session_close, "%H:%M")
            .map_err(|e| {
                ConfigError::ValidationError(format!(
                    "rules.session_close '{}' is not HH:MM: {e}",
                    self.session_close
                ))
            })?;
        let timezone: Tz = self.timezone.parse().map_err(|_| {
            ConfigError::ValidationError(format!(
                "rules.timezone '{}' is not a known time zone",
                self.timezone
            ))
        })?;

        for (field, minutes) in [
            ("stale_grace_minutes", self.stale_grace_minutes),
            ("unfilled_timeout_minutes", self.unfilled_timeout_minutes),
            ("exit_lead_minutes", self.exit_lead_minutes),
        ] {
            if minutes < 0 {
                return Err(ConfigError::ValidationError(format!(
                    "rules.{field} must not be negative"
                )));
            }
        }

        Ok(RuleTiming {
            stale_grace: Duration::minutes(self.stale_grace_minutes),
            unfilled_timeout: Duration::minutes(self.unfilled_timeout_minutes),
            session_close,
            exit_lead: Duration::minutes(self.exit_lead_minutes),
            timezone,
        })
    }
}

const fn default_stale_grace() -> i64 {
    5
}

const fn default_unfilled_timeout() -> i64 {
    10
}

fn default_session_close() -> String {
    "16:00".to_string()
}

const fn default_exit_lead() -> i64 {
    5
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}
