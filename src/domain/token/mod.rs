use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer};

use super::{error::Error, Result};

/// Seconds subtracted from the nominal expiry so a token is retired before
/// it can expire in the middle of a request.
pub const EXPIRY_BUFFER_SECS: i64 = 10;

#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Bearer token plus the instant it stops being valid.
///
/// Both fields are fixed at construction, a refreshed token means a new
/// credential.
#[derive(Clone, PartialEq, Deserialize)]
pub struct TokenCredential {
    access_token: String,
    #[serde(default, deserialize_with = "deserialize_expires_at")]
    expires_at: Option<DateTime<Utc>>,
}
impl TokenCredential {
    pub fn new(access_token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// A credential without expiry never expires. Otherwise it is expired
    /// once `now` is past `expires_at` minus [`EXPIRY_BUFFER_SECS`]. An
    /// expiry too close to the minimum representable instant counts as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let Some(expires_at) = self.expires_at else {
            return false;
        };

        match expires_at.checked_sub_signed(Duration::seconds(EXPIRY_BUFFER_SECS)) {
            Some(deadline) => now > deadline,
            None => true,
        }
    }

    pub fn is_expired_by(&self, clock: &dyn Clock) -> bool {
        self.is_expired(clock.now())
    }

    /// Does not look at expiry, callers are expected to check
    /// [`TokenCredential::is_expired`] first.
    pub fn authorization_header_value(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    pub fn valid_authorization_header(&self, now: DateTime<Utc>) -> Result<String> {
        if self.is_expired(now) {
            return Err(Error::TokenExpired);
        }

        Ok(self.authorization_header_value())
    }
}

impl fmt::Debug for TokenCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCredential")
            .field("access_token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

pub fn from_epoch_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }

    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);

    DateTime::from_timestamp(whole as i64, nanos)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EpochSeconds {
    Number(f64),
    Text(String),
}

fn deserialize_expires_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = match Option::<EpochSeconds>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(EpochSeconds::Number(value)) => value,
        Some(EpochSeconds::Text(value)) if value.trim().is_empty() => return Ok(None),
        Some(EpochSeconds::Text(value)) => value
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid expires_at {value}")))?,
    };

    from_epoch_seconds(seconds)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("expires_at {seconds} out of range")))
}
