use std::fmt;

use chrono::{DateTime, Duration, Utc};

use serde::{Deserialize, Serialize};

use uuid::Uuid;

/// What a stored token authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Confirmation,
    Unsubscribe,
}

impl TokenKind {
    /// How long a freshly issued token of this kind stays valid
    pub fn ttl(&self) -> Duration {
        match self {
            Self::Confirmation => Duration::minutes(15),
            Self::Unsubscribe => Duration::days(1),
        }
    }
}

impl AsRef<str> for TokenKind {
    fn as_ref(&self) -> &str {
        match self {
            Self::Confirmation => "confirmation",
            Self::Unsubscribe => "unsubscribe",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl TryFrom<String> for TokenKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "confirmation" => Ok(Self::Confirmation),
            "unsubscribe" => Ok(Self::Unsubscribe),
            other => Err(format!("{} is not a valid token kind", other)),
        }
    }
}

/// Stored token record
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Token {
    /// Opaque, URL-safe token value handed out by email
    pub token: String,
    pub subscription_id: Uuid,
    #[sqlx(try_from = "String")]
    pub kind: TokenKind,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Never written by the current lifecycle, tokens stay replayable until expiry
    pub used_at: Option<DateTime<Utc>>,
}

impl Token {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// A token authorizes an action only while unexpired and of the matching kind
    pub fn authorizes(&self, kind: TokenKind, now: DateTime<Utc>) -> bool {
        self.kind == kind && !self.is_expired(now)
    }
}
