use std::fmt;

use chrono::{DateTime, Utc};

use serde::Serialize;

use uuid::Uuid;

use crate::domain::Frequency;

/// Lifecycle state of a subscription.
/// Only `Confirmed` subscriptions receive weather notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Pending,
    Confirmed,
}

impl AsRef<str> for SubscriptionStatus {
    fn as_ref(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl TryFrom<String> for SubscriptionStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            other => Err(format!("{} is not a valid subscription status", other)),
        }
    }
}

/// Stored Subscriber record
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Subscriber {
    pub id: Uuid,
    /// Normalized email address
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Stored Subscription record
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub subscriber_id: Uuid,
    pub location_id: Uuid,
    #[sqlx(try_from = "String")]
    pub frequency: Frequency,
    #[sqlx(try_from = "String")]
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// A fresh, unconfirmed subscription
    pub fn pending(
        subscriber_id: Uuid,
        location_id: Uuid,
        frequency: Frequency,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subscriber_id,
            location_id,
            frequency,
            status: SubscriptionStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the subscription as confirmed, bumping the update timestamp
    pub fn confirm(&mut self, now: DateTime<Utc>) {
        self.status = SubscriptionStatus::Confirmed;
        self.updated_at = now;
    }
}
