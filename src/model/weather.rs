use chrono::{DateTime, Utc};

use serde::Serialize;

use uuid::Uuid;

/// Stored Location record, named the way the weather provider spells it
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
}

/// Cached weather reading for a location.
/// Rows are append-only; the one with the latest `last_updated` is current.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct WeatherReading {
    pub location_id: Uuid,
    /// When the provider last refreshed this observation
    pub last_updated: DateTime<Utc>,
    /// When this service fetched it
    pub fetched_at: DateTime<Utc>,
    /// Degrees Celsius
    pub temperature: f32,
    /// Relative humidity, percent
    pub humidity: f32,
    pub description: String,
}
