use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::client::WeatherProvider;
use crate::error::Result;
use crate::model::{Location, WeatherReading};
use crate::repo::{Transaction, WeatherRepo};

/// How long a stored reading may be reused
const FRESHNESS_MINUTES: i64 = 15;

/// Outcome of the cache policy for a location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    Reuse,
    Refresh,
}

/// Reuse a reading while `now - last_updated` is within the freshness window
pub fn decide(latest: Option<&WeatherReading>, now: DateTime<Utc>) -> CacheDecision {
    match latest {
        Some(reading) if now - reading.last_updated < Duration::minutes(FRESHNESS_MINUTES) => {
            CacheDecision::Reuse
        }
        _ => CacheDecision::Refresh,
    }
}

/// Append-only weather cache in front of the weather provider
#[derive(Clone)]
pub struct WeatherCache {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherCache {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Current reading for a stored location, fetched and appended if stale
    #[tracing::instrument(name = "Resolve cached weather", skip(self, tx), fields(location = %location.name))]
    pub async fn current(
        &self,
        tx: &mut dyn Transaction,
        location: &Location,
        now: DateTime<Utc>,
    ) -> Result<WeatherReading> {
        let latest = tx.latest_reading(location.id).await?;

        match (decide(latest.as_ref(), now), latest) {
            (CacheDecision::Reuse, Some(reading)) => Ok(reading),
            _ => {
                let report = self.provider.current_weather(&location.name).await?;
                if report.location != location.name {
                    tracing::warn!(
                        stored = %location.name,
                        reported = %report.location,
                        "Weather provider reported a different location name"
                    );
                }

                let reading = report.into_reading(location.id, now);
                tx.insert_reading(&reading).await?;
                Ok(reading)
            }
        }
    }
}
