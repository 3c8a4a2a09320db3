use std::time::Duration;

use anyhow::Context;

use chrono::{DateTime, TimeZone, Utc};

use reqwest::{Client, StatusCode};

use serde::Deserialize;

use secrecy::Secret;

use url::Url;

use uuid::Uuid;

use crate::model::WeatherReading;

/// Source of current weather observations
#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, city: &str) -> Result<WeatherReport, WeatherError>;
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Location not found")]
    LocationNotFound,
    #[error("Weather API request failed")]
    Request(#[from] reqwest::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Current weather as reported by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// Canonical location name, as the provider spells it
    pub location: String,
    pub last_updated: DateTime<Utc>,
    pub temperature: f32,
    pub humidity: f32,
    pub description: String,
}

impl WeatherReport {
    /// Stamp the report as a cached reading for a stored location
    pub fn into_reading(self, location_id: Uuid, fetched_at: DateTime<Utc>) -> WeatherReading {
        WeatherReading {
            location_id,
            last_updated: self.last_updated,
            fetched_at,
            temperature: self.temperature,
            humidity: self.humidity,
            description: self.description,
        }
    }
}

/// REST client for the weatherapi.com current weather endpoint
#[derive(Debug)]
pub struct WeatherApiClient {
    client: Client,

    api_current_url: Url,
    api_key: Secret<String>,
}

impl WeatherApiClient {
    pub fn new(
        api_timeout: Duration,
        api_base_url: Url,
        api_key: Secret<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(api_timeout)
            .build()
            .context("Failed to build http client")?;

        let api_current_url = api_base_url
            .join("current.json")
            .context("Failed to create current weather endpoint URL")?;

        Ok(Self {
            client,
            api_current_url,
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl WeatherProvider for WeatherApiClient {
    #[tracing::instrument(name = "Fetch current weather via API", skip(self))]
    async fn current_weather(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        use secrecy::ExposeSecret;

        let response = self
            .client
            .get(self.api_current_url.clone())
            .query(&[
                ("key", self.api_key.expose_secret().as_str()),
                ("q", city),
                ("aqi", "no"),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            return Err(WeatherError::LocationNotFound);
        }

        let current: CurrentWeatherResponse = response.error_for_status()?.json().await?;
        Ok(current.try_into()?)
    }
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    location: LocationBody,
    current: CurrentBody,
}

#[derive(Debug, Deserialize)]
struct LocationBody {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CurrentBody {
    last_updated_epoch: i64,
    temp_c: f32,
    humidity: f32,
    condition: ConditionBody,
}

#[derive(Debug, Deserialize)]
struct ConditionBody {
    text: String,
}

impl TryFrom<CurrentWeatherResponse> for WeatherReport {
    type Error = anyhow::Error;

    fn try_from(body: CurrentWeatherResponse) -> Result<Self, Self::Error> {
        let last_updated = Utc
            .timestamp_opt(body.current.last_updated_epoch, 0)
            .single()
            .context("Weather API returned an invalid timestamp")?;

        Ok(Self {
            location: body.location.name,
            last_updated,
            temperature: body.current.temp_c,
            humidity: body.current.humidity,
            description: body.current.condition.text,
        })
    }
}
