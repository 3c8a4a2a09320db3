use uuid::Uuid;

use super::{PgTransaction, RepoResult};
use crate::model::WeatherReading;

/// Weather reading repository, append-only
#[async_trait::async_trait]
pub trait WeatherRepo {
    async fn insert_reading(&mut self, reading: &WeatherReading) -> RepoResult<()>;

    /// The reading with the latest `last_updated` for a location
    async fn latest_reading(&mut self, location_id: Uuid) -> RepoResult<Option<WeatherReading>>;
}

#[async_trait::async_trait]
impl WeatherRepo for PgTransaction {
    #[tracing::instrument(name = "Insert weather reading", skip(self))]
    async fn insert_reading(&mut self, reading: &WeatherReading) -> RepoResult<()> {
        sqlx::query(
            "insert into weather(location_id, last_updated, fetched_at, temperature, humidity, description) \
             values ($1, $2, $3, $4, $5, $6)",
        )
        .bind(reading.location_id)
        .bind(reading.last_updated)
        .bind(reading.fetched_at)
        .bind(reading.temperature)
        .bind(reading.humidity)
        .bind(&reading.description)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    #[tracing::instrument(name = "Fetch latest weather reading", skip(self))]
    async fn latest_reading(&mut self, location_id: Uuid) -> RepoResult<Option<WeatherReading>> {
        let reading = sqlx::query_as::<_, WeatherReading>(
            "select location_id, last_updated, fetched_at, temperature, humidity, description \
             from weather where location_id = $1 \
             order by last_updated desc, fetched_at desc limit 1",
        )
        .bind(location_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(reading)
    }
}
