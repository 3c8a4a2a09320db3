use crate::domain::CityName;
use crate::error::Result;
use crate::model::WeatherReading;
use super::{Context, WeatherCache};

/// On-demand current weather lookups, served from the cache when fresh
pub struct WeatherService {
    ctx: Context,
    cache: WeatherCache,
}

impl WeatherService {
    pub fn new(ctx: Context) -> Self {
        let cache = WeatherCache::new(ctx.weather.clone());
        Self { ctx, cache }
    }

    #[tracing::instrument(name = "Get current weather", skip(self))]
    pub async fn get_current_weather(&self, city: &CityName) -> Result<WeatherReading> {
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.store.begin().await?;

        let reading = match tx.location_by_name(city.as_ref()).await? {
            Some(location) => self.cache.current(tx.as_mut(), &location, now).await?,
            None => {
                let report = self.ctx.weather.current_weather(city.as_ref()).await?;
                let location = tx.insert_location(&report.location).await?;
                let reading = report.into_reading(location.id, now);

                // The provider may resolve a new spelling to an already cached observation
                let latest = tx.latest_reading(location.id).await?;
                match latest {
                    Some(latest) if latest.last_updated == reading.last_updated => {
                        tracing::info!("Latest weather update is already stored");
                        latest
                    }
                    _ => {
                        tx.insert_reading(&reading).await?;
                        reading
                    }
                }
            }
        };

        tx.commit().await?;
        Ok(reading)
    }
}
