use actix_web::{get, web, HttpResponse, Responder};

use serde::{Deserialize, Serialize};

use crate::domain::CityName;
use crate::model::WeatherReading;
use crate::service::WeatherService;

use super::{RestError, RestResult};

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    city: Option<String>,
}

#[derive(Debug, Serialize)]
struct CurrentWeather {
    temperature: f32,
    humidity: f32,
    description: String,
}

impl From<WeatherReading> for CurrentWeather {
    fn from(reading: WeatherReading) -> Self {
        Self {
            temperature: reading.temperature,
            humidity: reading.humidity,
            description: reading.description,
        }
    }
}

/// Current weather for a city
#[tracing::instrument(name = "Get current weather", skip(service))]
#[get("/weather")]
async fn current_weather(
    service: web::Data<WeatherService>,
    query: web::Query<WeatherQuery>,
) -> RestResult<impl Responder> {
    let city: CityName = query
        .city
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(RestError::BadRequest)?;

    let reading = service.get_current_weather(&city).await?;

    Ok(HttpResponse::Ok().json(CurrentWeather::from(reading)))
}

/// Weather endpoints
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(current_weather);
}
