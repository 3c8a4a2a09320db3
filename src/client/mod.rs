mod email_client;
mod weather_client;

pub use email_client::{Email, EmailClient, EmailSender};
pub use weather_client::{WeatherApiClient, WeatherError, WeatherProvider, WeatherReport};
