use std::sync::Arc;

use crate::client::{EmailSender, WeatherProvider};
use crate::clock::Clock;
use crate::repo::Store;

mod notification;
mod subscription;
mod token_issuer;
mod weather;
mod weather_cache;

pub use notification::NotificationDispatcher;
pub use subscription::SubscriptionService;
pub use token_issuer::TokenIssuer;
pub use weather::WeatherService;
pub use weather_cache::{decide, CacheDecision, WeatherCache};

/// Collaborators shared by every service
#[derive(Clone)]
pub struct Context {
    pub store: Arc<dyn Store>,
    pub weather: Arc<dyn WeatherProvider>,
    pub email: Arc<dyn EmailSender>,
    pub clock: Arc<dyn Clock>,
}
