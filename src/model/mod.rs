mod subscription;
mod token;
mod weather;

pub use subscription::{Subscriber, Subscription, SubscriptionStatus};
pub use token::{Token, TokenKind};
pub use weather::{Location, WeatherReading};
