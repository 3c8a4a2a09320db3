mod location;
mod memory;
mod postgres;
mod subscriber;
mod subscription;
mod token;
mod weather;

pub use location::LocationRepo;
pub use memory::{MemoryStore, MemoryTransaction};
pub use postgres::{PgStore, PgTransaction};
pub use subscriber::SubscriberRepo;
pub use subscription::SubscriptionRepo;
pub use token::TokenRepo;
pub use weather::WeatherRepo;

/// Errors raised by storage implementations
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Unique constraint violated on {0}")]
    UniqueViolation(&'static str),
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage engine, hands out transactions.
/// NOTE: Intended to facilitate easier testing/mocking
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> RepoResult<Box<dyn Transaction>>;
}

/// A unit of work over every repository.
///
/// Dropping a transaction without calling [`Transaction::commit`] rolls back
/// every write made through it.
#[async_trait::async_trait]
pub trait Transaction:
    LocationRepo + SubscriberRepo + SubscriptionRepo + TokenRepo + WeatherRepo + Send
{
    async fn commit(self: Box<Self>) -> RepoResult<()>;
}
