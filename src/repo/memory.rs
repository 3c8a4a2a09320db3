use std::sync::Arc;

use chrono::{DateTime, Utc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use uuid::Uuid;

use super::{
    LocationRepo, RepoError, RepoResult, Store, SubscriberRepo, SubscriptionRepo, TokenRepo,
    Transaction, WeatherRepo,
};
use crate::domain::Frequency;
use crate::model::{
    Location, Subscriber, Subscription, SubscriptionStatus, Token, TokenKind, WeatherReading,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    locations: Vec<Location>,
    subscribers: Vec<Subscriber>,
    subscriptions: Vec<Subscription>,
    tokens: Vec<Token>,
    readings: Vec<WeatherReading>,
}

/// In-process storage with the same constraints as the Postgres schema.
///
/// Transactions are serialized: each one holds the store lock and works on a
/// copy of the data, which replaces the stored state on commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn locations(&self) -> Vec<Location> {
        self.state.lock().await.locations.clone()
    }

    pub async fn subscribers(&self) -> Vec<Subscriber> {
        self.state.lock().await.subscribers.clone()
    }

    pub async fn subscriptions(&self) -> Vec<Subscription> {
        self.state.lock().await.subscriptions.clone()
    }

    pub async fn tokens(&self) -> Vec<Token> {
        self.state.lock().await.tokens.clone()
    }

    pub async fn readings(&self) -> Vec<WeatherReading> {
        self.state.lock().await.readings.clone()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> RepoResult<Box<dyn Transaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();

        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

/// Transaction over a [`MemoryStore`]
#[derive(Debug)]
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait::async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(self: Box<Self>) -> RepoResult<()> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait::async_trait]
impl LocationRepo for MemoryTransaction {
    async fn location_by_name(&mut self, name: &str) -> RepoResult<Option<Location>> {
        let name = name.to_lowercase();
        Ok(self
            .working
            .locations
            .iter()
            .find(|l| l.name.to_lowercase() == name)
            .cloned())
    }

    async fn location_by_id(&mut self, id: Uuid) -> RepoResult<Option<Location>> {
        Ok(self.working.locations.iter().find(|l| l.id == id).cloned())
    }

    async fn insert_location(&mut self, name: &str) -> RepoResult<Location> {
        if let Some(existing) = self.working.locations.iter().find(|l| l.name == name) {
            return Ok(existing.clone());
        }
        let location = Location {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.working.locations.push(location.clone());
        Ok(location)
    }
}

#[async_trait::async_trait]
impl SubscriberRepo for MemoryTransaction {
    async fn subscriber_by_id(&mut self, id: Uuid) -> RepoResult<Option<Subscriber>> {
        Ok(self.working.subscribers.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_subscriber(
        &mut self,
        email: &str,
        created_at: DateTime<Utc>,
    ) -> RepoResult<Subscriber> {
        if let Some(existing) = self.working.subscribers.iter().find(|s| s.email == email) {
            return Ok(existing.clone());
        }
        let subscriber = Subscriber {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at,
        };
        self.working.subscribers.push(subscriber.clone());
        Ok(subscriber)
    }
}

#[async_trait::async_trait]
impl SubscriptionRepo for MemoryTransaction {
    async fn subscription_by_id(&mut self, id: Uuid) -> RepoResult<Option<Subscription>> {
        Ok(self
            .working
            .subscriptions
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn subscription_by_subscriber_and_location(
        &mut self,
        subscriber_id: Uuid,
        location_id: Uuid,
    ) -> RepoResult<Option<Subscription>> {
        Ok(self
            .working
            .subscriptions
            .iter()
            .find(|s| s.subscriber_id == subscriber_id && s.location_id == location_id)
            .cloned())
    }

    async fn insert_subscription(&mut self, subscription: &Subscription) -> RepoResult<()> {
        let taken = self.working.subscriptions.iter().any(|s| {
            s.id == subscription.id
                || (s.subscriber_id == subscription.subscriber_id
                    && s.location_id == subscription.location_id)
        });
        if taken {
            return Err(RepoError::UniqueViolation("subscription"));
        }
        self.working.subscriptions.push(subscription.clone());
        Ok(())
    }

    async fn update_subscription(
        &mut self,
        subscription: &Subscription,
    ) -> RepoResult<Option<Subscription>> {
        let stored = self
            .working
            .subscriptions
            .iter_mut()
            .find(|s| s.id == subscription.id);

        Ok(stored.map(|stored| {
            stored.status = subscription.status;
            stored.updated_at = subscription.updated_at;
            stored.clone()
        }))
    }

    async fn delete_subscription(&mut self, id: Uuid) -> RepoResult<bool> {
        let before = self.working.subscriptions.len();
        self.working.subscriptions.retain(|s| s.id != id);
        Ok(self.working.subscriptions.len() < before)
    }

    async fn confirmed_subscriptions_by_frequency(
        &mut self,
        frequency: Frequency,
    ) -> RepoResult<Vec<Subscription>> {
        Ok(self
            .working
            .subscriptions
            .iter()
            .filter(|s| s.frequency == frequency && s.status == SubscriptionStatus::Confirmed)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl TokenRepo for MemoryTransaction {
    async fn insert_token(&mut self, token: &Token) -> RepoResult<()> {
        if self.working.tokens.iter().any(|t| t.token == token.token) {
            return Err(RepoError::UniqueViolation("token"));
        }
        self.working.tokens.push(token.clone());
        Ok(())
    }

    async fn token_by_value(&mut self, token: &str) -> RepoResult<Option<Token>> {
        Ok(self
            .working
            .tokens
            .iter()
            .find(|t| t.token == token)
            .cloned())
    }

    async fn latest_token_for_subscription(
        &mut self,
        subscription_id: Uuid,
        kind: TokenKind,
    ) -> RepoResult<Option<Token>> {
        Ok(self
            .working
            .tokens
            .iter()
            .filter(|t| t.subscription_id == subscription_id && t.kind == kind)
            .max_by_key(|t| t.created_at)
            .cloned())
    }
}

#[async_trait::async_trait]
impl WeatherRepo for MemoryTransaction {
    async fn insert_reading(&mut self, reading: &WeatherReading) -> RepoResult<()> {
        self.working.readings.push(reading.clone());
        Ok(())
    }

    async fn latest_reading(&mut self, location_id: Uuid) -> RepoResult<Option<WeatherReading>> {
        Ok(self
            .working
            .readings
            .iter()
            .filter(|r| r.location_id == location_id)
            .max_by_key(|r| (r.last_updated, r.fetched_at))
            .cloned())
    }
}
