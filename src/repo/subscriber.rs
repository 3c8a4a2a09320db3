use chrono::{DateTime, Utc};

use uuid::Uuid;

use super::{PgTransaction, RepoResult};
use crate::model::Subscriber;

/// Subscriber repository
#[async_trait::async_trait]
pub trait SubscriberRepo {
    async fn subscriber_by_id(&mut self, id: Uuid) -> RepoResult<Option<Subscriber>>;

    /// Insert a subscriber, or return the stored one if the email is taken
    async fn insert_subscriber(
        &mut self,
        email: &str,
        created_at: DateTime<Utc>,
    ) -> RepoResult<Subscriber>;
}

#[async_trait::async_trait]
impl SubscriberRepo for PgTransaction {
    #[tracing::instrument(name = "Fetch subscriber by id", skip(self))]
    async fn subscriber_by_id(&mut self, id: Uuid) -> RepoResult<Option<Subscriber>> {
        let subscriber = sqlx::query_as::<_, Subscriber>(
            "select id, email, created_at from subscriber where id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(subscriber)
    }

    #[tracing::instrument(name = "Insert subscriber", skip(self))]
    async fn insert_subscriber(
        &mut self,
        email: &str,
        created_at: DateTime<Utc>,
    ) -> RepoResult<Subscriber> {
        let subscriber = sqlx::query_as::<_, Subscriber>(
            "insert into subscriber(id, email, created_at) values ($1, $2, $3) \
             on conflict (email) do update set email = excluded.email \
             returning id, email, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(created_at)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(subscriber)
    }
}
