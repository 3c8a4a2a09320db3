use uuid::Uuid;

use super::postgres::unique_violation;
use super::{PgTransaction, RepoResult};
use crate::domain::Frequency;
use crate::model::{Subscription, SubscriptionStatus};

const SUBSCRIPTION_COLUMNS: &str =
    "id, subscriber_id, location_id, frequency, status, created_at, updated_at";

/// Subscription repository
#[async_trait::async_trait]
pub trait SubscriptionRepo {
    async fn subscription_by_id(&mut self, id: Uuid) -> RepoResult<Option<Subscription>>;

    async fn subscription_by_subscriber_and_location(
        &mut self,
        subscriber_id: Uuid,
        location_id: Uuid,
    ) -> RepoResult<Option<Subscription>>;

    /// Insert a new subscription.
    /// Fails with `UniqueViolation` if the subscriber already follows the location.
    async fn insert_subscription(&mut self, subscription: &Subscription) -> RepoResult<()>;

    /// Persist status and `updated_at`, returning the stored row if it still exists
    async fn update_subscription(
        &mut self,
        subscription: &Subscription,
    ) -> RepoResult<Option<Subscription>>;

    /// Hard delete, returns whether a row was removed
    async fn delete_subscription(&mut self, id: Uuid) -> RepoResult<bool>;

    async fn confirmed_subscriptions_by_frequency(
        &mut self,
        frequency: Frequency,
    ) -> RepoResult<Vec<Subscription>>;
}

#[async_trait::async_trait]
impl SubscriptionRepo for PgTransaction {
    #[tracing::instrument(name = "Fetch subscription by id", skip(self))]
    async fn subscription_by_id(&mut self, id: Uuid) -> RepoResult<Option<Subscription>> {
        let query = format!("select {} from subscription where id = $1", SUBSCRIPTION_COLUMNS);
        let subscription = sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(subscription)
    }

    #[tracing::instrument(name = "Fetch subscription by subscriber and location", skip(self))]
    async fn subscription_by_subscriber_and_location(
        &mut self,
        subscriber_id: Uuid,
        location_id: Uuid,
    ) -> RepoResult<Option<Subscription>> {
        let query = format!(
            "select {} from subscription where subscriber_id = $1 and location_id = $2",
            SUBSCRIPTION_COLUMNS
        );
        let subscription = sqlx::query_as::<_, Subscription>(&query)
            .bind(subscriber_id)
            .bind(location_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(subscription)
    }

    #[tracing::instrument(name = "Insert subscription", skip(self, subscription), fields(id = %subscription.id))]
    async fn insert_subscription(&mut self, subscription: &Subscription) -> RepoResult<()> {
        sqlx::query(
            "insert into subscription(id, subscriber_id, location_id, frequency, status, created_at, updated_at) \
             values ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(subscription.id)
        .bind(subscription.subscriber_id)
        .bind(subscription.location_id)
        .bind(subscription.frequency.as_ref())
        .bind(subscription.status.as_ref())
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(unique_violation("subscription"))?;

        Ok(())
    }

    #[tracing::instrument(name = "Update subscription", skip(self, subscription), fields(id = %subscription.id))]
    async fn update_subscription(
        &mut self,
        subscription: &Subscription,
    ) -> RepoResult<Option<Subscription>> {
        let query = format!(
            "update subscription set status = $2, updated_at = $3 where id = $1 returning {}",
            SUBSCRIPTION_COLUMNS
        );
        let subscription = sqlx::query_as::<_, Subscription>(&query)
            .bind(subscription.id)
            .bind(subscription.status.as_ref())
            .bind(subscription.updated_at)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(subscription)
    }

    #[tracing::instrument(name = "Delete subscription", skip(self))]
    async fn delete_subscription(&mut self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("delete from subscription where id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Fetch confirmed subscriptions by frequency", skip(self))]
    async fn confirmed_subscriptions_by_frequency(
        &mut self,
        frequency: Frequency,
    ) -> RepoResult<Vec<Subscription>> {
        let query = format!(
            "select {} from subscription where frequency = $1 and status = $2 order by created_at",
            SUBSCRIPTION_COLUMNS
        );
        let subscriptions = sqlx::query_as::<_, Subscription>(&query)
            .bind(frequency.as_ref())
            .bind(SubscriptionStatus::Confirmed.as_ref())
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(subscriptions)
    }
}
