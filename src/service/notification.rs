use crate::domain::{EmailTemplate, Frequency};
use crate::error::{Error, Result};
use crate::model::TokenKind;

use super::subscription::recipient;
use super::{Context, WeatherCache};

/// Sends the periodic weather emails for one frequency at a time
pub struct NotificationDispatcher {
    ctx: Context,
    cache: WeatherCache,
    template: EmailTemplate,
    base_url: String,
}

impl NotificationDispatcher {
    pub fn new(ctx: Context, template: EmailTemplate, base_url: String) -> Self {
        let cache = WeatherCache::new(ctx.weather.clone());
        Self {
            ctx,
            cache,
            template,
            base_url,
        }
    }

    /// Run one dispatch tick, logging the outcome
    pub async fn dispatch(&self, frequency: Frequency) {
        match self.try_dispatch(frequency).await {
            Ok(sent) => tracing::info!(%frequency, sent, "Weather notifications sent"),
            Err(e) => tracing::error!(
                %frequency,
                error = ?e,
                "Weather notifications rolled back"
            ),
        }
    }

    /// Notify every confirmed subscription of `frequency` inside one transaction.
    /// The first failure aborts the whole batch.
    #[tracing::instrument(name = "Dispatch weather notifications", skip(self))]
    pub async fn try_dispatch(&self, frequency: Frequency) -> Result<usize> {
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.store.begin().await?;

        let subscriptions = tx.confirmed_subscriptions_by_frequency(frequency).await?;
        for subscription in &subscriptions {
            let subscriber = tx
                .subscriber_by_id(subscription.subscriber_id)
                .await?
                .ok_or_else(|| Error::UnexpectedState("subscription has no subscriber".into()))?;
            let location = tx
                .location_by_id(subscription.location_id)
                .await?
                .ok_or_else(|| Error::UnexpectedState("subscription has no location".into()))?;
            let token = tx
                .latest_token_for_subscription(subscription.id, TokenKind::Unsubscribe)
                .await?
                .ok_or_else(|| {
                    Error::UnexpectedState("confirmed subscription has no unsubscribe token".into())
                })?;

            let reading = self.cache.current(tx.as_mut(), &location, now).await?;

            let temperature = reading.temperature.to_string();
            let humidity = reading.humidity.to_string();
            let email = self.template.render(
                recipient(&subscriber.email)?,
                &[
                    ("base_url", self.base_url.as_str()),
                    ("token", token.token.as_str()),
                    ("location", location.name.as_str()),
                    ("temperature", temperature.as_str()),
                    ("humidity", humidity.as_str()),
                    ("description", reading.description.as_str()),
                ],
            );
            self.ctx.email.send(&email).await.map_err(Error::SendEmail)?;
            tracing::debug!(subscription_id = %subscription.id, "Weather notification sent");
        }

        tx.commit().await?;
        Ok(subscriptions.len())
    }
}
