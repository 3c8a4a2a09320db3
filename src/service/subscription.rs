use crate::domain::{CityName, EmailAddress, EmailTemplates, Frequency};
use crate::error::{Error, Result};
use crate::model::{Subscription, Token, TokenKind};
use crate::repo::{RepoError, Transaction};

use super::{Context, TokenIssuer};

/// Subscribe, confirm and unsubscribe, each as a single transaction.
///
/// Emails are sent before the transaction commits; a failed send rolls back
/// every write made by the operation.
pub struct SubscriptionService {
    ctx: Context,
    tokens: TokenIssuer,
    templates: EmailTemplates,
    base_url: String,
}

impl SubscriptionService {
    pub fn new(ctx: Context, tokens: TokenIssuer, templates: EmailTemplates, base_url: String) -> Self {
        Self {
            ctx,
            tokens,
            templates,
            base_url,
        }
    }

    #[tracing::instrument(name = "Subscribe to weather updates", skip(self))]
    pub async fn subscribe(
        &self,
        email: &EmailAddress,
        city: &CityName,
        frequency: Frequency,
    ) -> Result<()> {
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.store.begin().await?;

        let location = match tx.location_by_name(city.as_ref()).await? {
            Some(location) => location,
            None => {
                // Stored under the provider's spelling of the name
                let report = self.ctx.weather.current_weather(city.as_ref()).await?;
                tx.insert_location(&report.location).await?
            }
        };
        let subscriber = tx.insert_subscriber(email.as_ref(), now).await?;

        if tx
            .subscription_by_subscriber_and_location(subscriber.id, location.id)
            .await?
            .is_some()
        {
            return Err(Error::SubscriptionAlreadyExists);
        }

        let subscription = Subscription::pending(subscriber.id, location.id, frequency, now);
        tx.insert_subscription(&subscription)
            .await
            .map_err(|e| match e {
                RepoError::UniqueViolation(_) => Error::SubscriptionAlreadyExists,
                e => e.into(),
            })?;

        let token = self.issue(tx.as_mut(), &subscription, TokenKind::Confirmation).await?;

        let email = self.templates.confirmation.render(
            email.clone(),
            &[
                ("base_url", self.base_url.as_str()),
                ("token", token.token.as_str()),
                ("location", location.name.as_str()),
            ],
        );
        self.ctx.email.send(&email).await.map_err(Error::SendEmail)?;

        tx.commit().await?;
        tracing::info!(subscription_id = %subscription.id, "Subscription created, confirmation sent");
        Ok(())
    }

    #[tracing::instrument(name = "Confirm subscription", skip(self, token))]
    pub async fn confirm(&self, token: &str) -> Result<()> {
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.store.begin().await?;

        let token = self
            .authorize(tx.as_mut(), token, TokenKind::Confirmation)
            .await?;

        let mut subscription = tx
            .subscription_by_id(token.subscription_id)
            .await?
            .ok_or_else(|| Error::UnexpectedState("token references a missing subscription".into()))?;
        subscription.confirm(now);
        let subscription = tx
            .update_subscription(&subscription)
            .await?
            .ok_or_else(|| Error::UnexpectedState("subscription vanished during update".into()))?;

        let subscriber = tx
            .subscriber_by_id(subscription.subscriber_id)
            .await?
            .ok_or_else(|| Error::UnexpectedState("subscription has no subscriber".into()))?;
        let location = tx
            .location_by_id(subscription.location_id)
            .await?
            .ok_or_else(|| Error::UnexpectedState("subscription has no location".into()))?;

        let unsubscribe = self.issue(tx.as_mut(), &subscription, TokenKind::Unsubscribe).await?;

        let email = self.templates.confirmation_successful.render(
            recipient(&subscriber.email)?,
            &[
                ("base_url", self.base_url.as_str()),
                ("token", unsubscribe.token.as_str()),
                ("location", location.name.as_str()),
            ],
        );
        self.ctx.email.send(&email).await.map_err(Error::SendEmail)?;

        tx.commit().await?;
        tracing::info!(subscription_id = %subscription.id, "Subscription confirmed");
        Ok(())
    }

    #[tracing::instrument(name = "Unsubscribe", skip(self, token))]
    pub async fn unsubscribe(&self, token: &str) -> Result<()> {
        let mut tx = self.ctx.store.begin().await?;

        let token = self
            .authorize(tx.as_mut(), token, TokenKind::Unsubscribe)
            .await?;

        let subscription = tx
            .subscription_by_id(token.subscription_id)
            .await?
            .ok_or(Error::SubscriptionNotFound)?;
        let subscriber = tx
            .subscriber_by_id(subscription.subscriber_id)
            .await?
            .ok_or_else(|| Error::UnexpectedState("subscription has no subscriber".into()))?;
        let location = tx
            .location_by_id(subscription.location_id)
            .await?
            .ok_or_else(|| Error::UnexpectedState("subscription has no location".into()))?;

        tx.delete_subscription(subscription.id).await?;

        let email = self.templates.unsubscribe.render(
            recipient(&subscriber.email)?,
            &[("base_url", self.base_url.as_str()), ("location", location.name.as_str())],
        );
        self.ctx.email.send(&email).await.map_err(Error::SendEmail)?;

        tx.commit().await?;
        tracing::info!(subscription_id = %subscription.id, "Subscription removed");
        Ok(())
    }

    async fn issue(
        &self,
        tx: &mut dyn Transaction,
        subscription: &Subscription,
        kind: TokenKind,
    ) -> Result<Token> {
        let token = self
            .tokens
            .issue(subscription.id, kind, kind.ttl(), self.ctx.clock.now())?;
        tx.insert_token(&token).await?;
        Ok(token)
    }

    /// Resolve a token string to a stored token valid for `kind` right now
    async fn authorize(
        &self,
        tx: &mut dyn Transaction,
        token: &str,
        kind: TokenKind,
    ) -> Result<Token> {
        if !self.tokens.is_authentic(token) {
            return Err(Error::TokenNotFound);
        }

        let token = tx.token_by_value(token).await?.ok_or(Error::TokenNotFound)?;
        if !token.authorizes(kind, self.ctx.clock.now()) {
            return Err(Error::InvalidToken);
        }
        Ok(token)
    }
}

/// Stored addresses were validated on the way in
pub(super) fn recipient(email: &str) -> Result<EmailAddress> {
    email
        .parse()
        .map_err(|e| Error::UnexpectedState(format!("stored email is invalid: {}", e)))
}
