use uuid::Uuid;

use super::postgres::unique_violation;
use super::{PgTransaction, RepoResult};
use crate::model::{Token, TokenKind};

/// Token repository
#[async_trait::async_trait]
pub trait TokenRepo {
    async fn insert_token(&mut self, token: &Token) -> RepoResult<()>;

    async fn token_by_value(&mut self, token: &str) -> RepoResult<Option<Token>>;

    /// Most recently issued token of a kind for a subscription
    async fn latest_token_for_subscription(
        &mut self,
        subscription_id: Uuid,
        kind: TokenKind,
    ) -> RepoResult<Option<Token>>;
}

#[async_trait::async_trait]
impl TokenRepo for PgTransaction {
    #[tracing::instrument(
        name = "Insert token",
        skip(self, token),
        fields(subscription_id = %token.subscription_id, kind = %token.kind)
    )]
    async fn insert_token(&mut self, token: &Token) -> RepoResult<()> {
        sqlx::query(
            "insert into token(token, subscription_id, kind, created_at, expires_at, used_at) \
             values ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&token.token)
        .bind(token.subscription_id)
        .bind(token.kind.as_ref())
        .bind(token.created_at)
        .bind(token.expires_at)
        .bind(token.used_at)
        .execute(&mut *self.tx)
        .await
        .map_err(unique_violation("token"))?;

        Ok(())
    }

    #[tracing::instrument(name = "Fetch token", skip(self, token))]
    async fn token_by_value(&mut self, token: &str) -> RepoResult<Option<Token>> {
        let token = sqlx::query_as::<_, Token>(
            "select token, subscription_id, kind, created_at, expires_at, used_at \
             from token where token = $1",
        )
        .bind(token)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(token)
    }

    #[tracing::instrument(name = "Fetch latest token for subscription", skip(self))]
    async fn latest_token_for_subscription(
        &mut self,
        subscription_id: Uuid,
        kind: TokenKind,
    ) -> RepoResult<Option<Token>> {
        let token = sqlx::query_as::<_, Token>(
            "select token, subscription_id, kind, created_at, expires_at, used_at \
             from token where subscription_id = $1 and kind = $2 \
             order by created_at desc limit 1",
        )
        .bind(subscription_id)
        .bind(kind.as_ref())
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(token)
    }
}
