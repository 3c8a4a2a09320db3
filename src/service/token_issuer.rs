use chrono::{DateTime, Duration, Utc};

use serde::{Deserialize, Serialize};

use uuid::Uuid;

use crate::crypto::{SignedToken, SigningKey, TokenResult};
use crate::model::{Token, TokenKind};

/// Claims carried inside a signed token string
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    #[serde(rename = "sub")]
    subscription_id: Uuid,
    kind: TokenKind,
    nonce: Uuid,
}

/// Issues opaque, URL-safe tokens for subscription lifecycle links
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    key: SigningKey,
}

impl TokenIssuer {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Build a new token; persisting it is up to the caller
    pub fn issue(
        &self,
        subscription_id: Uuid,
        kind: TokenKind,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> TokenResult<Token> {
        let claims = TokenClaims {
            subscription_id,
            kind,
            nonce: Uuid::new_v4(),
        };
        let token = SignedToken::sign(&claims, self.key.as_ref())?;

        Ok(Token {
            token: token.into(),
            subscription_id,
            kind,
            created_at: now,
            expires_at: now + ttl,
            used_at: None,
        })
    }

    /// Whether a token string was signed by this issuer.
    /// Says nothing about expiry or kind, those come from the stored token.
    pub fn is_authentic(&self, token: &str) -> bool {
        token
            .parse::<SignedToken>()
            .and_then(|token| token.verify::<TokenClaims, _>(self.key.as_ref()))
            .is_ok()
    }
}
