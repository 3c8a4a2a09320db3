use std::fmt;
use std::str::FromStr;

use hmac::Mac;

use serde::{de::DeserializeOwned, Serialize};

use base64::{
    alphabet,
    engine::{self, general_purpose},
    Engine as _,
};
use regex::Regex;

lazy_static::lazy_static! {
    // URL-safe base64 engine, tokens travel in URL paths
    static ref BASE64_ENGINE: engine::GeneralPurpose =
        engine::GeneralPurpose::new(&alphabet::URL_SAFE, general_purpose::NO_PAD);
    // Regex for checking token strings
    static ref TOKEN_REGEX: Regex = Regex::new(r"^([\w-]+)\.([\w-]+)$").unwrap();
}

/// Various errors that can occur when handling signed tokens
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    // Token specific errors
    #[error("Token signature does not match")]
    SignatureMismatch,
    #[error("Token is of invalid format")]
    InvalidFormat,
    // External errors
    #[error("Invalid Utf8 string")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Serialization error")]
    Serde(#[from] serde_json::Error),
    #[error("Decode error")]
    DecodeError(#[from] base64::DecodeError),
}

/// Wrapper for token results
pub type TokenResult<T> = Result<T, TokenError>;

/// A serialized, HMAC-signed token: `base64(json payload).base64(signature)`
#[derive(Debug, Clone, PartialEq)]
pub struct SignedToken(String);

impl SignedToken {
    /// Serialize and sign a payload
    pub fn sign<T, K>(payload: &T, key: &K) -> TokenResult<Self>
    where
        T: Serialize,
        K: Mac + Clone,
    {
        // Serialize the message to a string
        let msg = serde_json::to_string(payload)?;
        // Sign the message
        let sig = sign_message(key, msg.as_bytes());
        // Base64 encode the two portions of the token
        let msg = BASE64_ENGINE.encode(msg);
        let sig = BASE64_ENGINE.encode(sig);

        Ok(Self(format!("{}.{}", msg, sig)))
    }

    /// Verify the token and deconstruct into the encoded payload value
    pub fn verify<T, K>(&self, key: &K) -> TokenResult<T>
    where
        T: DeserializeOwned,
        K: Mac + Clone,
    {
        // Split the token string into it's base64 encoded components
        let (msg, sig) = self.split().ok_or(TokenError::InvalidFormat)?;
        // Decode the components
        let msg = BASE64_ENGINE.decode(msg)?;
        let sig = BASE64_ENGINE.decode(sig)?;
        // Verify the message before deserialization
        verify_message(key, &msg, &sig)?;

        let msg = std::str::from_utf8(&msg)?;
        Ok(serde_json::from_str(msg)?)
    }

    fn split(&self) -> Option<(&str, &str)> {
        let captures = TOKEN_REGEX.captures(&self.0)?;

        let msg = captures.get(1)?.as_str();
        let sig = captures.get(2)?.as_str();
        Some((msg, sig))
    }
}

impl fmt::Display for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SignedToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<SignedToken> for String {
    fn from(token: SignedToken) -> Self {
        token.0
    }
}

impl FromStr for SignedToken {
    type Err = TokenError;

    fn from_str(token: &str) -> TokenResult<Self> {
        if !TOKEN_REGEX.is_match(token) {
            Err(TokenError::InvalidFormat)
        } else {
            Ok(Self(token.to_string()))
        }
    }
}

/// Sign a message with a Key
fn sign_message<K>(key: &K, msg: &[u8]) -> Vec<u8>
where
    K: Mac + Clone,
{
    key.clone().chain_update(msg).finalize().into_bytes().to_vec()
}

/// Verify a signed message with a key, in constant time
fn verify_message<K>(key: &K, msg: &[u8], signature: &[u8]) -> TokenResult<()>
where
    K: Mac + Clone,
{
    key.clone()
        .chain_update(msg)
        .verify_slice(signature)
        .map_err(|_| TokenError::SignatureMismatch)
}
