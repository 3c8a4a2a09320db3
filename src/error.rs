use crate::client::WeatherError;
use crate::crypto::TokenError;
use crate::repo::RepoError;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the subscription, weather and notification services
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Lookup errors
    #[error("Location not found")]
    LocationNotFound,
    #[error("Token not found")]
    TokenNotFound,
    #[error("Subscription not found")]
    SubscriptionNotFound,
    // Lifecycle errors
    #[error("Subscription already exists")]
    SubscriptionAlreadyExists,
    #[error("Token is expired or of the wrong type")]
    InvalidToken,
    #[error("Unexpected state: {0}")]
    UnexpectedState(String),
    // Provider errors
    #[error("Failed to fetch current weather")]
    WeatherProvider(#[source] WeatherError),
    #[error("Failed to send email")]
    SendEmail(#[source] anyhow::Error),
    // Internal errors
    #[error("Failed to sign token")]
    TokenSigning(#[from] TokenError),
    #[error(transparent)]
    Repository(#[from] RepoError),
}

/// Coarse classification of an [`Error`], used when mapping to responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Invalid,
    Integrity,
    Upstream,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LocationNotFound | Self::TokenNotFound | Self::SubscriptionNotFound => {
                ErrorKind::NotFound
            }
            Self::SubscriptionAlreadyExists => ErrorKind::Conflict,
            Self::InvalidToken => ErrorKind::Invalid,
            Self::UnexpectedState(_) => ErrorKind::Integrity,
            Self::WeatherProvider(_) | Self::SendEmail(_) => ErrorKind::Upstream,
            Self::TokenSigning(_) | Self::Repository(_) => ErrorKind::Internal,
        }
    }
}

impl From<WeatherError> for Error {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::LocationNotFound => Self::LocationNotFound,
            other => Self::WeatherProvider(other),
        }
    }
}
