use actix_web::http::StatusCode;
use actix_web::ResponseError;

use thiserror::Error;

use crate::error::{Error, ErrorKind};

pub type RestResult<T> = Result<T, RestError>;

#[derive(Debug, Error)]
pub enum RestError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal Server Error")]
    Internal(#[source] Error),
}

impl From<Error> for RestError {
    fn from(e: Error) -> Self {
        match e.kind() {
            ErrorKind::NotFound => Self::NotFound(e.to_string()),
            ErrorKind::Conflict => Self::Conflict(e.to_string()),
            ErrorKind::Invalid => Self::BadRequest(e.to_string()),
            ErrorKind::Integrity | ErrorKind::Upstream | ErrorKind::Internal => {
                tracing::error!(error = ?e, "Request failed");
                Self::Internal(e)
            }
        }
    }
}

impl ResponseError for RestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
