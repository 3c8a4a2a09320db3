use actix_web::{get, post, web, HttpResponse, Responder};

use serde::Deserialize;

use crate::domain::{CityName, EmailAddress, Frequency};
use crate::error::Error;
use crate::service::SubscriptionService;

use super::{RestError, RestResult};

/// Form deserialization wrapper for parsing new subscriptions
#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
    email: String,
    city: String,
    frequency: String,
}

/// Validated subscription request
#[derive(Debug)]
pub struct NewSubscription {
    pub email: EmailAddress,
    pub city: CityName,
    pub frequency: Frequency,
}

impl TryFrom<SubscribeForm> for NewSubscription {
    type Error = String;

    fn try_from(form: SubscribeForm) -> Result<Self, Self::Error> {
        let email = form.email.parse()?;
        let city = form.city.parse()?;
        let frequency = form.frequency.parse()?;

        Ok(Self {
            email,
            city,
            frequency,
        })
    }
}

/// Subscribe an email address to weather updates for a city
#[tracing::instrument(name = "Create a new subscription", skip(service))]
#[post("/subscribe")]
async fn subscribe(
    service: web::Data<SubscriptionService>,
    form: web::Form<SubscribeForm>,
) -> RestResult<impl Responder> {
    let new_subscription: NewSubscription = form.0.try_into().map_err(RestError::BadRequest)?;

    service
        .subscribe(
            &new_subscription.email,
            &new_subscription.city,
            new_subscription.frequency,
        )
        .await
        .map_err(|e| match e {
            // A city the weather provider does not know is bad input here
            Error::LocationNotFound => RestError::BadRequest("Unknown city".into()),
            e => e.into(),
        })?;

    Ok(HttpResponse::Ok().body("Subscription successful. Confirmation email sent."))
}

/// Subscription confirmation endpoint
#[tracing::instrument(name = "Confirm a subscription by token", skip(service, path))]
#[get("/confirm/{token}")]
async fn confirm(
    service: web::Data<SubscriptionService>,
    path: web::Path<(String,)>,
) -> RestResult<impl Responder> {
    let (token,) = path.into_inner();

    service.confirm(&token).await?;

    Ok(HttpResponse::Ok().body("Subscription confirmed successfully"))
}

/// Unsubscribe endpoint
#[tracing::instrument(name = "Unsubscribe by token", skip(service, path))]
#[get("/unsubscribe/{token}")]
async fn unsubscribe(
    service: web::Data<SubscriptionService>,
    path: web::Path<(String,)>,
) -> RestResult<impl Responder> {
    let (token,) = path.into_inner();

    service.unsubscribe(&token).await?;

    Ok(HttpResponse::Ok().body("Unsubscribed successfully"))
}

/// Subscription endpoints
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(subscribe).service(confirm).service(unsubscribe);
}
