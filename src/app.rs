use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use tracing_actix_web::TracingLogger;

use crate::controller::{subscriptions, weather};
use crate::service::{SubscriptionService, WeatherService};

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("I am alive")
}

/// Run the application on a specified TCP listener
pub fn run(
    listener: TcpListener,
    subscription_service: Arc<SubscriptionService>,
    weather_service: Arc<WeatherService>,
) -> anyhow::Result<Server> {
    // Wrap application data
    let subscription_service = web::Data::from(subscription_service);
    let weather_service = web::Data::from(weather_service);

    // Start the server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(subscription_service.clone())
            .app_data(weather_service.clone())
            .service(health_check)
            .configure(subscriptions::configure)
            .configure(weather::configure)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
