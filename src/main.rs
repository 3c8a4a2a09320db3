use std::net::TcpListener;
use std::sync::Arc;

use anyhow::Context as _;

use sqlx::PgPool;

use nimbus_notify::app;
use nimbus_notify::client::{EmailClient, WeatherApiClient};
use nimbus_notify::clock::SystemClock;
use nimbus_notify::crypto::SigningKey;
use nimbus_notify::repo::PgStore;
use nimbus_notify::scheduler::Scheduler;
use nimbus_notify::service::{
    Context, NotificationDispatcher, SubscriptionService, TokenIssuer, WeatherService,
};
use nimbus_notify::settings::Settings;
use nimbus_notify::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = telemetry::create_subscriber("info", std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let settings = Settings::load()?;

    let pool = PgPool::connect_with(settings.database.with_db())
        .await
        .context("Failed to connect to database")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let email_client = EmailClient::new(
        settings.email.sender()?,
        settings.email.api_timeout(),
        settings.email.api_base_url()?,
        settings.email.api_auth_token(),
    )?;
    let weather_client = WeatherApiClient::new(
        settings.weather.api_timeout(),
        settings.weather.api_base_url()?,
        settings.weather.api_key(),
    )?;

    let ctx = Context {
        store: Arc::new(PgStore::new(pool)),
        weather: Arc::new(weather_client),
        email: Arc::new(email_client),
        clock: Arc::new(SystemClock),
    };
    let base_url = settings.app.base_url();
    let tokens = TokenIssuer::new(SigningKey::new(settings.app.secret_key())?);

    let subscriptions = Arc::new(SubscriptionService::new(
        ctx.clone(),
        tokens,
        settings.emails.clone(),
        base_url.clone(),
    ));
    let weather = Arc::new(WeatherService::new(ctx.clone()));
    let dispatcher = Arc::new(NotificationDispatcher::new(
        ctx,
        settings.emails.weather.clone(),
        base_url,
    ));

    let mut scheduler = Scheduler::new(dispatcher)
        .await?
        .start(&settings.scheduler)
        .await?;

    let listener = TcpListener::bind(settings.app.addr())?;
    tracing::info!(addr = ?listener.local_addr()?, "Starting server");

    app::run(listener, subscriptions, weather)?
        .await
        .context("Failed to run app")?;

    scheduler
        .shutdown()
        .await
        .context("Failed to stop job scheduler")
}
