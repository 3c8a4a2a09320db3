use reqwest::StatusCode;

use wiremock::matchers::*;
use wiremock::{Mock, ResponseTemplate};

use nimbus_notify::clock::Clock;
use nimbus_notify::domain::Frequency;

use crate::helpers::{NewSubscriber, TestApp};

async fn spawn_with_weather() -> TestApp {
    let app = TestApp::spawn().await;
    app.accept_emails().await;
    app.report_weather("Kyiv", app.clock.now(), "Light drizzle").await;
    app
}

#[tokio::test]
async fn confirmed_subscribers_receive_weather_until_they_unsubscribe() {
    let app = spawn_with_weather().await;
    app.subscribe_confirmed("a@x.com", "Kyiv", "daily").await;

    let sent = app
        .dispatcher
        .try_dispatch(Frequency::Daily)
        .await
        .expect("Failed to dispatch notifications");

    assert_eq!(1, sent);

    let email = app.last_email().await;
    assert_eq!("a@x.com", email.to);
    assert_eq!("Weather update for Kyiv", email.subject);
    assert!(email.text.contains("Light drizzle"));
    assert!(email.link().contains("/unsubscribe/"));
    assert_eq!(1, app.store.readings().await.len());

    let res = app.unsubscribe(&email.token()).await.unwrap();
    assert_eq!(StatusCode::OK, res.status());

    let emails_sent = app.sent_emails().await.len();
    let sent = app.dispatcher.try_dispatch(Frequency::Daily).await.unwrap();

    assert_eq!(0, sent);
    assert_eq!(emails_sent, app.sent_emails().await.len());
}

#[tokio::test]
async fn dispatch_only_notifies_matching_frequency() {
    let app = spawn_with_weather().await;
    app.subscribe_confirmed("daily@x.com", "Kyiv", "daily").await;
    app.subscribe_confirmed("hourly@x.com", "Kyiv", "hourly").await;

    let emails_sent = app.sent_emails().await.len();
    let sent = app.dispatcher.try_dispatch(Frequency::Hourly).await.unwrap();

    assert_eq!(1, sent);

    let emails = app.sent_emails().await;
    assert_eq!(emails_sent + 1, emails.len());
    assert_eq!("hourly@x.com", emails[emails_sent].to);
}

#[tokio::test]
async fn pending_subscriptions_are_not_notified() {
    let app = spawn_with_weather().await;
    app.subscribe(&NewSubscriber::new("a@x.com", "Kyiv", "daily"))
        .await
        .unwrap();

    let emails_sent = app.sent_emails().await.len();
    let sent = app.dispatcher.try_dispatch(Frequency::Daily).await.unwrap();

    assert_eq!(0, sent);
    assert_eq!(emails_sent, app.sent_emails().await.len());
}

#[tokio::test]
async fn subscribers_of_one_city_share_a_cached_reading() {
    let app = spawn_with_weather().await;
    app.subscribe_confirmed("a@x.com", "Kyiv", "daily").await;
    app.subscribe_confirmed("b@x.com", "kyiv", "daily").await;

    let sent = app.dispatcher.try_dispatch(Frequency::Daily).await.unwrap();

    assert_eq!(2, sent);
    assert_eq!(1, app.store.readings().await.len());
}

#[tokio::test]
async fn email_failure_aborts_the_batch() {
    let app = spawn_with_weather().await;
    app.subscribe_confirmed("a@x.com", "Kyiv", "daily").await;
    app.subscribe_confirmed("b@x.com", "Kyiv", "daily").await;

    app.email_server.reset().await;
    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let result = app.dispatcher.try_dispatch(Frequency::Daily).await;

    assert!(result.is_err());
    assert!(app.store.readings().await.is_empty());
    assert_eq!(2, app.store.subscriptions().await.len());
}
