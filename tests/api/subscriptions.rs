use chrono::Duration;

use reqwest::StatusCode;

use wiremock::matchers::*;
use wiremock::{Mock, ResponseTemplate};

use nimbus_notify::clock::Clock;
use nimbus_notify::model::{SubscriptionStatus, TokenKind};

use crate::helpers::{NewSubscriber, TestApp};

async fn spawn_with_kyiv() -> TestApp {
    let app = TestApp::spawn().await;
    app.accept_emails().await;
    app.report_weather("Kyiv", app.clock.now(), "Light drizzle").await;
    app
}

#[tokio::test]
async fn subscribe_returns_ok_and_sends_confirmation() {
    let app = spawn_with_kyiv().await;

    let res = app
        .subscribe(&NewSubscriber::new("a@x.com", "kyiv", "daily"))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());

    let subscriptions = app.store.subscriptions().await;
    assert_eq!(1, subscriptions.len());
    assert_eq!(SubscriptionStatus::Pending, subscriptions[0].status);

    // The location is stored as the provider spells it
    let locations = app.store.locations().await;
    assert_eq!(1, locations.len());
    assert_eq!("Kyiv", locations[0].name);

    let tokens = app.store.tokens().await;
    assert_eq!(1, tokens.len());
    assert_eq!(TokenKind::Confirmation, tokens[0].kind);

    let email = app.last_email().await;
    assert_eq!("a@x.com", email.to);
    assert_eq!(tokens[0].token, email.token());
}

#[tokio::test]
async fn subscribe_returns_bad_request_for_invalid_data() {
    let app = spawn_with_kyiv().await;

    let test_cases = vec![
        (
            "missing email",
            NewSubscriber {
                email: None,
                city: Some("Kyiv".into()),
                frequency: Some("daily".into()),
            },
        ),
        (
            "missing city",
            NewSubscriber {
                email: Some("a@x.com".into()),
                city: None,
                frequency: Some("daily".into()),
            },
        ),
        (
            "missing frequency",
            NewSubscriber {
                email: Some("a@x.com".into()),
                city: Some("Kyiv".into()),
                frequency: None,
            },
        ),
        ("malformed email", NewSubscriber::new("bad email address", "Kyiv", "daily")),
        ("empty city", NewSubscriber::new("a@x.com", "  ", "daily")),
        ("unknown frequency", NewSubscriber::new("a@x.com", "Kyiv", "weekly")),
    ];

    for (desc, new_subscriber) in test_cases {
        let res = app
            .subscribe(&new_subscriber)
            .await
            .expect("Failed to execute request");

        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "The API did not reject a request with {}",
            desc
        );
    }

    assert!(app.store.subscriptions().await.is_empty());
}

#[tokio::test]
async fn subscribe_to_unknown_city_creates_nothing() {
    let app = TestApp::spawn().await;
    app.accept_emails().await;
    app.report_unknown_location().await;

    let res = app
        .subscribe(&NewSubscriber::new("a@x.com", "Atlantis", "daily"))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, res.status());
    assert!(app.store.locations().await.is_empty());
    assert!(app.store.subscribers().await.is_empty());
    assert!(app.store.subscriptions().await.is_empty());
    assert!(app.sent_emails().await.is_empty());
}

#[tokio::test]
async fn subscribing_twice_is_a_conflict() {
    let app = spawn_with_kyiv().await;
    let new_subscriber = NewSubscriber::new("a@x.com", "Kyiv", "daily");

    let first = app.subscribe(&new_subscriber).await.unwrap();
    let second = app
        .subscribe(&NewSubscriber::new("a@x.com", "KYIV", "hourly"))
        .await
        .unwrap();

    assert_eq!(StatusCode::OK, first.status());
    assert_eq!(StatusCode::CONFLICT, second.status());
    assert_eq!(1, app.store.subscriptions().await.len());
    assert_eq!(1, app.sent_emails().await.len());
}

#[tokio::test]
async fn subscribe_rolls_back_when_email_fails() {
    let app = TestApp::spawn().await;
    app.report_weather("Kyiv", app.clock.now(), "Light drizzle").await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let res = app
        .subscribe(&NewSubscriber::new("a@x.com", "Kyiv", "daily"))
        .await
        .unwrap();

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    assert!(app.store.locations().await.is_empty());
    assert!(app.store.subscribers().await.is_empty());
    assert!(app.store.subscriptions().await.is_empty());
    assert!(app.store.tokens().await.is_empty());
}

#[tokio::test]
async fn confirm_activates_subscription_and_issues_one_unsubscribe_token() {
    let app = spawn_with_kyiv().await;
    app.subscribe(&NewSubscriber::new("a@x.com", "Kyiv", "daily"))
        .await
        .unwrap();
    let confirmation = app.last_email().await;

    let res = app.confirm(&confirmation.token()).await.unwrap();

    assert_eq!(StatusCode::OK, res.status());

    let subscriptions = app.store.subscriptions().await;
    assert_eq!(SubscriptionStatus::Confirmed, subscriptions[0].status);

    let unsubscribe_tokens: Vec<_> = app
        .store
        .tokens()
        .await
        .into_iter()
        .filter(|t| t.kind == TokenKind::Unsubscribe)
        .collect();
    assert_eq!(1, unsubscribe_tokens.len());
    assert_eq!(subscriptions[0].id, unsubscribe_tokens[0].subscription_id);
    assert_eq!(
        unsubscribe_tokens[0].created_at + Duration::days(1),
        unsubscribe_tokens[0].expires_at
    );

    let email = app.last_email().await;
    assert!(email.link().contains("/unsubscribe/"));
    assert_eq!(unsubscribe_tokens[0].token, email.token());
}

#[tokio::test]
async fn confirming_twice_reconfirms_and_issues_another_unsubscribe_token() {
    let app = spawn_with_kyiv().await;
    app.subscribe(&NewSubscriber::new("a@x.com", "Kyiv", "daily"))
        .await
        .unwrap();
    let token = app.last_email().await.token();

    let first = app.confirm(&token).await.unwrap();
    app.clock.advance(Duration::minutes(1));
    let second = app.confirm(&token).await.unwrap();

    assert_eq!(StatusCode::OK, first.status());
    assert_eq!(StatusCode::OK, second.status());
    assert_eq!(
        SubscriptionStatus::Confirmed,
        app.store.subscriptions().await[0].status
    );

    let unsubscribe_tokens: Vec<_> = app
        .store
        .tokens()
        .await
        .into_iter()
        .filter(|t| t.kind == TokenKind::Unsubscribe)
        .collect();
    assert_eq!(2, unsubscribe_tokens.len());

    // The newest token is the one mailed out
    let newest = unsubscribe_tokens
        .iter()
        .max_by_key(|t| t.created_at)
        .unwrap();
    assert_eq!(newest.token, app.last_email().await.token());
}

#[tokio::test]
async fn confirm_with_unknown_token_is_not_found() {
    let app = spawn_with_kyiv().await;
    app.subscribe(&NewSubscriber::new("a@x.com", "Kyiv", "daily"))
        .await
        .unwrap();
    let token = app.last_email().await.token();

    // Correctly shaped but never issued
    let (payload, _) = token.split_once('.').unwrap();
    let forged = format!("{}.c2lnbmF0dXJl", payload);

    for token in ["not-a-token", forged.as_str()] {
        let res = app.confirm(token).await.unwrap();
        assert_eq!(StatusCode::NOT_FOUND, res.status(), "token {}", token);
    }

    assert_eq!(
        SubscriptionStatus::Pending,
        app.store.subscriptions().await[0].status
    );
}

#[tokio::test]
async fn confirm_with_expired_token_is_rejected() {
    let app = spawn_with_kyiv().await;
    app.subscribe(&NewSubscriber::new("a@x.com", "Kyiv", "daily"))
        .await
        .unwrap();
    let token = app.last_email().await.token();

    app.clock.advance(Duration::minutes(16));
    let res = app.confirm(&token).await.unwrap();

    assert_eq!(StatusCode::BAD_REQUEST, res.status());
    assert_eq!(
        SubscriptionStatus::Pending,
        app.store.subscriptions().await[0].status
    );
}

#[tokio::test]
async fn confirm_with_unsubscribe_token_is_rejected() {
    let app = spawn_with_kyiv().await;
    let unsubscribe_token = app.subscribe_confirmed("a@x.com", "Kyiv", "daily").await;

    let res = app.confirm(&unsubscribe_token).await.unwrap();

    assert_eq!(StatusCode::BAD_REQUEST, res.status());
}

#[tokio::test]
async fn unsubscribe_removes_subscription_once() {
    let app = spawn_with_kyiv().await;
    let token = app.subscribe_confirmed("a@x.com", "Kyiv", "daily").await;

    let first = app.unsubscribe(&token).await.unwrap();

    assert_eq!(StatusCode::OK, first.status());
    assert!(app.store.subscriptions().await.is_empty());
    assert_eq!("a@x.com", app.last_email().await.to);

    let emails_sent = app.sent_emails().await.len();
    let second = app.unsubscribe(&token).await.unwrap();

    assert_eq!(StatusCode::NOT_FOUND, second.status());
    assert_eq!("Subscription not found", second.text().await.unwrap());
    assert_eq!(emails_sent, app.sent_emails().await.len());
}

#[tokio::test]
async fn unsubscribe_with_confirmation_token_is_rejected() {
    let app = spawn_with_kyiv().await;
    app.subscribe(&NewSubscriber::new("a@x.com", "Kyiv", "daily"))
        .await
        .unwrap();
    let confirmation_token = app.last_email().await.token();

    let res = app.unsubscribe(&confirmation_token).await.unwrap();

    assert_eq!(StatusCode::BAD_REQUEST, res.status());
    assert_eq!(1, app.store.subscriptions().await.len());
}

#[tokio::test]
async fn resubscribing_after_unsubscribe_is_allowed() {
    let app = spawn_with_kyiv().await;
    let token = app.subscribe_confirmed("a@x.com", "Kyiv", "daily").await;
    app.unsubscribe(&token).await.unwrap();

    let res = app
        .subscribe(&NewSubscriber::new("a@x.com", "Kyiv", "hourly"))
        .await
        .unwrap();

    assert_eq!(StatusCode::OK, res.status());
    assert_eq!(1, app.store.subscribers().await.len());
}
