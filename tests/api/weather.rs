use chrono::Duration;

use reqwest::StatusCode;

use wiremock::matchers::*;
use wiremock::{Mock, ResponseTemplate};

use nimbus_notify::clock::Clock;

use crate::helpers::{weather_body, TestApp};

#[tokio::test]
async fn returns_current_weather_as_json() {
    let app = TestApp::spawn().await;
    app.report_weather("Kyiv", app.clock.now(), "Light drizzle").await;

    let res = app
        .weather(Some("Kyiv"))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());

    let body: serde_json::Value = res.json().await.expect("Response is not JSON");
    assert_eq!(Some(6.6), body["temperature"].as_f64());
    assert_eq!(Some(81.0), body["humidity"].as_f64());
    assert_eq!(Some("Light drizzle"), body["description"].as_str());

    assert_eq!(1, app.store.locations().await.len());
    assert_eq!(1, app.store.readings().await.len());
}

#[tokio::test]
async fn missing_city_is_a_bad_request() {
    let app = TestApp::spawn().await;

    for city in [None, Some(""), Some("   ")] {
        let res = app.weather(city).await.expect("Failed to execute request");

        assert_eq!(StatusCode::BAD_REQUEST, res.status(), "city {:?}", city);
    }
}

#[tokio::test]
async fn unknown_city_is_not_found() {
    let app = TestApp::spawn().await;
    app.report_unknown_location().await;

    let res = app
        .weather(Some("Atlantis"))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::NOT_FOUND, res.status());
    assert!(app.store.locations().await.is_empty());
    assert!(app.store.readings().await.is_empty());
}

#[tokio::test]
async fn provider_failure_is_an_internal_error() {
    let app = TestApp::spawn().await;
    Mock::given(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.weather_server)
        .await;

    let res = app
        .weather(Some("Kyiv"))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
}

#[tokio::test]
async fn fresh_reading_is_reused() {
    let app = TestApp::spawn().await;
    let observed = app.clock.now();
    Mock::given(path("/v1/current.json"))
        .and(query_param("q", "Kyiv"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(weather_body("Kyiv", observed, "Sunny")),
        )
        .expect(1)
        .mount(&app.weather_server)
        .await;

    let first = app.weather(Some("Kyiv")).await.unwrap();
    app.clock.advance(Duration::minutes(5));
    let second = app.weather(Some("kyiv")).await.unwrap();

    assert_eq!(StatusCode::OK, first.status());
    assert_eq!(StatusCode::OK, second.status());
    assert_eq!(1, app.store.readings().await.len());
}

#[tokio::test]
async fn stale_reading_is_refreshed_and_appended() {
    let app = TestApp::spawn().await;
    let observed = app.clock.now();
    Mock::given(path("/v1/current.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(weather_body("Kyiv", observed, "Sunny")),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&app.weather_server)
        .await;
    Mock::given(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body(
            "Kyiv",
            observed + Duration::minutes(20),
            "Overcast",
        )))
        .expect(1)
        .mount(&app.weather_server)
        .await;

    app.weather(Some("Kyiv")).await.unwrap();
    app.clock.advance(Duration::minutes(20));
    let res = app.weather(Some("Kyiv")).await.unwrap();

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(Some("Overcast"), body["description"].as_str());

    let readings = app.store.readings().await;
    assert_eq!(2, readings.len());
    assert_eq!(
        vec!["Sunny", "Overcast"],
        readings
            .iter()
            .map(|r| r.description.as_str())
            .collect::<Vec<_>>()
    );
}
