mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use brgy_dashboard::Subscription;
use brgy_domain::changes::{ChangeAction, RecordChange};
use brgy_event_bus::EventBus;
use common::harness;
use futures_util::StreamExt;
use std::time::Duration;
use tower::ServiceExt;

fn change(table: &str, id: &str) -> RecordChange {
    RecordChange::new(table, ChangeAction::Update, id, None)
}

#[tokio::test]
async fn subscriptions_filter_by_table() {
    let events = EventBus::new();
    let mut subscription = Subscription::new(&events, ["reports"]).unwrap();

    events.publish(change("announcements", "a1")).unwrap();
    events.publish(change("reports", "r1")).unwrap();

    let next = subscription.next().await.unwrap();
    assert_eq!(next.id, "r1");
}

#[tokio::test]
async fn subscriptions_end_when_the_bus_shuts_down() {
    let events = EventBus::new();
    let mut subscription = Subscription::new(&events, Vec::<String>::new()).unwrap();
    let _ = events.shutdown();
    assert!(subscription.next().await.is_none());
}

#[tokio::test]
async fn lagging_subscribers_skip_ahead() {
    let events = EventBus::with_capacity(2).unwrap();
    let mut subscription = Subscription::new(&events, Vec::<String>::new()).unwrap();
    for n in 0..5 {
        events.publish(change("reports", &format!("r{n}"))).unwrap();
    }

    let next = subscription.next().await.unwrap();
    assert_eq!(next.id, "r3");
    assert_eq!(subscription.next().await.unwrap().id, "r4");
}

#[tokio::test]
async fn unknown_tables_are_rejected() {
    let h = harness().await;
    let (status, body) = h.send("GET", "/changes?tables=reports,secrets", Some(&h.token("clerk")), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("secrets"));
}

#[tokio::test]
async fn changes_stream_as_named_events() {
    let h = harness().await;
    let request = Request::get("/changes?tables=reports")
        .header(header::AUTHORIZATION, format!("Bearer {}", h.token("clerk")))
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");

    h.events.publish(change("announcements", "a1")).unwrap();
    h.events.publish(change("reports", "r1")).unwrap();

    let mut body = response.into_body().into_data_stream();
    let chunk = tokio::time::timeout(Duration::from_secs(5), body.next()).await.unwrap().unwrap().unwrap();
    let text = String::from_utf8(chunk.to_vec()).unwrap();
    assert!(text.starts_with("event: reports\n"), "{text}");
    assert!(text.contains("\"id\":\"r1\""));
}
