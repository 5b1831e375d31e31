use axum::http::StatusCode;
use serde_json::json;

use crate::common::{
    TestClient, TestStateBuilder, WEBHOOK_SECRET, db,
    fixtures::{hosted_event, invite_guest},
};

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_delivery_events_update_invite() {
    let state = TestStateBuilder::new()
        .with_webhook_secret()
        .build()
        .await
        .expect("test state");
    let client = TestClient::new(state.clone());
    let hosted = hosted_event(&client, &state.pool, None).await;
    let link = invite_guest(&client, &hosted, "Ada").await;

    let message_id = format!("<{}@mail.test>", link.invite_id);
    db::mark_sent(&state.pool, link.invite_id, &message_id).await.unwrap();

    let opened = json!({ "event": "opened", "message_id": message_id }).to_string();
    client
        .post_webhook(&opened, Some(WEBHOOK_SECRET))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert_eq!(db::invite_status(&state.pool, link.invite_id).await.unwrap(), "sent");

    let delivered = json!({ "event": "delivered", "message_id": message_id }).to_string();
    client
        .post_webhook(&delivered, Some(WEBHOOK_SECRET))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert_eq!(db::invite_status(&state.pool, link.invite_id).await.unwrap(), "delivered");
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_late_failure_does_not_override_reply() {
    let state = TestStateBuilder::new()
        .with_webhook_secret()
        .build()
        .await
        .expect("test state");
    let client = TestClient::new(state.clone());
    let hosted = hosted_event(&client, &state.pool, None).await;
    let link = invite_guest(&client, &hosted, "Grace").await;

    let message_id = format!("<{}@mail.test>", link.invite_id);
    db::mark_sent(&state.pool, link.invite_id, &message_id).await.unwrap();

    client
        .post_json(&link.path, &json!({ "response": "attending" }))
        .await
        .assert_status(StatusCode::OK);

    let failed = json!({ "event": "failed", "message_id": message_id, "reason": "bounced" }).to_string();
    client
        .post_webhook(&failed, Some(WEBHOOK_SECRET))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert_eq!(db::invite_status(&state.pool, link.invite_id).await.unwrap(), "responded");
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_unknown_message_id_is_accepted() {
    let state = TestStateBuilder::new()
        .with_webhook_secret()
        .build()
        .await
        .expect("test state");
    let client = TestClient::new(state);

    let body = json!({ "event": "delivered", "message_id": "<nobody@mail.test>" }).to_string();
    client
        .post_webhook(&body, Some(WEBHOOK_SECRET))
        .await
        .assert_status(StatusCode::NO_CONTENT);
}
