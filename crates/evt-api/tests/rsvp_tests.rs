use axum::http::{StatusCode, header};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use crate::common::{
    TestClient, TestStateBuilder, db,
    fixtures::{hosted_event, invite_guest},
};

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_guest_views_and_answers_invite() {
    let state = TestStateBuilder::new().build().await.expect("test state");
    let client = TestClient::new(state.clone());
    let hosted = hosted_event(&client, &state.pool, Some(10)).await;
    let link = invite_guest(&client, &hosted, "Ada Lovelace").await;

    let page = client.get(&link.path).await;
    page.assert_status(StatusCode::OK);
    assert_eq!(page.headers[header::CACHE_CONTROL], "no-store");
    let body: Value = page.json();
    assert_eq!(body["guest_name"], "Ada Lovelace");
    assert_eq!(body["event"]["spots_left"], 10);
    assert!(body["rsvp"].is_null());

    let answer = client
        .post_json(&link.path, &json!({ "response": "attending", "guest_count": 3, "note": "Bringing cake" }))
        .await;
    answer.assert_status(StatusCode::OK);
    let rsvp: Value = answer.json();
    assert_eq!(rsvp["response"], "attending");
    assert_eq!(rsvp["guest_count"], 3);

    let body: Value = client.get(&link.path).await.json();
    assert_eq!(body["status"], "responded");
    assert_eq!(body["event"]["spots_left"], 7);
    assert_eq!(body["rsvp"]["note"], "Bringing cake");

    // Changing the answer replaces it
    let rsvp: Value = client
        .post_json(&link.path, &json!({ "response": "declined", "guest_count": 3 }))
        .await
        .json();
    assert_eq!(rsvp["guest_count"], 0);

    let event: Value = client
        .get_with_auth(&format!("/events/{}", hosted.event_id), &hosted.session)
        .await
        .json();
    assert_eq!(event["rsvps"]["declined"], 1);
    assert_eq!(event["rsvps"]["attending"], 0);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_tampered_token_is_not_found() {
    let state = TestStateBuilder::new().build().await.expect("test state");
    let client = TestClient::new(state.clone());
    let hosted = hosted_event(&client, &state.pool, None).await;
    let link = invite_guest(&client, &hosted, "Grace").await;

    let mut tampered = link.path.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    client.get(&tampered).await.assert_status(StatusCode::NOT_FOUND);
    client
        .post_json(&tampered, &json!({ "response": "attending" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // A token for another invite does not work either
    let other = invite_guest(&client, &hosted, "Alan").await;
    let token = other.path.rsplit('/').next().unwrap();
    client
        .get(&format!("/rsvp/{}/{token}", link.invite_id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_expired_link_is_gone() {
    let state = TestStateBuilder::new().build().await.expect("test state");
    let client = TestClient::new(state.clone());
    let hosted = hosted_event(&client, &state.pool, None).await;
    let link = invite_guest(&client, &hosted, "Edsger").await;

    db::set_invite_expiry(&state.pool, link.invite_id, Utc::now() - Duration::minutes(5))
        .await
        .unwrap();

    client.get(&link.path).await.assert_status(StatusCode::GONE);
    client
        .post_json(&link.path, &json!({ "response": "attending" }))
        .await
        .assert_status(StatusCode::GONE);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_capacity_is_enforced() {
    let state = TestStateBuilder::new().build().await.expect("test state");
    let client = TestClient::new(state.clone());
    let hosted = hosted_event(&client, &state.pool, Some(3)).await;
    let first = invite_guest(&client, &hosted, "Ada").await;
    let second = invite_guest(&client, &hosted, "Grace").await;

    client
        .post_json(&first.path, &json!({ "response": "attending", "guest_count": 2 }))
        .await
        .assert_status(StatusCode::OK);

    client
        .post_json(&second.path, &json!({ "response": "attending", "guest_count": 2 }))
        .await
        .assert_status(StatusCode::CONFLICT);

    // A maybe does not take a seat
    client
        .post_json(&second.path, &json!({ "response": "maybe", "guest_count": 2 }))
        .await
        .assert_status(StatusCode::OK);

    // Shrinking your own party is always allowed
    client
        .post_json(&first.path, &json!({ "response": "attending", "guest_count": 1 }))
        .await
        .assert_status(StatusCode::OK);
    client
        .post_json(&second.path, &json!({ "response": "attending", "guest_count": 2 }))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_invalid_reply_rejected() {
    let state = TestStateBuilder::new().build().await.expect("test state");
    let client = TestClient::new(state.clone());
    let hosted = hosted_event(&client, &state.pool, None).await;
    let link = invite_guest(&client, &hosted, "Barbara").await;

    client
        .post_json(&link.path, &json!({ "response": "attending", "guest_count": 11 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    client
        .post_json(&link.path, &json!({ "response": "attending", "note": "x".repeat(501) }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_analytics_counts_replies() {
    let state = TestStateBuilder::new().build().await.expect("test state");
    let client = TestClient::new(state.clone());
    let hosted = hosted_event(&client, &state.pool, None).await;
    let link = invite_guest(&client, &hosted, "Ada").await;

    client
        .post_json(&link.path, &json!({ "response": "maybe" }))
        .await
        .assert_status(StatusCode::OK);

    let response = client
        .get_with_auth(
            &format!("/events/{}/analytics?days=7", hosted.event_id),
            &hosted.session,
        )
        .await;
    response.assert_status(StatusCode::OK);

    let analytics: Value = response.json();
    assert_eq!(analytics["daily"].as_array().unwrap().len(), 7);
    assert_eq!(analytics["totals"]["maybe"], 1);
    assert_eq!(analytics["totals"]["total"], 1);
    assert_eq!(analytics["daily"][6]["maybe"], 1);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_revoke_waits_for_in_flight_reply() {
    use evt_db::{
        models::RsvpResponse,
        repositories::{invite as invite_repo, rsvp as rsvp_repo},
    };

    let state = TestStateBuilder::new().build().await.expect("test state");
    let client = TestClient::new(state.clone());
    let hosted = hosted_event(&client, &state.pool, None).await;
    let link = invite_guest(&client, &hosted, "Ada").await;

    // A reply that has passed its token check and still holds the row
    let mut tx = state.pool.begin().await.expect("begin");
    let invite = invite_repo::find_by_id_for_update(&mut *tx, link.invite_id)
        .await
        .expect("lock invite")
        .expect("invite exists");

    let revoker = TestClient::new(state.clone());
    let revoke_uri = format!("/events/{}/invites/{}", hosted.event_id, link.invite_id);
    let session = hosted.session.clone();
    let revoke = tokio::spawn(async move {
        revoker.delete_with_auth(&revoke_uri, &session).await.status
    });

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert!(!revoke.is_finished(), "revoke must wait for the reply's lock");

    rsvp_repo::upsert_rsvp(&mut *tx, invite.id, invite.event_id, RsvpResponse::Attending, 4, None)
        .await
        .expect("upsert");
    assert!(invite_repo::mark_responded(&mut *tx, invite.id).await.expect("mark"));
    tx.commit().await.expect("commit");

    assert_eq!(revoke.await.expect("revoke task"), StatusCode::NO_CONTENT);

    // The revoke ran second and removed the reply
    assert_eq!(db::invite_status(&state.pool, link.invite_id).await.unwrap(), "revoked");
    let event: Value = client
        .get_with_auth(&format!("/events/{}", hosted.event_id), &hosted.session)
        .await
        .json();
    assert_eq!(event["rsvps"]["headcount"], 0);
    client.get(&link.path).await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_reply_after_revoke_keeps_invite_revoked() {
    use evt_db::repositories::invite as invite_repo;

    let state = TestStateBuilder::new().build().await.expect("test state");
    let client = TestClient::new(state.clone());
    let hosted = hosted_event(&client, &state.pool, None).await;
    let link = invite_guest(&client, &hosted, "Grace").await;

    client
        .delete_with_auth(
            &format!("/events/{}/invites/{}", hosted.event_id, link.invite_id),
            &hosted.session,
        )
        .await
        .assert_status(StatusCode::NO_CONTENT);

    // A late status write never resurrects the invite
    assert!(!invite_repo::mark_responded(&state.pool, link.invite_id).await.unwrap());
    assert_eq!(db::invite_status(&state.pool, link.invite_id).await.unwrap(), "revoked");

    client
        .post_json(&link.path, &json!({ "response": "attending" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_analytics_counts_changed_reply_on_day_of_change() {
    let state = TestStateBuilder::new().build().await.expect("test state");
    let client = TestClient::new(state.clone());
    let hosted = hosted_event(&client, &state.pool, None).await;
    let link = invite_guest(&client, &hosted, "Ada").await;

    client
        .post_json(&link.path, &json!({ "response": "attending", "guest_count": 2 }))
        .await
        .assert_status(StatusCode::OK);
    db::backdate_rsvp(&state.pool, link.invite_id, 3).await.unwrap();

    client
        .post_json(&link.path, &json!({ "response": "declined" }))
        .await
        .assert_status(StatusCode::OK);

    let analytics: Value = client
        .get_with_auth(
            &format!("/events/{}/analytics?days=7", hosted.event_id),
            &hosted.session,
        )
        .await
        .json();

    // Three days ago shows nothing; today shows the current answer
    assert_eq!(analytics["daily"][3]["total"], 0);
    assert_eq!(analytics["daily"][3]["attending"], 0);
    assert_eq!(analytics["daily"][6]["declined"], 1);
    assert_eq!(analytics["totals"]["attending"], 0);
    assert_eq!(analytics["totals"]["declined"], 1);
    assert_eq!(analytics["totals"]["total"], 1);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_resend_sees_revoke_that_committed_first() {
    use evt_db::{models::InviteStatus, repositories::invite as invite_repo};

    let state = TestStateBuilder::new().build().await.expect("test state");
    let client = TestClient::new(state.clone());
    let hosted = hosted_event(&client, &state.pool, None).await;
    let link = invite_guest(&client, &hosted, "Alan").await;

    // A revoke holding the row while a resend arrives
    let mut tx = state.pool.begin().await.expect("begin");
    invite_repo::find_by_id_for_update(&mut *tx, link.invite_id)
        .await
        .expect("lock invite")
        .expect("invite exists");

    let resender = TestClient::new(state.clone());
    let resend_uri = format!("/events/{}/invites/{}/resend", hosted.event_id, link.invite_id);
    let session = hosted.session.clone();
    let resend = tokio::spawn(async move {
        resender.post_with_auth(&resend_uri, &session).await.status
    });

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert!(!resend.is_finished(), "resend must wait for the revoke's lock");

    invite_repo::set_status(&mut *tx, link.invite_id, InviteStatus::Revoked)
        .await
        .expect("revoke");
    tx.commit().await.expect("commit");

    assert_eq!(resend.await.expect("resend task"), StatusCode::CONFLICT);
    assert_eq!(db::invite_status(&state.pool, link.invite_id).await.unwrap(), "revoked");
    client.get(&link.path).await.assert_status(StatusCode::NOT_FOUND);
}
