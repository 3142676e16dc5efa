mod common;
mod http_helpers;

use axum::http::StatusCode;
use common::{bearer_for, read_json, test_state};
use http_helpers::{authed_json_request, authed_request};
use serde_json::json;
use taine_api::app::build_router;
use tower::ServiceExt;
use uuid::Uuid;

#[tokio::test]
async fn owners_can_create_read_update_and_delete() {
    let (state, _) = test_state();
    let app = build_router(state);
    let token = bearer_for("user_1");

    let create = authed_json_request(
        "POST",
        "/api/v1/tweets",
        &token,
        json!({ "content": "first post" }),
    );
    let response = app.clone().oneshot(create).await.expect("create");
    assert_eq!(response.status(), StatusCode::CREATED);
    let tweet = read_json(response).await;
    let id = tweet["id"].as_str().expect("id").to_string();
    assert_eq!(tweet["content"], "first post");

    let get = authed_request("GET", &format!("/api/v1/tweets/{id}"), &token);
    let response = app.clone().oneshot(get).await.expect("get");
    assert_eq!(response.status(), StatusCode::OK);

    let update = authed_json_request(
        "PUT",
        &format!("/api/v1/tweets/{id}"),
        &token,
        json!({ "content": "edited" }),
    );
    let response = app.clone().oneshot(update).await.expect("update");
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;
    assert_eq!(updated["content"], "edited");

    let delete = authed_request("DELETE", &format!("/api/v1/tweets/{id}"), &token);
    let response = app.clone().oneshot(delete).await.expect("delete");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let get = authed_request("GET", &format!("/api/v1/tweets/{id}"), &token);
    let response = app.oneshot(get).await.expect("get");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_content_is_rejected() {
    let (state, _) = test_state();
    let app = build_router(state);

    let create = authed_json_request(
        "POST",
        "/api/v1/tweets",
        &bearer_for("user_1"),
        json!({ "content": "  " }),
    );
    let response = app.oneshot(create).await.expect("create");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_owners_see_the_same_404_as_a_missing_tweet() {
    let (state, _) = test_state();
    let app = build_router(state);
    let owner = bearer_for("user_owner");
    let stranger = bearer_for("user_stranger");

    let create = authed_json_request(
        "POST",
        "/api/v1/tweets",
        &owner,
        json!({ "content": "mine" }),
    );
    let response = app.clone().oneshot(create).await.expect("create");
    let tweet = read_json(response).await;
    let id = tweet["id"].as_str().expect("id").to_string();

    let foreign_update = authed_json_request(
        "PUT",
        &format!("/api/v1/tweets/{id}"),
        &stranger,
        json!({ "content": "hijacked" }),
    );
    let response = app.clone().oneshot(foreign_update).await.expect("update");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let foreign_body = read_json(response).await;

    let missing_update = authed_json_request(
        "PUT",
        &format!("/api/v1/tweets/{}", Uuid::new_v4()),
        &stranger,
        json!({ "content": "nothing" }),
    );
    let response = app.clone().oneshot(missing_update).await.expect("update");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let missing_body = read_json(response).await;

    // Ownership mismatches must be indistinguishable from absent rows.
    assert_eq!(foreign_body["code"], missing_body["code"]);
    assert_eq!(foreign_body["message"], missing_body["message"]);

    let foreign_delete = authed_request("DELETE", &format!("/api/v1/tweets/{id}"), &stranger);
    let response = app.clone().oneshot(foreign_delete).await.expect("delete");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Still intact for the owner.
    let get = authed_request("GET", &format!("/api/v1/tweets/{id}"), &owner);
    let response = app.oneshot(get).await.expect("get");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["content"], "mine");
}

#[tokio::test]
async fn my_listing_is_scoped_to_the_caller() {
    let (state, _) = test_state();
    let app = build_router(state);
    let alice = bearer_for("user_alice");
    let bob = bearer_for("user_bob");

    for (token, content) in [(&alice, "from alice"), (&bob, "from bob")] {
        let create =
            authed_json_request("POST", "/api/v1/tweets", token, json!({ "content": content }));
        let response = app.clone().oneshot(create).await.expect("create");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let mine = authed_request("GET", "/api/v1/tweets/my", &alice);
    let response = app.clone().oneshot(mine).await.expect("my");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    let items = payload["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["content"], "from alice");

    let all = authed_request("GET", "/api/v1/tweets", &alice);
    let response = app.oneshot(all).await.expect("all");
    let payload = read_json(response).await;
    assert_eq!(payload["items"].as_array().expect("items").len(), 2);
}
