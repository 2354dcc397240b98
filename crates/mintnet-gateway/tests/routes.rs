//! HTTP-level tests of the gateway against a throwaway database.

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use mintnet_core::{Platform, StorageConfig};
use mintnet_gateway::{create_router, AppState, GatewayConfig, Language};
use serde_json::{json, Value};

const PROFILE: HeaderName = HeaderName::from_static("x-mintnet-profile");

fn server() -> TestServer {
    let platform = Platform::open(StorageConfig::temporary()).unwrap();
    let state = AppState::new(platform, GatewayConfig::default());
    TestServer::new(create_router(state)).unwrap()
}

fn as_profile(id: &str) -> HeaderValue {
    HeaderValue::from_str(id).unwrap()
}

/// Signs up a profile and returns its ID.
async fn sign_up(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/profiles")
        .json(&json!({
            "name": username,
            "fields": {
                "first_name": username,
                "last_name": "Tester",
                "email": format!("{}@example.org", username),
                "bio": "Loves physics",
            }
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let server = server();
    let body: Value = server.get("/health").await.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["recovered"], false);
}

#[tokio::test]
async fn test_profile_page_is_filtered_per_viewer() {
    let server = server();
    let ada = sign_up(&server, "ada").await;

    let anon: Value = server.get("/profiles/ada").await.json();
    assert_eq!(anon["data"]["mode"], "anon");
    assert!(anon["data"]["entity"]["email"].is_null());
    assert_eq!(anon["data"]["entity"]["bio"], "Loves physics");

    let owner: Value = server
        .get("/profiles/ada")
        .add_header(PROFILE, as_profile(&ada))
        .await
        .json();
    assert_eq!(owner["data"]["mode"], "admin");
    assert_eq!(owner["data"]["entity"]["email"], "ada@example.org");
}

#[tokio::test]
async fn test_visibility_update_requires_owner() {
    let server = server();
    let ada = sign_up(&server, "ada").await;
    let bob = sign_up(&server, "bob").await;

    let denied = server
        .put("/profiles/ada/visibility")
        .add_header(PROFILE, as_profile(&bob))
        .json(&json!({ "email": true }))
        .await;
    denied.assert_status(StatusCode::FORBIDDEN);
    let body: Value = denied.json();
    assert_eq!(body["code"], "FORBIDDEN");

    let updated = server
        .put("/profiles/ada/visibility")
        .add_header(PROFILE, as_profile(&ada))
        .json(&json!({ "email": true }))
        .await;
    updated.assert_status_ok();
    let body: Value = updated.json();
    assert_eq!(body["data"]["flags"]["email"], true);

    let anon: Value = server.get("/profiles/ada").await.json();
    assert_eq!(anon["data"]["entity"]["email"], "ada@example.org");

    let unknown = server
        .put("/profiles/ada/visibility")
        .add_header(PROFILE, as_profile(&ada))
        .json(&json!({ "username": false }))
        .await;
    unknown.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_errors_follow_accept_language() {
    let server = server();

    let german = server.get("/events/nope").await;
    german.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(german.header(header::CONTENT_LANGUAGE), "de");
    let body: Value = german.json();
    assert_eq!(body["message"], Language::De.messages().not_found);
    assert_eq!(body["code"], "NOT_FOUND");

    let english = server
        .get("/events/nope")
        .add_header(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-GB,en;q=0.9"))
        .await;
    english.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(english.header(header::CONTENT_LANGUAGE), "en");
    let body: Value = english.json();
    assert_eq!(body["message"], Language::En.messages().not_found);
}

#[tokio::test]
async fn test_malformed_profile_header() {
    let server = server();
    sign_up(&server, "ada").await;

    let response = server
        .get("/profiles/ada")
        .add_header(PROFILE, HeaderValue::from_static("not-an-id"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_gets_json_error() {
    let server = server();

    let response = server
        .post("/profiles")
        .text("{not json")
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.header(header::CONTENT_LANGUAGE), "de");
    let body: Value = response.json();
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(body["message"], Language::De.messages().bad_request);
}

#[tokio::test]
async fn test_malformed_invite_id_gets_json_error() {
    let server = server();
    let ada = sign_up(&server, "ada").await;

    let response = server
        .post("/invites/not-hex/accept")
        .add_header(PROFILE, as_profile(&ada))
        .add_header(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(body["message"], Language::En.messages().bad_request);
    assert!(body["detail"].as_str().unwrap().contains("not-hex"));
}

#[tokio::test]
async fn test_malformed_role_query_gets_json_error() {
    let server = server();
    let ada = sign_up(&server, "ada").await;

    let response = server
        .delete(&format!("/organizations/lab/members/{}", ada))
        .add_query_param("role", "owner")
        .add_header(PROFILE, as_profile(&ada))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_creating_organization_requires_sign_in() {
    let server = server();
    let response = server
        .post("/organizations")
        .json(&json!({ "name": "MINT Lab" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invite_accept_flow() {
    let server = server();
    let ada = sign_up(&server, "ada").await;
    let bob = sign_up(&server, "bob").await;

    let created = server
        .post("/organizations")
        .add_header(PROFILE, as_profile(&ada))
        .json(&json!({ "name": "MINT Lab", "fields": { "email": "lab@example.org" } }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let org: Value = created.json();
    let slug = org["data"]["slug"].as_str().unwrap().to_string();

    let invited = server
        .post(&format!("/organizations/{}/invites", slug))
        .add_header(PROFILE, as_profile(&ada))
        .json(&json!({ "profile": bob, "role": "team_member" }))
        .await;
    invited.assert_status(StatusCode::CREATED);

    let mine: Value = server
        .get("/invites")
        .add_header(PROFILE, as_profile(&bob))
        .await
        .json();
    let invites = mine["data"].as_array().unwrap();
    assert_eq!(invites.len(), 1);
    assert_eq!(invites[0]["status"], "pending");
    let invite_id = invites[0]["id"].as_str().unwrap().to_string();

    // Only the invitee can accept
    server
        .post(&format!("/invites/{}/accept", invite_id))
        .add_header(PROFILE, as_profile(&ada))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let accepted: Value = server
        .post(&format!("/invites/{}/accept", invite_id))
        .add_header(PROFILE, as_profile(&bob))
        .await
        .json();
    assert_eq!(accepted["data"]["status"], "accepted");

    let page: Value = server
        .get(&format!("/organizations/{}", slug))
        .add_header(PROFILE, as_profile(&bob))
        .await
        .json();
    assert_eq!(page["data"]["mode"], "team_member");
    assert_eq!(page["data"]["entity"]["email"], "lab@example.org");
    assert_eq!(page["data"]["members"].as_array().unwrap().len(), 2);

    let anon: Value = server.get(&format!("/organizations/{}", slug)).await.json();
    assert!(anon["data"]["entity"]["email"].is_null());
}
