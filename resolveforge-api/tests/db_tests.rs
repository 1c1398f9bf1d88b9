/// End-to-end tests against PostgreSQL
///
/// Run with: cargo test -p resolveforge-api --test db_tests -- --ignored

mod common;

use axum::http::StatusCode;
use common::{cookie_header, session_cookie, TestApp};
use resolveforge_shared::models::user::{CreateUser, User};
use serde_json::json;
use uuid::Uuid;

const PASSWORD: &str = "Faulty-Kettle1";

fn unique_email() -> String {
    format!("api-{}@example.co.uk", Uuid::new_v4())
}

#[tokio::test]
#[ignore]
async fn test_signup_then_me() {
    let app = TestApp::with_database().await;
    let email = unique_email();

    let res = app
        .post_json("/api/signup", None, json!({ "email": email.to_uppercase(), "password": PASSWORD }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["email"], email);
    assert_eq!(res.body["plan"], "free");

    let cookies = res.set_cookies();
    assert_eq!(cookies.len(), 2);
    assert!(cookies[0].contains("HttpOnly"));

    let me = app.get("/api/me", Some(&cookie_header(&cookies))).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], email);
    assert!(me.body["last_login_at"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_duplicate_signup_conflicts() {
    let app = TestApp::with_database().await;
    let email = unique_email();
    let body = json!({ "email": email, "password": PASSWORD });

    assert_eq!(app.post_json("/api/signup", None, body.clone()).await.status, StatusCode::OK);

    let res = app.post_json("/api/signup", None, body).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_login_creates_then_verifies() {
    let app = TestApp::with_database().await;
    let email = unique_email();

    let first = app
        .post_json("/api/login", None, json!({ "email": email, "password": PASSWORD }))
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let again = app
        .post_json("/api/login", None, json!({ "email": email, "password": PASSWORD }))
        .await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body["user_id"], first.body["user_id"]);

    let wrong = app
        .post_json("/api/login", None, json!({ "email": email, "password": "Wrong-Password9" }))
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["message"], "Incorrect email or password.");
}

#[tokio::test]
#[ignore]
async fn test_legacy_account_claims_password_on_login() {
    let app = TestApp::with_database().await;
    let legacy = User::create(
        &app.db,
        CreateUser {
            email: unique_email(),
            password_hash: None,
            plan: None,
        },
    )
    .await
    .unwrap();

    let res = app
        .post_json("/api/login", None, json!({ "email": legacy.email, "password": PASSWORD }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user_id"], legacy.id.to_string());

    let stored = User::find_by_id(&app.db, legacy.id).await.unwrap().unwrap();
    assert!(stored.has_password());
}

#[tokio::test]
#[ignore]
async fn test_analysis_is_saved_and_scoped_to_owner() {
    let app = TestApp::with_database().await;
    let owner = User::create(
        &app.db,
        CreateUser {
            email: unique_email(),
            password_hash: None,
            plan: None,
        },
    )
    .await
    .unwrap();
    let cookie = session_cookie(owner.id, &owner.email);

    let res = app
        .post_json(
            "/api/analyse",
            Some(&cookie),
            json!({ "text": "My parcel never arrived and the courier says it was delivered." }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let claim_id = res.body["claim_id"].as_str().unwrap().to_string();

    let list = app.get("/api/claims", Some(&cookie)).await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["claims"][0]["id"], claim_id);
    assert_eq!(list.body["usage"]["used"], 1);

    let detail = app.get(&format!("/api/claims/{}", claim_id), Some(&cookie)).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["status"], "draft");

    let stranger = session_cookie(Uuid::new_v4(), "someone@example.co.uk");
    let hidden = app.get(&format!("/api/claims/{}", claim_id), Some(&stranger)).await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_quota_enforced_through_postgres() {
    let app = TestApp::with_database().await;
    let user = User::create(
        &app.db,
        CreateUser {
            email: unique_email(),
            password_hash: None,
            plan: None,
        },
    )
    .await
    .unwrap();
    let cookie = session_cookie(user.id, &user.email);

    for _ in 0..5 {
        let res = app
            .post_json("/api/analyse", Some(&cookie), json!({ "text": "Faulty washing machine" }))
            .await;
        assert_eq!(res.status, StatusCode::OK);
    }

    let res = app
        .post_json("/api/analyse", Some(&cookie), json!({ "text": "Faulty washing machine" }))
        .await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(app.analyser.calls(), 5);
}

#[tokio::test]
#[ignore]
async fn test_early_access_twice_is_friendly() {
    let app = TestApp::with_database().await;
    let body = json!({ "email": unique_email(), "source": "footer" });

    let first = app.post_json("/api/early-access", None, body.clone()).await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app.post_json("/api/early-access", None, body).await;
    assert_eq!(second.status, StatusCode::OK);
    assert!(second.body["message"].as_str().unwrap().contains("already"));
}

#[tokio::test]
#[ignore]
async fn test_contact_message_accepted() {
    let app = TestApp::with_database().await;

    let res = app
        .post_json(
            "/api/contact",
            None,
            json!({ "name": "Jo", "email": unique_email(), "message": "Do you cover Scotland?" }),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
}
