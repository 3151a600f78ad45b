//! Sign-up, gatekept login and the approval workflow.

mod common;

use aitmus::domain::events::ChangeEvent;
use axum::http::StatusCode;
use common::{PASSWORD, TestApp};
use serde_json::json;

#[tokio::test]
async fn signup_creates_pending_guest_without_session() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            "/api/auth/signup",
            None,
            json!({ "email": "New@Example.com", "password": PASSWORD, "password_confirm": PASSWORD }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert!(res.session_cookie().is_none());

    let body = res.json();
    assert_eq!(body["data"]["email"], "new@example.com");
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["role"], "guest");
    assert!(body["data"]["facility_id"].is_null());
}

#[tokio::test]
async fn signup_rejects_bad_input() {
    let app = TestApp::spawn().await;

    let cases = [
        json!({ "email": "not-an-email", "password": PASSWORD, "password_confirm": PASSWORD }),
        json!({ "email": "a@example.com", "password": PASSWORD, "password_confirm": "different" }),
        json!({ "email": "a@example.com", "password": "short", "password_confirm": "short" }),
    ];
    for body in cases {
        let res = app.post("/api/auth/signup", None, body.clone()).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "body {body}");
    }

    app.signup("taken@example.com").await;
    let res = app
        .post(
            "/api/auth/signup",
            None,
            json!({ "email": "TAKEN@example.com", "password": PASSWORD, "password_confirm": PASSWORD }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn bad_credentials_do_not_reveal_account_existence() {
    let app = TestApp::spawn().await;
    app.signup("known@example.com").await;

    let wrong_password = app.login("known@example.com", "wrong-password").await;
    let unknown_email = app.login("nobody@example.com", PASSWORD).await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.json()["error"], unknown_email.json()["error"]);
    assert_eq!(wrong_password.json()["error"], "Invalid email or password");
}

#[tokio::test]
async fn pending_login_is_refused_without_session() {
    let app = TestApp::spawn().await;
    app.signup("wait@example.com").await;

    let res = app.login("wait@example.com", PASSWORD).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let body = res.json();
    assert_eq!(body["status"], "pending");
    assert!(body["error"].as_str().unwrap().contains("awaiting administrator approval"));

    // Whatever cookie came back must not authenticate.
    let cookie = res.session_cookie().unwrap_or_else(|| "id=none".to_string());
    let me = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn approve_requires_facility_and_mutates_nothing_without_one() {
    let app = TestApp::spawn().await;
    let admin = app.admin_cookie().await;
    let id = app.signup("wait@example.com").await;

    let res = app
        .post(&format!("/api/admin/users/{id}/approve"), Some(&admin), json!({}))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let profile = app.state.store().get_profile(id).await.unwrap().unwrap();
    assert_eq!(profile.status, aitmus::domain::ApprovalStatus::Pending);
    assert_eq!(profile.role, aitmus::domain::Role::Guest);
    assert_eq!(profile.facility_id, None);

    let pending = app.get("/api/admin/users/pending", Some(&admin)).await.json();
    assert_eq!(pending["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn approve_assigns_facility_and_unlocks_login() {
    let app = TestApp::spawn().await;
    let admin = app.admin_cookie().await;
    let _other = app.add_facility("Plant A").await;
    let facility = app.add_facility("Plant B").await;
    let id = app.signup("ops@example.com").await;

    let options = app.get("/api/admin/facilities", Some(&admin)).await.json();
    let names: Vec<&str> = options["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Plant A", "Plant B"]);

    let res = app
        .post(
            &format!("/api/admin/users/{id}/approve"),
            Some(&admin),
            json!({ "facility_id": facility }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["data"]["status"], "approved");
    assert_eq!(body["data"]["role"], "facility_admin");
    assert_eq!(body["data"]["facility_id"], facility);

    let pending = app.get("/api/admin/users/pending", Some(&admin)).await.json();
    assert!(pending["data"].as_array().unwrap().is_empty());

    let cookie = app.login_cookie("ops@example.com").await;
    let me = app.get("/api/auth/me", Some(&cookie)).await.json();
    assert_eq!(me["data"]["facility_id"], facility);
}

#[tokio::test]
async fn approve_with_unknown_facility_is_not_found() {
    let app = TestApp::spawn().await;
    let admin = app.admin_cookie().await;
    let id = app.signup("ops@example.com").await;

    let res = app
        .post(
            &format!("/api/admin/users/{id}/approve"),
            Some(&admin),
            json!({ "facility_id": 999 }),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let profile = app.state.store().get_profile(id).await.unwrap().unwrap();
    assert_eq!(profile.status, aitmus::domain::ApprovalStatus::Pending);
}

#[tokio::test]
async fn reject_clears_facility_and_keeps_role() {
    let app = TestApp::spawn().await;
    let admin = app.admin_cookie().await;
    let id = app.signup("nope@example.com").await;

    let res = app
        .post(&format!("/api/admin/users/{id}/reject"), Some(&admin), json!({}))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["data"]["status"], "rejected");
    assert_eq!(body["data"]["role"], "guest");
    assert!(body["data"]["facility_id"].is_null());

    let res = app.login("nope@example.com", PASSWORD).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let body = res.json();
    assert_eq!(body["status"], "rejected");
    assert!(body["error"].as_str().unwrap().contains("contact an administrator"));
}

#[tokio::test]
async fn resolved_profiles_cannot_be_resolved_again() {
    let app = TestApp::spawn().await;
    let admin = app.admin_cookie().await;
    let facility = app.add_facility("Plant A").await;
    let id = app.signup("ops@example.com").await;

    let res = app
        .post(&format!("/api/admin/users/{id}/reject"), Some(&admin), json!({}))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app
        .post(
            &format!("/api/admin/users/{id}/approve"),
            Some(&admin),
            json!({ "facility_id": facility }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let profile = app.state.store().get_profile(id).await.unwrap().unwrap();
    assert_eq!(profile.status, aitmus::domain::ApprovalStatus::Rejected);

    let res = app
        .post("/api/admin/users/4242/reject", Some(&admin), json!({}))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn existing_account_can_be_promoted_to_super_admin() {
    let app = TestApp::spawn().await;
    app.signup("boss@example.com").await;

    let profile = app
        .state
        .auth_service()
        .create_super_admin("boss@example.com", None)
        .await
        .unwrap();
    assert_eq!(profile.role, aitmus::domain::Role::SuperAdmin);
    assert_eq!(profile.status, aitmus::domain::ApprovalStatus::Approved);

    let cookie = app.login_cookie("boss@example.com").await;
    let res = app.get("/admin/simulator", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn promotion_keeps_the_existing_password() {
    let app = TestApp::spawn().await;
    app.signup("boss@example.com").await;

    app.state
        .auth_service()
        .create_super_admin("boss@example.com", Some("ignored-secret"))
        .await
        .unwrap();

    assert_eq!(
        app.login("boss@example.com", "ignored-secret").await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(app.login("boss@example.com", PASSWORD).await.status, StatusCode::OK);
}

#[tokio::test]
async fn new_super_admin_requires_a_password() {
    let app = TestApp::spawn().await;

    let result = app
        .state
        .auth_service()
        .create_super_admin("fresh@example.com", None)
        .await;
    assert!(matches!(
        result,
        Err(aitmus::services::AuthError::Validation(_))
    ));
    assert!(
        app.state
            .store()
            .find_account_by_email("fresh@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn concurrent_duplicate_signups_conflict_instead_of_failing() {
    let app = TestApp::spawn().await;

    for round in 0..5 {
        let body = |email: String| {
            json!({ "email": email, "password": PASSWORD, "password_confirm": PASSWORD })
        };
        let (first, second) = tokio::join!(
            app.post("/api/auth/signup", None, body(format!("dup{round}@example.com"))),
            app.post("/api/auth/signup", None, body(format!("DUP{round}@example.com"))),
        );

        let mut codes = [first.status.as_u16(), second.status.as_u16()];
        codes.sort_unstable();
        assert_eq!(codes, [201, 409], "round {round}");
    }
}

#[tokio::test]
async fn signup_and_resolution_publish_profile_changes() {
    let app = TestApp::spawn().await;
    let admin = app.admin_cookie().await;
    let facility = app.add_facility("Plant A").await;
    let mut rx = app.state.event_bus().subscribe();

    let id = app.signup("ops@example.com").await;
    assert_eq!(rx.try_recv().unwrap(), ChangeEvent::ProfileCreated { profile_id: id });

    let res = app
        .post(
            &format!("/api/admin/users/{id}/approve"),
            Some(&admin),
            json!({ "facility_id": facility }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(rx.try_recv().unwrap(), ChangeEvent::ProfileUpdated { profile_id: id });

    // A refused approval publishes nothing.
    let res = app
        .post(
            &format!("/api/admin/users/{id}/approve"),
            Some(&admin),
            json!({ "facility_id": facility }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert!(rx.try_recv().is_err());
}
