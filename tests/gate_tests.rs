//! Access gate behavior over the full router.

mod common;

use aitmus::domain::{ApprovalStatus, Role};
use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn anonymous_pages_redirect_to_login() {
    let app = TestApp::spawn().await;

    for path in ["/", "/logs", "/settings", "/admin/users", "/admin/simulator", "/unknown"] {
        let res = app.get(path, None).await;
        assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT, "path {path}");
        assert_eq!(res.location(), Some("/login"), "path {path}");
    }
}

#[tokio::test]
async fn anonymous_can_reach_auth_pages_and_assets() {
    let app = TestApp::spawn().await;

    for path in ["/login", "/signup", "/assets/app.js", "/favicon.svg"] {
        let res = app.get(path, None).await;
        assert_eq!(res.status, StatusCode::OK, "path {path}");
    }

    let res = app.get("/login", None).await;
    let html = String::from_utf8_lossy(&res.body);
    assert!(html.contains("/assets/app.js"));
}

#[tokio::test]
async fn anonymous_api_is_unauthorized_except_public_routes() {
    let app = TestApp::spawn().await;

    for path in [
        "/api/auth/me",
        "/api/facilities",
        "/api/logs",
        "/api/dashboard",
        "/api/admin/users/pending",
        "/api/metrics",
    ] {
        let res = app.get(path, None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "path {path}");
        assert_eq!(res.json()["success"], false);
    }

    let res = app.get("/api/health", None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["data"]["database"], true);
}

#[tokio::test]
async fn signed_in_user_is_sent_home_from_auth_pages() {
    let app = TestApp::spawn().await;
    let facility = app.add_facility("Plant A").await;
    let cookie = app.operator_cookie("ops@example.com", facility).await;

    for path in ["/login", "/signup"] {
        let res = app.get(path, Some(&cookie)).await;
        assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT, "path {path}");
        assert_eq!(res.location(), Some("/"));
    }

    let res = app.get("/logs", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn non_admin_is_kept_out_of_admin_routes() {
    let app = TestApp::spawn().await;
    let facility = app.add_facility("Plant A").await;
    let cookie = app.operator_cookie("ops@example.com", facility).await;

    let res = app.get("/admin/users", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.location(), Some("/"));

    let res = app.get("/api/admin/users/pending", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.get("/api/metrics", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .post(
            &format!("/api/admin/facilities/{facility}/status"),
            Some(&cookie),
            serde_json::json!({ "status": "DANGER" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let facility_row = app.state.facility_service().get(facility).await.unwrap();
    assert_eq!(facility_row.status, aitmus::domain::FacilityStatus::Normal);
}

#[tokio::test]
async fn super_admin_reaches_admin_routes() {
    let app = TestApp::spawn().await;
    let cookie = app.admin_cookie().await;

    let res = app.get("/admin/users", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get("/api/admin/users/pending", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.json()["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn session_is_terminated_once_profile_is_no_longer_approved() {
    let app = TestApp::spawn().await;
    let facility = app.add_facility("Plant A").await;
    let cookie = app.operator_cookie("ops@example.com", facility).await;

    let res = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::OK);
    let profile_id = i32::try_from(res.json()["data"]["id"].as_i64().unwrap()).unwrap();

    app.state
        .store()
        .set_profile_access(profile_id, Role::FacilityAdmin, ApprovalStatus::Rejected)
        .await
        .unwrap();

    let res = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    // Restoring approval does not revive the flushed session.
    app.state
        .store()
        .set_profile_access(profile_id, Role::FacilityAdmin, ApprovalStatus::Approved)
        .await
        .unwrap();

    let res = app.get("/", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.location(), Some("/login"));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = TestApp::spawn().await;
    let facility = app.add_facility("Plant A").await;
    let cookie = app.operator_cookie("ops@example.com", facility).await;

    let res = app
        .post("/api/auth/logout", Some(&cookie), serde_json::json!({}))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_api_route_is_json_not_found() {
    let app = TestApp::spawn().await;
    let cookie = app.admin_cookie().await;

    let res = app.get("/api/nothing-here", Some(&cookie)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["success"], false);
}

#[tokio::test]
async fn active_session_cookie_is_refreshed_on_each_response() {
    let app = TestApp::spawn().await;
    let facility = app.add_facility("Plant A").await;
    let cookie = app.operator_cookie("ops@example.com", facility).await;

    for path in ["/api/facilities", "/logs"] {
        let res = app.get(path, Some(&cookie)).await;
        assert_eq!(res.status, StatusCode::OK, "path {path}");
        assert_eq!(res.session_cookie().as_deref(), Some(cookie.as_str()), "path {path}");

        let set_cookie = res
            .headers
            .get(axum::http::header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(set_cookie.contains("Max-Age=3600"), "cookie {set_cookie}");
    }
}

#[tokio::test]
async fn anonymous_requests_get_no_session_cookie() {
    let app = TestApp::spawn().await;

    let res = app.get("/login", None).await;
    assert!(res.session_cookie().is_none());
}

#[tokio::test]
async fn login_rotates_the_session_id() {
    let app = TestApp::spawn().await;
    let facility = app.add_facility("Plant A").await;
    let before = app.operator_cookie("ops@example.com", facility).await;

    let res = app
        .post(
            "/api/auth/login",
            Some(&before),
            serde_json::json!({ "email": "ops@example.com", "password": common::PASSWORD }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let after = res.session_cookie().unwrap();
    assert_ne!(before, after);

    assert_eq!(app.get("/api/auth/me", Some(&after)).await.status, StatusCode::OK);
    assert_eq!(
        app.get("/api/auth/me", Some(&before)).await.status,
        StatusCode::UNAUTHORIZED
    );
}
