//! Shared harness for integration tests.
//!
//! Every app gets its own temporary SQLite file and in-memory session store,
//! so tests never share state.

#![allow(dead_code)]

use aitmus::api::AppState;
use aitmus::config::Config;
use aitmus::db::NewFacility;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

pub const PASSWORD: &str = "hunter22";
pub const ADMIN_EMAIL: &str = "root@example.com";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    /// `name=value` part of the session cookie, if the response set one.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter(|v| !v.contains("Max-Age=0"))
            .find_map(|v| v.split(';').next().map(str::to_string))
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db_path =
            std::env::temp_dir().join(format!("aitmus-test-{}.db", uuid::Uuid::new_v4()));

        let mut config = Config::default();
        config.general.database_path = format!("sqlite:{}", db_path.display());
        config.server.secure_cookies = false;
        config.observability.metrics_enabled = false;
        config.security.argon2_memory_cost_kib = 1024;
        config.security.argon2_time_cost = 1;

        let state = aitmus::api::create_app_state_from_config(config, None)
            .await
            .expect("failed to create app state");
        let router = aitmus::api::router(state.clone()).await;

        Self { state, router }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sends a GET and returns the response without reading the body, for
    /// endpoints that stream.
    pub async fn open_stream(&self, uri: &str, cookie: &str) -> axum::response::Response {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, cookie, None).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, cookie, Some(body)).await
    }

    pub async fn signup(&self, email: &str) -> i32 {
        let res = self
            .post(
                "/api/auth/signup",
                None,
                json!({ "email": email, "password": PASSWORD, "password_confirm": PASSWORD }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "signup failed: {:?}", res.body);
        i32::try_from(res.json()["data"]["id"].as_i64().unwrap()).unwrap()
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/api/auth/login",
            None,
            json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Logs in and returns the session cookie, panicking on failure.
    pub async fn login_cookie(&self, email: &str) -> String {
        let res = self.login(email, PASSWORD).await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {:?}", res.body);
        res.session_cookie().expect("login did not set a session cookie")
    }

    pub async fn admin_cookie(&self) -> String {
        self.state
            .shared
            .auth_service
            .create_super_admin(ADMIN_EMAIL, Some(PASSWORD))
            .await
            .expect("failed to create super admin");
        self.login_cookie(ADMIN_EMAIL).await
    }

    pub async fn add_facility(&self, name: &str) -> i32 {
        self.state
            .shared
            .facility_service
            .add(NewFacility {
                name: name.to_string(),
                address: format!("{name} industrial park"),
                lat: 37.5,
                lng: 127.0,
            })
            .await
            .expect("failed to add facility")
            .id
    }

    /// Signs up, gets approved for `facility_id`, and logs in.
    pub async fn operator_cookie(&self, email: &str, facility_id: i32) -> String {
        let id = self.signup(email).await;
        self.state
            .shared
            .approval_service
            .approve(id, Some(facility_id))
            .await
            .expect("failed to approve operator");
        self.login_cookie(email).await
    }
}
