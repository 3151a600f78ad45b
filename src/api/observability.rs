//! Request telemetry and response hardening.
//!
//! Every request runs inside one `request` span. The span travels down the
//! stack as a [`RequestSpan`] extension so the access gate and the login
//! handler can fill in who the caller is and what the gate decided, whatever
//! spans inner layers open in between.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{sync::Arc, time::Instant};
use tracing::{Instrument, Span, field, info, info_span};
use uuid::Uuid;

use super::AppState;
use super::gate::{self, GateDecision};
use crate::domain::SessionContext;

/// Handle on the span of the request being served.
#[derive(Clone, Debug)]
pub struct RequestSpan(pub Span);

impl RequestSpan {
    /// Attach the resolved caller.
    pub fn record_caller(&self, ctx: &SessionContext) {
        self.0.record("user_id", ctx.profile_id);
        self.0.record("role", ctx.role.as_str());
    }

    pub fn record_decision(&self, decision: GateDecision) {
        self.0.record("gate", decision.label());
    }
}

/// GET /metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.prometheus_handle {
        Some(handle) => handle.render().into_response(),
        None => "Metrics not enabled or failed to initialize".into_response(),
    }
}

const fn outcome(status: u16) -> &'static str {
    match status {
        500.. => "error",
        400..=499 => "client_error",
        300..=399 => "redirect",
        _ => "success",
    }
}

pub async fn logging_middleware(mut req: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let route_class = gate::classify(&path);

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %method,
        path = %path,
        route_class = route_class.label(),
        user_id = field::Empty,
        role = field::Empty,
        gate = field::Empty,
    );
    req.extensions_mut().insert(RequestSpan(span.clone()));

    async move {
        let response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        // Route class, not the raw path: paths carry ids.
        let labels = [
            ("method", method.to_string()),
            ("route_class", route_class.label().to_string()),
            ("status", status.to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(elapsed.as_secs_f64());

        let refreshed_session = response.headers().contains_key(header::SET_COOKIE);

        info!(
            event = "http_request_finished",
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            status_code = status,
            outcome = outcome(status),
            refreshed_session,
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

const SECURITY_HEADERS: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "same-origin"),
    (
        "content-security-policy",
        "default-src 'self'; img-src 'self' data:; media-src https://commondatastorage.googleapis.com; script-src 'self'; style-src 'self'; connect-src 'self'; frame-ancestors 'none'; base-uri 'self'; form-action 'self'",
    ),
];

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_buckets() {
        assert_eq!(outcome(200), "success");
        assert_eq!(outcome(307), "redirect");
        assert_eq!(outcome(403), "client_error");
        assert_eq!(outcome(503), "error");
    }
}
