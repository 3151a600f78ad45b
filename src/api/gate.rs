//! Access gate.
//!
//! Wraps every route. Resolves the caller's [`SessionContext`] once per request,
//! attaches it to the request extensions, and decides whether the request may
//! proceed, is redirected to another page, or is refused.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_sessions::Session;
use tracing::{debug, warn};

use super::observability::RequestSpan;
use super::{ApiError, AppState};
use crate::domain::SessionContext;

/// Session key holding the signed-in account id.
pub const SESSION_ACCOUNT_KEY: &str = "account_id";

pub const LOGIN_PAGE: &str = "/login";
pub const HOME_PAGE: &str = "/";

const AUTH_PAGES: [&str; 2] = ["/login", "/signup"];
const PUBLIC_API: [&str; 3] = ["/api/auth/login", "/api/auth/signup", "/api/health"];
const ADMIN_API: [&str; 2] = ["/api/admin", "/api/metrics"];
const ASSET_EXTENSIONS: [&str; 6] = ["svg", "png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Asset,
    AuthPage,
    Page { admin: bool },
    PublicApi,
    Api { admin: bool },
}

impl RouteClass {
    /// Bounded label for metrics and request spans.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::AuthPage => "auth_page",
            Self::Page { admin: false } => "page",
            Self::Page { admin: true } => "admin_page",
            Self::PublicApi => "public_api",
            Self::Api { admin: false } => "api",
            Self::Api { admin: true } => "admin_api",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(&'static str),
    Unauthorized,
    Forbidden,
}

impl GateDecision {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Redirect(_) => "redirect",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
        }
    }
}

/// True when `path` is `prefix` itself or lies below it.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn is_asset(path: &str) -> bool {
    if under(path, "/assets") || path == "/favicon.ico" {
        return true;
    }

    let last = path.rsplit('/').next().unwrap_or_default();
    last.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty()
            && ASSET_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
    })
}

#[must_use]
pub fn classify(path: &str) -> RouteClass {
    let path = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };

    if under(path, "/api") {
        if PUBLIC_API.contains(&path) {
            return RouteClass::PublicApi;
        }
        let admin = ADMIN_API.iter().any(|prefix| under(path, prefix));
        return RouteClass::Api { admin };
    }

    if is_asset(path) {
        return RouteClass::Asset;
    }

    if AUTH_PAGES.contains(&path) {
        return RouteClass::AuthPage;
    }

    RouteClass::Page {
        admin: under(path, "/admin"),
    }
}

#[must_use]
pub fn decide(route: RouteClass, ctx: Option<&SessionContext>) -> GateDecision {
    match (route, ctx) {
        (RouteClass::Asset | RouteClass::PublicApi, _) => GateDecision::Allow,

        (RouteClass::AuthPage, None) => GateDecision::Allow,
        (RouteClass::AuthPage, Some(_)) => GateDecision::Redirect(HOME_PAGE),

        (RouteClass::Page { .. }, None) => GateDecision::Redirect(LOGIN_PAGE),
        (RouteClass::Page { admin: true }, Some(ctx)) if !ctx.is_admin() => {
            GateDecision::Redirect(HOME_PAGE)
        }
        (RouteClass::Page { .. }, Some(_)) => GateDecision::Allow,

        (RouteClass::Api { .. }, None) => GateDecision::Unauthorized,
        (RouteClass::Api { admin: true }, Some(ctx)) if !ctx.is_admin() => {
            GateDecision::Forbidden
        }
        (RouteClass::Api { .. }, Some(_)) => GateDecision::Allow,
    }
}

/// Loads the context for the session subject. A subject whose profile is
/// missing or no longer approved has its session flushed.
async fn resolve_context(
    state: &AppState,
    session: &Session,
) -> Result<Option<SessionContext>, ApiError> {
    let Some(account_id) = session.get::<i32>(SESSION_ACCOUNT_KEY).await? else {
        return Ok(None);
    };

    let ctx = state
        .auth_service()
        .resolve_session(account_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to resolve session: {e}")))?;

    if ctx.is_none() {
        warn!(account_id, "Terminating session of unapproved profile");
        session.flush().await?;
    }

    Ok(ctx)
}

pub async fn access_gate(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let route = classify(request.uri().path());
    if route == RouteClass::Asset {
        return next.run(request).await;
    }

    let ctx = match resolve_context(&state, &session).await {
        Ok(ctx) => ctx,
        Err(e) => return e.into_response(),
    };

    let decision = decide(route, ctx.as_ref());

    if let Some(span) = request.extensions().get::<RequestSpan>() {
        if let Some(ctx) = &ctx {
            span.record_caller(ctx);
        }
        span.record_decision(decision);
    }

    metrics::counter!(
        "gate_decisions_total",
        "route_class" => route.label(),
        "decision" => decision.label()
    )
    .increment(1);

    if decision != GateDecision::Allow {
        debug!(path = %request.uri().path(), ?decision, "Access gate intercepted request");
    }

    match decision {
        GateDecision::Allow => {
            if let Some(ctx) = ctx {
                request.extensions_mut().insert(ctx);
            }
            next.run(request).await
        }
        GateDecision::Redirect(to) => Redirect::temporary(to).into_response(),
        GateDecision::Unauthorized => ApiError::unauthenticated().into_response(),
        GateDecision::Forbidden => ApiError::admin_only().into_response(),
    }
}
