//! Gate and site-binding middleware.
//!
//! Layer order per request: gate first (page- or API-facing), then the site
//! binder for admin-area routes. The gate never touches the directory; the
//! binder only runs once the gate has passed.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;

use quill_auth::{api_decision, page_decision, ApiDecision, Identity, PageDecision, SessionKeys};
use quill_infra::TenantBinder;

use crate::app::errors;
use crate::context::{IdentityContext, SiteContext};

#[derive(Clone)]
pub struct GateState {
    pub sessions: Arc<SessionKeys>,
    pub binder: Arc<TenantBinder>,
}

/// Page-facing gate: redirect semantics.
pub async fn page_gate(State(state): State<GateState>, mut req: Request, next: Next) -> Response {
    let identity = current_identity(&state, req.headers());

    match page_decision(req.uri().path(), identity.as_ref(), state.binder.operators()) {
        PageDecision::Pass => {
            if let Some(identity) = identity {
                req.extensions_mut().insert(IdentityContext::new(identity));
            }
            next.run(req).await
        }
        PageDecision::Redirect(target) => Redirect::to(target).into_response(),
    }
}

/// API-facing gate: explicit 401/403 semantics.
pub async fn api_gate(State(state): State<GateState>, mut req: Request, next: Next) -> Response {
    let identity = current_identity(&state, req.headers());

    match api_decision(identity.as_ref(), state.binder.operators()) {
        ApiDecision::Pass => {
            if let Some(identity) = identity {
                req.extensions_mut().insert(IdentityContext::new(identity));
            }
            next.run(req).await
        }
        ApiDecision::Unauthorized => errors::json_error(
            axum::http::StatusCode::UNAUTHORIZED,
            "unauthorized",
            "authentication required",
        ),
        ApiDecision::Forbidden => errors::json_error(
            axum::http::StatusCode::FORBIDDEN,
            "forbidden",
            "admin access required",
        ),
    }
}

/// Site-binding layer for admin-area routes.
///
/// Requires an `IdentityContext` (the gate runs first); resolves the site
/// the identity is scoped to and injects `SiteContext`.
pub async fn bind_site(State(state): State<GateState>, mut req: Request, next: Next) -> Response {
    let Some(identity) = req.extensions().get::<IdentityContext>().cloned() else {
        return errors::json_error(
            axum::http::StatusCode::UNAUTHORIZED,
            "unauthorized",
            "authentication required",
        );
    };

    match state.binder.resolve_site(identity.identity()).await {
        Ok(Some(site_id)) => {
            req.extensions_mut().insert(SiteContext::new(site_id));
            next.run(req).await
        }
        Ok(None) => errors::json_error(
            axum::http::StatusCode::NOT_FOUND,
            "no_site_binding",
            "no site is bound to this account",
        ),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn current_identity(state: &GateState, headers: &HeaderMap) -> Option<Identity> {
    let cookie = headers.get(header::COOKIE)?.to_str().ok()?;
    state.sessions.resolve(Some(cookie), Utc::now())
}
