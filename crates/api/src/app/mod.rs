//! HTTP application wiring (axum router + middleware layering).
//!
//! Layout:
//! - `routes/`: HTTP routes + handlers (pages, admin API, public site)
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use quill_auth::{OperatorAllowlist, SessionKeys};
use quill_infra::{SiteDirectory, TenantBinder};

use crate::middleware::{self, GateState};

pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(
    directory: Arc<dyn SiteDirectory>,
    sessions: SessionKeys,
    operators: OperatorAllowlist,
) -> Router {
    let binder = Arc::new(TenantBinder::new(directory, operators));
    let state = GateState {
        sessions: Arc::new(sessions),
        binder: binder.clone(),
    };

    // Admin pages: gate (redirects) + site binding before any handler.
    let admin_pages = Router::new()
        .route("/admin", get(routes::admin::home))
        .route("/admin/*section", get(routes::admin::section))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::bind_site,
        ));

    // The page gate wraps the login page too (signed-in users bounce to the
    // admin home from there).
    let pages = Router::new()
        .route("/login", get(routes::pages::login))
        .merge(admin_pages)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::page_gate,
        ));

    // Admin API: gate (401/403) + site binding.
    let admin_api = Router::new()
        .route("/api/admin/whoami", get(routes::api::whoami))
        .route("/api/admin/site", get(routes::api::site))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::bind_site,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::api_gate,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/", get(routes::public::home))
        .merge(pages)
        .merge(admin_api)
        .layer(Extension(binder))
        .layer(ServiceBuilder::new())
}
