//! Admin page routes.
//!
//! These are the page-gate call sites: the gate and the site binder have
//! already run by the time a handler executes, so each handler can assume
//! both contexts are present. The actual dashboard UI is rendered
//! client-side; the handlers expose the shell data.

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};

use crate::context::{IdentityContext, SiteContext};

/// GET /admin - dashboard shell for the bound site.
pub async fn home(
    Extension(site): Extension<SiteContext>,
    Extension(identity): Extension<IdentityContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "page": "dashboard",
        "site_id": site.site_id().to_string(),
        "email": identity.email(),
    }))
}

/// GET /admin/*section - section shell (posts, leads, settings, ...).
pub async fn section(
    Path(section): Path<String>,
    Extension(site): Extension<SiteContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "page": section,
        "site_id": site.site_id().to_string(),
    }))
}
