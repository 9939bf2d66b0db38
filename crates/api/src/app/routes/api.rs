//! Admin API routes (the API-gate call sites).

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use quill_infra::TenantBinder;

use crate::app::errors;
use crate::context::{IdentityContext, SiteContext};

/// GET /api/admin/whoami - the authenticated identity and its site binding.
pub async fn whoami(
    Extension(identity): Extension<IdentityContext>,
    Extension(site): Extension<SiteContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": identity.user_id().to_string(),
        "email": identity.email(),
        "role": identity.role().as_str(),
        "site_id": site.site_id().to_string(),
    }))
}

/// GET /api/admin/site - the full record of the bound site.
pub async fn site(
    Extension(site): Extension<SiteContext>,
    Extension(binder): Extension<Arc<TenantBinder>>,
) -> axum::response::Response {
    match binder.site(site.site_id()).await {
        Ok(Some(site)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": site.id.to_string(),
                "name": site.name,
                "domain": site.domain,
                "subdomain": site.subdomain,
                "created_at": site.created_at.to_rfc3339(),
            })),
        )
            .into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "site not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
