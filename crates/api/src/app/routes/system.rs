use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, Json};

use crate::app::AppServices;
use crate::config::ContactInfo;

/// `GET /health`: liveness, empty body.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// `GET /api/version`: plain-text build version.
pub async fn build_info(Extension(services): Extension<Arc<AppServices>>) -> (StatusCode, String) {
    (StatusCode::OK, services.info.build_version.clone())
}

/// `GET /api/java-version`: plain-text runtime home captured at startup (empty if unset).
pub async fn runtime_home(Extension(services): Extension<Arc<AppServices>>) -> (StatusCode, String) {
    (StatusCode::OK, services.info.runtime_home.clone().unwrap_or_default())
}

/// `GET /api/getcontactinfo`: contact record loaded at startup.
pub async fn contact_info(Extension(services): Extension<Arc<AppServices>>) -> (StatusCode, Json<ContactInfo>) {
    (StatusCode::OK, Json(services.info.contact.clone()))
}
