//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and validation into domain types
//! - `errors.rs`: error envelope responses
//! - `constants.rs`: envelope status codes and messages

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use microbank_accounts::AccountService;

use crate::config::{AppConfig, ContactInfo};

pub mod constants;
pub mod dto;
pub mod errors;
pub mod routes;

/// Read-only values fixed at startup and served by the metadata endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub build_version: String,
    pub runtime_home: Option<String>,
    pub contact: ContactInfo,
}

impl From<&AppConfig> for ServiceInfo {
    fn from(config: &AppConfig) -> Self {
        Self {
            build_version: config.build.version.clone(),
            runtime_home: config.runtime_home.clone(),
            contact: config.contact.clone(),
        }
    }
}

/// Everything handlers need, shared behind one `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub accounts: Arc<dyn AccountService>,
    pub info: ServiceInfo,
}

impl AppServices {
    pub fn new(accounts: Arc<dyn AccountService>, config: &AppConfig) -> Self {
        Self {
            accounts,
            info: ServiceInfo::from(config),
        }
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: AppServices, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", routes::router())
        .layer(Extension(Arc::new(services)))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::GATEWAY_TIMEOUT,
                    request_timeout,
                )),
        )
}
