//! Customer/account CRUD handlers.
//!
//! Each handler validates its input before touching the account service, so a
//! rejected request never reaches it. Service calls run on the blocking pool;
//! the handler future stays cancellable by the request timeout.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, OriginalUri, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use microbank_accounts::AccountService;
use microbank_core::DomainResult;

use crate::app::constants::{
    MESSAGE_200, MESSAGE_201, MESSAGE_417_DELETE, MESSAGE_417_UPDATE, STATUS_200, STATUS_201,
    STATUS_417,
};
use crate::app::dto::{self, CustomerDto, ResponseDto};
use crate::app::errors::{ApiError, ApiFailure};
use crate::app::AppServices;

fn read_body(path: &str, payload: Result<Json<CustomerDto>, JsonRejection>) -> Result<CustomerDto, ApiFailure> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiFailure::new(path, ApiError::MalformedBody(e.body_text())))
}

async fn call_service<T, F>(services: &Arc<AppServices>, path: &str, op: F) -> Result<T, ApiFailure>
where
    T: Send + 'static,
    F: FnOnce(&dyn AccountService) -> DomainResult<T> + Send + 'static,
{
    let services = Arc::clone(services);
    tokio::task::spawn_blocking(move || op(services.accounts.as_ref()))
        .await
        .map_err(|e| ApiFailure::new(path, ApiError::Unexpected(format!("account service task failed: {e}"))))?
        .map_err(|e| ApiFailure::new(path, e))
}

/// Outcome of update/delete: found-and-changed vs. nothing to change.
fn mutation_response(changed: bool, failure_message: &str) -> Response {
    if changed {
        (StatusCode::OK, Json(ResponseDto::new(STATUS_200, MESSAGE_200))).into_response()
    } else {
        (
            StatusCode::EXPECTATION_FAILED,
            Json(ResponseDto::new(STATUS_417, failure_message)),
        )
            .into_response()
    }
}

/// `POST /api/create`
pub async fn create_account(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<CustomerDto>, JsonRejection>,
) -> Result<Response, ApiFailure> {
    let path = uri.path();
    let customer = read_body(path, payload)?
        .into_new_customer()
        .map_err(|errors| ApiFailure::new(path, ApiError::Validation(errors)))?;

    let created = call_service(&services, path, move |accounts| accounts.create_account(customer)).await?;

    tracing::info!(
        account_number = ?created.account.as_ref().map(|a| a.account_number.get()),
        "account created"
    );
    Ok((StatusCode::CREATED, Json(ResponseDto::new(STATUS_201, MESSAGE_201))).into_response())
}

/// `GET /api/fetch/:mobile_number`
pub async fn fetch_account_details(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    Path(mobile_number): Path<String>,
) -> Result<Json<CustomerDto>, ApiFailure> {
    let path = uri.path();
    let mobile_number = dto::parse_mobile_number(&mobile_number)
        .map_err(|errors| ApiFailure::new(path, ApiError::Validation(errors)))?;

    let details = call_service(&services, path, move |accounts| accounts.fetch_account(&mobile_number)).await?;
    Ok(Json(CustomerDto::from(details)))
}

/// `PUT /api/update`
pub async fn update_account_details(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<CustomerDto>, JsonRejection>,
) -> Result<Response, ApiFailure> {
    let path = uri.path();
    let details = read_body(path, payload)?
        .into_details()
        .map_err(|errors| ApiFailure::new(path, ApiError::Validation(errors)))?;

    let updated = call_service(&services, path, move |accounts| accounts.update_account(details)).await?;

    if !updated {
        tracing::warn!("update did not resolve to an existing account");
    }
    Ok(mutation_response(updated, MESSAGE_417_UPDATE))
}

/// `DELETE /api/delete/:mobile_number`
pub async fn delete_account_details(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    Path(mobile_number): Path<String>,
) -> Result<Response, ApiFailure> {
    let path = uri.path();
    let mobile_number = dto::parse_mobile_number(&mobile_number)
        .map_err(|errors| ApiFailure::new(path, ApiError::Validation(errors)))?;

    let target = mobile_number.clone();
    let deleted = call_service(&services, path, move |accounts| accounts.delete_account(&target)).await?;

    if !deleted {
        tracing::warn!(mobile_number = %mobile_number, "delete did not resolve to an existing customer");
    }
    Ok(mutation_response(deleted, MESSAGE_417_DELETE))
}
