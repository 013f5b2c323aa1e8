use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub mod accounts;
pub mod system;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .route("/create", post(accounts::create_account))
        .route("/fetch/:mobile_number", get(accounts::fetch_account_details))
        .route("/update", put(accounts::update_account_details))
        .route("/delete/:mobile_number", delete(accounts::delete_account_details))
        .route("/version", get(system::build_info))
        .route("/java-version", get(system::runtime_home))
        .route("/getcontactinfo", get(system::contact_info))
}
