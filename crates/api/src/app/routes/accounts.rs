use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};

use tradelink_auth::Registration;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<Registration>,
) -> axum::response::Response {
    match services.register_account(body) {
        Ok((account, token)) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "id": account.id.to_string(),
                "email": account.email,
                "token": token,
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services.login(&body.email, &body.password) {
        Ok((account, token)) => Json(serde_json::json!({
            "id": account.id.to_string(),
            "token": token,
        }))
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.delete_account(principal.user_id()) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn distributor_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::DistributorStatusRequest>,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require_distributor(&principal) {
        return resp;
    }
    match services.set_distributor_status(principal.user_id(), body.accepting_orders) {
        Ok(distributor) => Json(serde_json::json!({
            "distributor_id": distributor.id.to_string(),
            "accepting_orders": distributor.accepting_orders,
        }))
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
