use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tradelink_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::PriceInconsistency { .. } => {
            json_error(StatusCode::BAD_REQUEST, "price_inconsistency", err.to_string())
        }
        DomainError::NotOffered => {
            json_error(StatusCode::NOT_FOUND, "not_offered", err.to_string())
        }
        DomainError::NotADistributor => {
            json_error(StatusCode::FORBIDDEN, "not_a_distributor", err.to_string())
        }
        DomainError::DistributorUnavailable => {
            json_error(StatusCode::CONFLICT, "distributor_unavailable", err.to_string())
        }
        DomainError::QuantityExceeded { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "quantity_exceeded", err.to_string())
        }
        DomainError::BasketNotFound => {
            json_error(StatusCode::NOT_FOUND, "basket_not_found", err.to_string())
        }
        DomainError::DuplicateAccount => {
            json_error(StatusCode::BAD_REQUEST, "duplicate_account", err.to_string())
        }
        DomainError::PasswordMismatch => {
            json_error(StatusCode::BAD_REQUEST, "password_mismatch", err.to_string())
        }
        DomainError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthorized => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
