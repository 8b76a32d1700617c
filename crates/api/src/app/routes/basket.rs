use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use tradelink_core::{BasketId, DistributorId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn add_line(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AddToBasketRequest>,
) -> axum::response::Response {
    let distributor_id: DistributorId = match body.distributor_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid distributor id",
            );
        }
    };
    match services
        .baskets
        .add_to_basket(&body.product, distributor_id, body.quantity)
    {
        Ok(basket) => {
            (StatusCode::CREATED, Json(dto::basket_to_json(&basket))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_lines(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let items = services
        .baskets
        .list()
        .iter()
        .map(dto::basket_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_line(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let basket_id: BasketId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid basket id");
        }
    };
    match services.baskets.get(basket_id) {
        Ok(basket) => Json(dto::basket_to_json(&basket)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_line(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateBasketRequest>,
) -> axum::response::Response {
    let basket_id: BasketId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid basket id");
        }
    };
    let distributor_id = match body.distributor_id.as_deref().map(str::parse) {
        None => None,
        Some(Ok(v)) => Some(v),
        Some(Err(_)) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid distributor id",
            );
        }
    };
    match services
        .baskets
        .update_basket(basket_id, body.quantity, distributor_id)
    {
        Ok(basket) => Json(dto::basket_to_json(&basket)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn remove_line(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let basket_id: BasketId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid basket id");
        }
    };
    match services.baskets.remove(basket_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
