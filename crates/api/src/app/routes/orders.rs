use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use tradelink_core::{BasketId, OrderId};
use tradelink_infra::order_lifecycle::AddressInput;
use tradelink_orders::OrderStatus;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn confirm(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ConfirmOrderRequest>,
) -> axum::response::Response {
    let basket_id: BasketId = match body.basket_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid basket id");
        }
    };
    let address = AddressInput {
        city: body.address.city,
        street: body.address.street,
        building: body.address.building,
        office: body.address.office,
    };
    match services.orders.confirm(basket_id, body.customer, address) {
        Ok(order) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "id": order.id.to_string(),
                "status": order.status.as_str(),
                "created_at": order.created_at.to_rfc3339(),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn change_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::ChangeStatusRequest>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id");
        }
    };
    let status: OrderStatus = match body.status.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.orders.change_status(order_id, status) {
        Ok(order) => Json(serde_json::json!({
            "id": order.id.to_string(),
            "status": order.status.as_str(),
        }))
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id");
        }
    };
    match services.orders.get(order_id) {
        Ok(view) => Json(dto::order_view_to_json(&view)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.orders.list() {
        Ok(views) => {
            let items = views.iter().map(dto::order_view_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_history(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let items = services
        .orders
        .history()
        .iter()
        .map(dto::history_to_json)
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}
