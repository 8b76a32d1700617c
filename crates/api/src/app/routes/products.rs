use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use tradelink_catalog::Product;
use tradelink_core::ProductId;
use tradelink_infra::entity_store::EntityStore;

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let items = services
        .store
        .products()
        .into_iter()
        .map(|p| product_to_json(&services, &p))
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };
    match services.store.product(product_id) {
        Some(product) => {
            (StatusCode::OK, Json(product_to_json(&services, &product))).into_response()
        }
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
    }
}

/// Product with its per-distributor offers and submitted parameters, plus
/// the flattened union of all parameters de-duplicated by name.
fn product_to_json(services: &AppServices, product: &Product) -> serde_json::Value {
    let mut parameters = services.store.product_parameters(product.id);
    // Stable fold order so the de-duplicated union is deterministic.
    parameters.sort_by_key(|row| (*row.distributor_id.as_uuid(), *row.parameter_id.as_uuid()));
    let offers = services
        .store
        .offers_for_product(product.id)
        .into_iter()
        .map(|offer| {
            let offer_parameters = parameters
                .iter()
                .filter(|row| row.distributor_id == offer.distributor_id)
                .filter_map(|row| {
                    services
                        .store
                        .parameter(row.parameter_id)
                        .map(|p| (p.name, serde_json::Value::String(row.value.clone())))
                })
                .collect::<serde_json::Map<_, _>>();
            serde_json::json!({
                "distributor_id": offer.distributor_id.to_string(),
                "price": offer.price,
                "delivery_price": offer.delivery_price,
                "quantity": offer.quantity,
                "parameters": offer_parameters,
            })
        })
        .collect::<Vec<_>>();

    let flattened = parameters
        .iter()
        .filter_map(|row| {
            services
                .store
                .parameter(row.parameter_id)
                .map(|p| (p.name, serde_json::Value::String(row.value.clone())))
        })
        .collect::<serde_json::Map<_, _>>();

    serde_json::json!({
        "id": product.id.to_string(),
        "name": product.name,
        "parameters": flattened,
        "offers": offers,
    })
}
