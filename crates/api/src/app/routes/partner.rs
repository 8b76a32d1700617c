use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use tradelink_catalog::PriceList;
use tradelink_infra::entity_store::EntityStore;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Accept a distributor's YAML price list and reconcile it into the catalog.
pub async fn upload_price_list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: String,
) -> axum::response::Response {
    if let Err(resp) = crate::authz::require_distributor(&principal) {
        return resp;
    }

    let price_list: PriceList = match serde_yaml::from_str(&body) {
        Ok(list) => list,
        Err(e) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_feed",
                format!("price list is not valid YAML: {e}"),
            );
        }
    };

    let distributor = match services.store.distributor_by_user(principal.user_id()) {
        Some(d) => d,
        None => {
            return errors::json_error(
                StatusCode::FORBIDDEN,
                "not_a_distributor",
                "no distributor record for this account",
            );
        }
    };

    match services
        .synchronizer
        .synchronize(distributor.id, &price_list.goods)
    {
        Ok(report) => Json(serde_json::json!({
            "distributor_id": distributor.id.to_string(),
            "entries_applied": report.entries_applied,
        }))
        .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
