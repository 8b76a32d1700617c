use axum::{
    Router,
    routing::{delete, get, patch, post},
};

pub mod accounts;
pub mod basket;
pub mod orders;
pub mod partner;
pub mod products;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/auth/account", delete(accounts::delete_account))
        .route(
            "/auth/distributor-status",
            patch(accounts::distributor_status),
        )
        .route("/partner/price-list", post(partner::upload_price_list))
        .route("/products", get(products::list_products))
        .route("/products/:id", get(products::get_product))
        .route("/basket", post(basket::add_line).get(basket::list_lines))
        .route(
            "/basket/:id",
            get(basket::get_line)
                .patch(basket::update_line)
                .delete(basket::remove_line),
        )
        .route("/orders/confirm", post(orders::confirm))
        .route("/orders", get(orders::list_orders))
        .route("/orders/history", get(orders::list_history))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/status", post(orders::change_status))
}
