use serde::Deserialize;
use serde_json::json;

use tradelink_orders::{Basket, OrderHistory};
use tradelink_infra::order_lifecycle::OrderView;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct DistributorStatusRequest {
    pub accepting_orders: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddToBasketRequest {
    pub product: String,
    pub distributor_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBasketRequest {
    pub quantity: Option<u32>,
    pub distributor_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub city: String,
    pub street: String,
    pub building: String,
    #[serde(default)]
    pub office: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmOrderRequest {
    pub basket_id: String,
    pub customer: tradelink_orders::CustomerInfo,
    pub address: AddressRequest,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: String,
}

// -------------------------
// Response mapping
// -------------------------

pub fn basket_to_json(basket: &Basket) -> serde_json::Value {
    json!({
        "id": basket.id.to_string(),
        "product_id": basket.product_id.to_string(),
        "distributor_id": basket.distributor_id.to_string(),
        "price": basket.price,
        "quantity": basket.quantity,
        "sum": basket.sum,
        "total_price": basket.total_price,
    })
}

pub fn order_view_to_json(view: &OrderView) -> serde_json::Value {
    json!({
        "id": view.order.id.to_string(),
        "status": view.order.status.as_str(),
        "created_at": view.order.created_at.to_rfc3339(),
        "product": view.product_name,
        "distributor": view.distributor_name,
        "basket": basket_to_json(&view.basket),
        "customer": {
            "last_name": view.customer.last_name,
            "first_name": view.customer.first_name,
            "middle_name": view.customer.middle_name,
            "email": view.customer.email,
            "phone": view.customer.phone,
        },
        "address": {
            "city": view.address.city,
            "street": view.address.street,
            "building": view.address.building,
            "office": view.address.office,
        },
    })
}

pub fn history_to_json(history: &OrderHistory) -> serde_json::Value {
    json!({
        "order_id": history.order_id.to_string(),
        "result_price": history.result_price,
        "final_status": history.final_status.as_str(),
    })
}
