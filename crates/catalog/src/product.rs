//! Catalog entities.
//!
//! Product and Parameter are shared across distributors and are created
//! idempotently by name; one distributor's synchronization must never delete
//! them. ProductParameter and ProductDistributor rows are scoped to the
//! distributor that submitted them, so concurrent feeds from different
//! distributors for the same product are commutative.

use serde::{Deserialize, Serialize};

use tradelink_core::{DistributorId, ParameterId, ProductId, UserId};

/// A catalog product. Identity is the (case-sensitive) unique `name`;
/// products are only ever superseded by synchronization, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
        }
    }
}

/// An attribute name shared across products (e.g. "color").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: ParameterId,
    pub name: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ParameterId::new(),
            name: name.into(),
        }
    }
}

/// A parameter value for one product, as submitted by one distributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductParameter {
    pub product_id: ProductId,
    pub distributor_id: DistributorId,
    pub parameter_id: ParameterId,
    pub value: String,
}

/// A distributor: 1:1 wrapper of a distributor-kind user, with an
/// accepting-orders switch the distributor toggles themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distributor {
    pub id: DistributorId,
    pub user_id: UserId,
    pub accepting_orders: bool,
}

impl Distributor {
    pub fn new(user_id: UserId, accepting_orders: bool) -> Self {
        Self {
            id: DistributorId::new(),
            user_id,
            accepting_orders,
        }
    }
}

/// The authoritative price/stock record for one distributor's offering of one
/// product. Prices are in the smallest currency unit (e.g. cents).
///
/// Invariant at ingestion: `delivery_price = recommended_price - price` with
/// `recommended_price > price`, so `delivery_price` is always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDistributor {
    pub product_id: ProductId,
    pub distributor_id: DistributorId,
    pub price: u64,
    pub delivery_price: u64,
    /// Stock ceiling: the maximum orderable quantity from this distributor.
    pub quantity: u32,
}
