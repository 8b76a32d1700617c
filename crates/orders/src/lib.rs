//! `tradelink-orders` — basket lines, order confirmation and the order
//! status state machine.
//!
//! Basket pricing arithmetic and status terminality are pure; driving them
//! against the store is `tradelink-infra`'s job.

pub mod basket;
pub mod order;

pub use basket::{Basket, LineTotals};
pub use order::{
    Address, CustomerInfo, OrderConfirmation, OrderHistory, OrderMeta, OrderStatus,
};
