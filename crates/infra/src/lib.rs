//! Infrastructure layer: the entity store and the services that drive it.
//!
//! - `entity_store`: normalized row storage behind a trait, with arena-style
//!   write batches (open batch, apply ordered mutations, commit-or-discard).
//! - `catalog_sync`: reconciles a distributor's price-list feed.
//! - `pricing`: authoritative price/stock resolution for a product+distributor.
//! - `basket_manager`: basket create/update/validate against resolved prices.
//! - `order_lifecycle`: confirmation, status transitions, exactly-once archival.
//! - `notify`: fire-and-forget email intents.

pub mod basket_manager;
pub mod catalog_sync;
pub mod entity_store;
pub mod notify;
pub mod order_lifecycle;
pub mod pricing;
