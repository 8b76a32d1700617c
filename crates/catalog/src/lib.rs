//! `tradelink-catalog` — normalized catalog entities and the distributor
//! price-list feed format.
//!
//! Catalog synchronization (reconciling a feed against the store) lives in
//! `tradelink-infra`; this crate holds the pure types and validation.

pub mod feed;
pub mod product;

pub use feed::{FeedEntry, PriceList};
pub use product::{Distributor, Parameter, Product, ProductDistributor, ProductParameter};
