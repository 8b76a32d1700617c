//! Distributor price-list feed format.
//!
//! A feed is a YAML document with a `goods` list; `price_rrc` is the
//! recommended/retail price from which the delivery margin is derived.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tradelink_core::{DomainError, DomainResult};

/// One record of a distributor's price list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub name: String,
    pub price: u64,
    pub price_rrc: u64,
    pub quantity: u32,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl FeedEntry {
    /// Derive the delivery margin, rejecting entries where the recommended
    /// price does not exceed the base price.
    pub fn delivery_price(&self) -> DomainResult<u64> {
        if self.price_rrc <= self.price {
            return Err(DomainError::PriceInconsistency {
                price: self.price,
                recommended: self.price_rrc,
            });
        }
        Ok(self.price_rrc - self.price)
    }
}

/// A whole submitted price list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceList {
    pub goods: Vec<FeedEntry>,
}
