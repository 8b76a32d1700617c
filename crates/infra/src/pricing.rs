use tradelink_core::{DistributorId, DomainError, DomainResult, ProductId};

use crate::entity_store::EntityStore;

/// Authoritative price and stock answer for one (product, distributor) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub unit_price: u64,
    pub delivery_price: u64,
    pub stock_ceiling: u32,
}

/// Resolves prices from the synchronized catalog.
///
/// Every basket mutation re-resolves through here; basket rows never carry
/// stale prices forward on their own.
#[derive(Debug, Clone)]
pub struct PricingResolver<S> {
    store: S,
}

impl<S: EntityStore> PricingResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the current quote, or `NotOffered` when the distributor does
    /// not carry the product.
    pub fn resolve(
        &self,
        product_id: ProductId,
        distributor_id: DistributorId,
    ) -> DomainResult<PriceQuote> {
        let offer = self
            .store
            .offer(product_id, distributor_id)
            .ok_or(DomainError::NotOffered)?;
        Ok(PriceQuote {
            unit_price: offer.price,
            delivery_price: offer.delivery_price,
            stock_ceiling: offer.quantity,
        })
    }
}
