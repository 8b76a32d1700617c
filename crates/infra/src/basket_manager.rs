use tracing::debug;

use tradelink_auth::UserKind;
use tradelink_core::{BasketId, DistributorId, DomainError, DomainResult, ProductId};
use tradelink_orders::{Basket, LineTotals};

use crate::entity_store::{EntityStore, Mutation, WriteBatch};
use crate::pricing::{PriceQuote, PricingResolver};

/// Basket line creation and mutation.
///
/// Validation runs in a fixed short-circuit order on every write:
///
/// 1. price resolution (the distributor must actually offer the product),
/// 2. distributor checks, only when the request names the distributor
///    (the account must be distributor-kind and accepting orders),
/// 3. quantity against the stock ceiling, only when the request carries one.
///
/// Later checks never run once an earlier one fails, so callers see a
/// deterministic error for any given bad request.
#[derive(Debug, Clone)]
pub struct BasketManager<S> {
    store: S,
    pricing: PricingResolver<S>,
}

impl<S: EntityStore + Clone> BasketManager<S> {
    pub fn new(store: S) -> Self {
        let pricing = PricingResolver::new(store.clone());
        Self { store, pricing }
    }

    /// Create a line for `quantity` units of the named product from the named
    /// distributor. Totals are computed from the resolved quote.
    pub fn add_to_basket(
        &self,
        product_name: &str,
        distributor_id: DistributorId,
        quantity: u32,
    ) -> DomainResult<Basket> {
        let product = self
            .store
            .product_by_name(product_name)
            .ok_or(DomainError::NotFound)?;

        let quote = self.validate_line(product.id, distributor_id, true, Some(quantity))?;
        let totals = LineTotals::compute(quote.unit_price, quote.delivery_price, quantity)?;
        let basket = Basket::new(product.id, distributor_id, quote.unit_price, quantity, totals);

        let mut batch = WriteBatch::new();
        batch.push(Mutation::PutBasket(basket.clone()));
        self.store.apply(batch)?;

        debug!(basket_id = %basket.id, product = %product.name, "basket line created");
        Ok(basket)
    }

    /// Change quantity and/or distributor of an existing line. The product is
    /// immutable; omitted fields keep their current value. The line is fully
    /// re-priced from the effective (product, distributor) offer.
    pub fn update_basket(
        &self,
        basket_id: BasketId,
        new_quantity: Option<u32>,
        new_distributor: Option<DistributorId>,
    ) -> DomainResult<Basket> {
        let current = self
            .store
            .basket(basket_id)
            .ok_or(DomainError::BasketNotFound)?;

        let distributor_id = new_distributor.unwrap_or(current.distributor_id);
        let quantity = new_quantity.unwrap_or(current.quantity);

        let quote = self.validate_line(
            current.product_id,
            distributor_id,
            new_distributor.is_some(),
            Some(quantity),
        )?;
        let totals = LineTotals::compute(quote.unit_price, quote.delivery_price, quantity)?;

        let updated = Basket {
            id: current.id,
            product_id: current.product_id,
            distributor_id,
            price: quote.unit_price,
            quantity,
            sum: totals.sum,
            total_price: totals.total_price,
        };

        let mut batch = WriteBatch::new();
        batch.push(Mutation::PutBasket(updated.clone()));
        self.store.apply(batch)?;

        debug!(basket_id = %basket_id, "basket line updated");
        Ok(updated)
    }

    pub fn get(&self, basket_id: BasketId) -> DomainResult<Basket> {
        self.store
            .basket(basket_id)
            .ok_or(DomainError::BasketNotFound)
    }

    pub fn list(&self) -> Vec<Basket> {
        self.store.baskets()
    }

    pub fn remove(&self, basket_id: BasketId) -> DomainResult<()> {
        if self.store.basket(basket_id).is_none() {
            return Err(DomainError::BasketNotFound);
        }
        let mut batch = WriteBatch::new();
        batch.push(Mutation::DeleteBasket(basket_id));
        self.store.apply(batch)?;
        Ok(())
    }

    /// The fixed validation ladder. Returns the resolved quote so callers
    /// never price from anything but the validated offer.
    fn validate_line(
        &self,
        product_id: ProductId,
        distributor_id: DistributorId,
        distributor_in_request: bool,
        quantity: Option<u32>,
    ) -> DomainResult<PriceQuote> {
        let quote = self.pricing.resolve(product_id, distributor_id)?;

        if distributor_in_request {
            let distributor = self
                .store
                .distributor(distributor_id)
                .ok_or(DomainError::NotADistributor)?;
            let account = self
                .store
                .user(distributor.user_id)
                .ok_or(DomainError::NotADistributor)?;
            if account.kind != UserKind::Distributor {
                return Err(DomainError::NotADistributor);
            }
            if !distributor.accepting_orders {
                return Err(DomainError::DistributorUnavailable);
            }
        }

        if let Some(q) = quantity
            && q > quote.stock_ceiling
        {
            return Err(DomainError::QuantityExceeded {
                limit: quote.stock_ceiling,
            });
        }

        Ok(quote)
    }
}
