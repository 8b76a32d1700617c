//! Basket line and its pricing arithmetic.

use serde::{Deserialize, Serialize};

use tradelink_core::{BasketId, DistributorId, DomainError, DomainResult, ProductId};

/// Resolved totals for one basket line.
///
/// Invariant: `total_price == sum + delivery_price` and
/// `sum == unit_price * quantity`, always computed server-side from the
/// distributor's current offer — never client-supplied.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTotals {
    pub sum: u64,
    pub total_price: u64,
}

impl LineTotals {
    /// Compute totals for a line. Prices are in the smallest currency unit;
    /// overflow is a validation error rather than a silent wrap.
    pub fn compute(unit_price: u64, delivery_price: u64, quantity: u32) -> DomainResult<Self> {
        let sum = unit_price
            .checked_mul(u64::from(quantity))
            .ok_or_else(|| DomainError::validation("basket sum overflows"))?;
        let total_price = sum
            .checked_add(delivery_price)
            .ok_or_else(|| DomainError::validation("basket total overflows"))?;
        Ok(Self { sum, total_price })
    }
}

/// A single line-item cart entry.
///
/// Product and distributor are held as stable identifiers captured at
/// creation; display names are resolved only at presentation time. The
/// product is immutable once the line exists — quantity and distributor may
/// change, and every change re-resolves the price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    pub id: BasketId,
    pub product_id: ProductId,
    pub distributor_id: DistributorId,
    pub price: u64,
    pub quantity: u32,
    pub sum: u64,
    pub total_price: u64,
}

impl Basket {
    pub fn new(
        product_id: ProductId,
        distributor_id: DistributorId,
        price: u64,
        quantity: u32,
        totals: LineTotals,
    ) -> Self {
        Self {
            id: BasketId::new(),
            product_id,
            distributor_id,
            price,
            quantity,
            sum: totals.sum,
            total_price: totals.total_price,
        }
    }

    /// Check the persisted-row invariant; used by tests and store debugging.
    pub fn totals_consistent(&self, delivery_price: u64) -> bool {
        self.sum == self.price * u64::from(self.quantity)
            && self.total_price == self.sum + delivery_price
    }
}
