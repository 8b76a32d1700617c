use std::sync::Arc;

use thiserror::Error;

use tradelink_auth::UserAccount;
use tradelink_catalog::{Distributor, Parameter, Product, ProductDistributor, ProductParameter};
use tradelink_core::{
    AddressId, BasketId, ConfirmationId, DistributorId, DomainError, OrderId, ParameterId,
    ProductId, UserId,
};
use tradelink_orders::{Address, Basket, OrderConfirmation, OrderHistory, OrderMeta, OrderStatus};

/// Entity store operation error.
///
/// These are **storage errors** (integrity, constraints, locks) as opposed to
/// domain errors (validation, business rules).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("referential integrity violation: {0}")]
    ForeignKey(String),

    #[error("unique constraint violation: {0}")]
    Unique(String),

    #[error("row not found: {0}")]
    NotFound(String),

    #[error("store lock poisoned")]
    Poisoned,
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => DomainError::NotFound,
            other => DomainError::conflict(other.to_string()),
        }
    }
}

/// One ordered mutation inside a write batch.
///
/// `Put*` variants are upserts keyed by the row's identifier. `Replace*`
/// variants implement the delete-then-recreate semantics of catalog
/// synchronization, scoped to a single distributor so that other
/// distributors' rows for the same product are untouched.
#[derive(Debug, Clone)]
pub enum Mutation {
    PutUser(UserAccount),
    DeleteUser(UserId),
    PutAddress(Address),
    DeleteAddress(AddressId),
    PutDistributor(Distributor),
    DeleteDistributor(DistributorId),
    PutProduct(Product),
    PutParameter(Parameter),
    /// Replace every ProductParameter row for (product, distributor) with
    /// `rows`. Stale parameters from a previous feed must not survive.
    ReplaceProductParameters {
        product_id: ProductId,
        distributor_id: DistributorId,
        rows: Vec<ProductParameter>,
    },
    /// Replace the (product, distributor) price/stock record.
    ReplaceOffer(ProductDistributor),
    PutBasket(Basket),
    DeleteBasket(BasketId),
    PutConfirmation(OrderConfirmation),
    PutOrder(OrderMeta),
    SetOrderStatus {
        order_id: OrderId,
        status: OrderStatus,
    },
    /// Get-or-create semantics keyed by the order id: a repeated terminal
    /// transition must not create a duplicate history row.
    InsertHistoryIfAbsent(OrderHistory),
}

/// An ordered sequence of mutations applied as one unit.
///
/// Arena-style: open a batch, queue mutations, commit-or-discard. A batch is
/// either applied in full or not at all, so a failure mid-sequence cannot
/// leave mismatched price/parameter state behind.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    mutations: Vec<Mutation>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }
}

/// Normalized entity storage with referential integrity.
///
/// Reads are point lookups and filtered queries; all writes go through
/// [`EntityStore::apply`] so that multi-step sequences (parameter replace,
/// price-resolve-then-persist, history-then-status) commit atomically.
///
/// Implementations must:
/// - enforce unique constraints (product/parameter names, user emails)
/// - enforce referential integrity on every mutation
/// - apply a batch atomically (all mutations or none)
pub trait EntityStore: Send + Sync {
    // Users and addresses.
    fn user(&self, id: UserId) -> Option<UserAccount>;
    fn user_by_email(&self, email: &str) -> Option<UserAccount>;
    /// The first superuser account, if any (admin notification target).
    fn superuser(&self) -> Option<UserAccount>;
    fn address(&self, id: AddressId) -> Option<Address>;
    /// Whether any order confirmation references the address. Account rows
    /// own their address; confirmations borrow it.
    fn address_referenced(&self, id: AddressId) -> bool;

    // Distributors.
    fn distributor(&self, id: DistributorId) -> Option<Distributor>;
    fn distributor_by_user(&self, user_id: UserId) -> Option<Distributor>;

    // Catalog.
    fn product(&self, id: ProductId) -> Option<Product>;
    fn product_by_name(&self, name: &str) -> Option<Product>;
    fn products(&self) -> Vec<Product>;
    fn parameter(&self, id: ParameterId) -> Option<Parameter>;
    fn parameter_by_name(&self, name: &str) -> Option<Parameter>;
    fn product_parameters(&self, product_id: ProductId) -> Vec<ProductParameter>;
    fn offer(
        &self,
        product_id: ProductId,
        distributor_id: DistributorId,
    ) -> Option<ProductDistributor>;
    fn offers_for_product(&self, product_id: ProductId) -> Vec<ProductDistributor>;

    // Baskets.
    fn basket(&self, id: BasketId) -> Option<Basket>;
    fn baskets(&self) -> Vec<Basket>;

    // Orders.
    fn confirmation(&self, id: ConfirmationId) -> Option<OrderConfirmation>;
    fn confirmation_by_email(&self, email: &str) -> Option<OrderConfirmation>;
    fn order(&self, id: OrderId) -> Option<OrderMeta>;
    fn orders(&self) -> Vec<OrderMeta>;
    fn history(&self, order_id: OrderId) -> Option<OrderHistory>;
    fn histories(&self) -> Vec<OrderHistory>;

    /// Apply a write batch atomically (commit-or-discard).
    fn apply(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

impl<S> EntityStore for Arc<S>
where
    S: EntityStore + ?Sized,
{
    fn user(&self, id: UserId) -> Option<UserAccount> {
        (**self).user(id)
    }

    fn user_by_email(&self, email: &str) -> Option<UserAccount> {
        (**self).user_by_email(email)
    }

    fn superuser(&self) -> Option<UserAccount> {
        (**self).superuser()
    }

    fn address(&self, id: AddressId) -> Option<Address> {
        (**self).address(id)
    }

    fn address_referenced(&self, id: AddressId) -> bool {
        (**self).address_referenced(id)
    }

    fn distributor(&self, id: DistributorId) -> Option<Distributor> {
        (**self).distributor(id)
    }

    fn distributor_by_user(&self, user_id: UserId) -> Option<Distributor> {
        (**self).distributor_by_user(user_id)
    }

    fn product(&self, id: ProductId) -> Option<Product> {
        (**self).product(id)
    }

    fn product_by_name(&self, name: &str) -> Option<Product> {
        (**self).product_by_name(name)
    }

    fn products(&self) -> Vec<Product> {
        (**self).products()
    }

    fn parameter(&self, id: ParameterId) -> Option<Parameter> {
        (**self).parameter(id)
    }

    fn parameter_by_name(&self, name: &str) -> Option<Parameter> {
        (**self).parameter_by_name(name)
    }

    fn product_parameters(&self, product_id: ProductId) -> Vec<ProductParameter> {
        (**self).product_parameters(product_id)
    }

    fn offer(
        &self,
        product_id: ProductId,
        distributor_id: DistributorId,
    ) -> Option<ProductDistributor> {
        (**self).offer(product_id, distributor_id)
    }

    fn offers_for_product(&self, product_id: ProductId) -> Vec<ProductDistributor> {
        (**self).offers_for_product(product_id)
    }

    fn basket(&self, id: BasketId) -> Option<Basket> {
        (**self).basket(id)
    }

    fn baskets(&self) -> Vec<Basket> {
        (**self).baskets()
    }

    fn confirmation(&self, id: ConfirmationId) -> Option<OrderConfirmation> {
        (**self).confirmation(id)
    }

    fn confirmation_by_email(&self, email: &str) -> Option<OrderConfirmation> {
        (**self).confirmation_by_email(email)
    }

    fn order(&self, id: OrderId) -> Option<OrderMeta> {
        (**self).order(id)
    }

    fn orders(&self) -> Vec<OrderMeta> {
        (**self).orders()
    }

    fn history(&self, order_id: OrderId) -> Option<OrderHistory> {
        (**self).history(order_id)
    }

    fn histories(&self) -> Vec<OrderHistory> {
        (**self).histories()
    }

    fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        (**self).apply(batch)
    }
}
