use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard};

use tracing::warn;

use tradelink_auth::UserAccount;
use tradelink_catalog::{Distributor, Parameter, Product, ProductDistributor, ProductParameter};
use tradelink_core::{
    AddressId, BasketId, ConfirmationId, DistributorId, OrderId, ParameterId, ProductId, UserId,
};
use tradelink_orders::{Address, Basket, OrderConfirmation, OrderHistory, OrderMeta};

use super::r#trait::{EntityStore, Mutation, StoreError, WriteBatch};

/// Plain row maps; cloned wholesale for commit-or-discard batch application.
#[derive(Debug, Clone, Default)]
struct StoreState {
    users: HashMap<UserId, UserAccount>,
    addresses: HashMap<AddressId, Address>,
    distributors: HashMap<DistributorId, Distributor>,
    products: HashMap<ProductId, Product>,
    parameters: HashMap<ParameterId, Parameter>,
    product_parameters: HashMap<(ProductId, DistributorId, ParameterId), ProductParameter>,
    offers: HashMap<(ProductId, DistributorId), ProductDistributor>,
    baskets: HashMap<BasketId, Basket>,
    confirmations: HashMap<ConfirmationId, OrderConfirmation>,
    orders: HashMap<OrderId, OrderMeta>,
    histories: HashMap<OrderId, OrderHistory>,
}

/// In-memory entity store.
///
/// Intended for dev/tests and as the reference implementation of the batch
/// semantics. A batch is applied to a copy of the state and swapped in only
/// when every mutation succeeds, so partially-applied batches cannot be
/// observed.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    inner: RwLock<StoreState>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads cannot surface an error through the trait; a poisoned lock is
    /// loud in the logs instead of silently reading as "absent".
    fn read(&self) -> Option<RwLockReadGuard<'_, StoreState>> {
        match self.inner.read() {
            Ok(guard) => Some(guard),
            Err(_) => {
                warn!("entity store lock poisoned; read treated as empty");
                None
            }
        }
    }
}

impl StoreState {
    fn apply(&mut self, mutation: Mutation) -> Result<(), StoreError> {
        match mutation {
            Mutation::PutUser(user) => {
                if self
                    .users
                    .values()
                    .any(|u| u.id != user.id && u.email == user.email)
                {
                    return Err(StoreError::Unique(format!(
                        "user email '{}' already registered",
                        user.email
                    )));
                }
                if let Some(address_id) = user.address_id {
                    self.require_address(address_id)?;
                }
                self.users.insert(user.id, user);
            }
            Mutation::DeleteUser(id) => {
                if self.distributors.values().any(|d| d.user_id == id) {
                    return Err(StoreError::ForeignKey(format!(
                        "user {id} still owns a distributor record"
                    )));
                }
                self.users
                    .remove(&id)
                    .ok_or_else(|| StoreError::NotFound(format!("user {id}")))?;
            }
            Mutation::PutAddress(address) => {
                self.addresses.insert(address.id, address);
            }
            Mutation::DeleteAddress(id) => {
                if self.users.values().any(|u| u.address_id == Some(id))
                    || self.confirmations.values().any(|c| c.address_id == id)
                {
                    return Err(StoreError::ForeignKey(format!(
                        "address {id} is still referenced"
                    )));
                }
                self.addresses
                    .remove(&id)
                    .ok_or_else(|| StoreError::NotFound(format!("address {id}")))?;
            }
            Mutation::PutDistributor(distributor) => {
                self.require_user(distributor.user_id)?;
                if self
                    .distributors
                    .values()
                    .any(|d| d.id != distributor.id && d.user_id == distributor.user_id)
                {
                    return Err(StoreError::Unique(format!(
                        "user {} already has a distributor record",
                        distributor.user_id
                    )));
                }
                self.distributors.insert(distributor.id, distributor);
            }
            Mutation::DeleteDistributor(id) => {
                self.distributors
                    .remove(&id)
                    .ok_or_else(|| StoreError::NotFound(format!("distributor {id}")))?;
                // Cascade this distributor's own catalog contribution; shared
                // Product/Parameter rows stay.
                self.offers.retain(|(_, d), _| *d != id);
                self.product_parameters.retain(|(_, d, _), _| *d != id);
            }
            Mutation::PutProduct(product) => {
                if self
                    .products
                    .values()
                    .any(|p| p.id != product.id && p.name == product.name)
                {
                    return Err(StoreError::Unique(format!(
                        "product name '{}' already exists",
                        product.name
                    )));
                }
                self.products.insert(product.id, product);
            }
            Mutation::PutParameter(parameter) => {
                if self
                    .parameters
                    .values()
                    .any(|p| p.id != parameter.id && p.name == parameter.name)
                {
                    return Err(StoreError::Unique(format!(
                        "parameter name '{}' already exists",
                        parameter.name
                    )));
                }
                self.parameters.insert(parameter.id, parameter);
            }
            Mutation::ReplaceProductParameters {
                product_id,
                distributor_id,
                rows,
            } => {
                self.require_product(product_id)?;
                self.require_distributor(distributor_id)?;
                for row in &rows {
                    if row.product_id != product_id || row.distributor_id != distributor_id {
                        return Err(StoreError::ForeignKey(
                            "parameter row outside the replacement scope".to_string(),
                        ));
                    }
                    if !self.parameters.contains_key(&row.parameter_id) {
                        return Err(StoreError::ForeignKey(format!(
                            "parameter {} does not exist",
                            row.parameter_id
                        )));
                    }
                }
                self.product_parameters
                    .retain(|(p, d, _), _| !(*p == product_id && *d == distributor_id));
                for row in rows {
                    self.product_parameters
                        .insert((row.product_id, row.distributor_id, row.parameter_id), row);
                }
            }
            Mutation::ReplaceOffer(offer) => {
                self.require_product(offer.product_id)?;
                self.require_distributor(offer.distributor_id)?;
                self.offers
                    .insert((offer.product_id, offer.distributor_id), offer);
            }
            Mutation::PutBasket(basket) => {
                self.require_product(basket.product_id)?;
                self.require_distributor(basket.distributor_id)?;
                self.baskets.insert(basket.id, basket);
            }
            Mutation::DeleteBasket(id) => {
                if self.orders.values().any(|o| o.basket_id == id) {
                    return Err(StoreError::ForeignKey(format!(
                        "basket {id} is bound to an order"
                    )));
                }
                self.baskets
                    .remove(&id)
                    .ok_or_else(|| StoreError::NotFound(format!("basket {id}")))?;
            }
            Mutation::PutConfirmation(confirmation) => {
                self.require_basket(confirmation.basket_id)?;
                self.require_address(confirmation.address_id)?;
                self.confirmations.insert(confirmation.id, confirmation);
            }
            Mutation::PutOrder(order) => {
                self.require_basket(order.basket_id)?;
                if !self.confirmations.contains_key(&order.confirmation_id) {
                    return Err(StoreError::ForeignKey(format!(
                        "confirmation {} does not exist",
                        order.confirmation_id
                    )));
                }
                if self
                    .orders
                    .values()
                    .any(|o| o.id != order.id && o.basket_id == order.basket_id)
                {
                    return Err(StoreError::Unique(format!(
                        "basket {} is already bound to an order",
                        order.basket_id
                    )));
                }
                self.orders.insert(order.id, order);
            }
            Mutation::SetOrderStatus { order_id, status } => {
                let order = self
                    .orders
                    .get_mut(&order_id)
                    .ok_or_else(|| StoreError::NotFound(format!("order {order_id}")))?;
                order.status = status;
            }
            Mutation::InsertHistoryIfAbsent(history) => {
                if !self.orders.contains_key(&history.order_id) {
                    return Err(StoreError::ForeignKey(format!(
                        "order {} does not exist",
                        history.order_id
                    )));
                }
                self.histories.entry(history.order_id).or_insert(history);
            }
        }
        Ok(())
    }

    fn require_user(&self, id: UserId) -> Result<(), StoreError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::ForeignKey(format!("user {id} does not exist")))
        }
    }

    fn require_address(&self, id: AddressId) -> Result<(), StoreError> {
        if self.addresses.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::ForeignKey(format!(
                "address {id} does not exist"
            )))
        }
    }

    fn require_product(&self, id: ProductId) -> Result<(), StoreError> {
        if self.products.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::ForeignKey(format!(
                "product {id} does not exist"
            )))
        }
    }

    fn require_distributor(&self, id: DistributorId) -> Result<(), StoreError> {
        if self.distributors.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::ForeignKey(format!(
                "distributor {id} does not exist"
            )))
        }
    }

    fn require_basket(&self, id: BasketId) -> Result<(), StoreError> {
        if self.baskets.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::ForeignKey(format!("basket {id} does not exist")))
        }
    }
}

impl EntityStore for InMemoryEntityStore {
    fn user(&self, id: UserId) -> Option<UserAccount> {
        self.read()?.users.get(&id).cloned()
    }

    fn user_by_email(&self, email: &str) -> Option<UserAccount> {
        let state = self.read()?;
        state.users.values().find(|u| u.email == email).cloned()
    }

    fn superuser(&self) -> Option<UserAccount> {
        let state = self.read()?;
        state.users.values().find(|u| u.is_superuser).cloned()
    }

    fn address(&self, id: AddressId) -> Option<Address> {
        self.read()?.addresses.get(&id).cloned()
    }

    fn address_referenced(&self, id: AddressId) -> bool {
        match self.read() {
            Some(state) => state.confirmations.values().any(|c| c.address_id == id),
            None => false,
        }
    }

    fn distributor(&self, id: DistributorId) -> Option<Distributor> {
        self.read()?.distributors.get(&id).cloned()
    }

    fn distributor_by_user(&self, user_id: UserId) -> Option<Distributor> {
        let state = self.read()?;
        state
            .distributors
            .values()
            .find(|d| d.user_id == user_id)
            .cloned()
    }

    fn product(&self, id: ProductId) -> Option<Product> {
        self.read()?.products.get(&id).cloned()
    }

    fn product_by_name(&self, name: &str) -> Option<Product> {
        let state = self.read()?;
        state.products.values().find(|p| p.name == name).cloned()
    }

    fn products(&self) -> Vec<Product> {
        let Some(state) = self.read() else {
            return vec![];
        };
        let mut products: Vec<_> = state.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }

    fn parameter(&self, id: ParameterId) -> Option<Parameter> {
        self.read()?.parameters.get(&id).cloned()
    }

    fn parameter_by_name(&self, name: &str) -> Option<Parameter> {
        let state = self.read()?;
        state.parameters.values().find(|p| p.name == name).cloned()
    }

    fn product_parameters(&self, product_id: ProductId) -> Vec<ProductParameter> {
        let Some(state) = self.read() else {
            return vec![];
        };
        state
            .product_parameters
            .values()
            .filter(|row| row.product_id == product_id)
            .cloned()
            .collect()
    }

    fn offer(
        &self,
        product_id: ProductId,
        distributor_id: DistributorId,
    ) -> Option<ProductDistributor> {
        self.inner
            .read()
            .ok()?
            .offers
            .get(&(product_id, distributor_id))
            .cloned()
    }

    fn offers_for_product(&self, product_id: ProductId) -> Vec<ProductDistributor> {
        let Some(state) = self.read() else {
            return vec![];
        };
        state
            .offers
            .values()
            .filter(|o| o.product_id == product_id)
            .cloned()
            .collect()
    }

    fn basket(&self, id: BasketId) -> Option<Basket> {
        self.read()?.baskets.get(&id).cloned()
    }

    fn baskets(&self) -> Vec<Basket> {
        match self.read() {
            Some(state) => state.baskets.values().cloned().collect(),
            None => vec![],
        }
    }

    fn confirmation(&self, id: ConfirmationId) -> Option<OrderConfirmation> {
        self.read()?.confirmations.get(&id).cloned()
    }

    fn confirmation_by_email(&self, email: &str) -> Option<OrderConfirmation> {
        let state = self.read()?;
        state
            .confirmations
            .values()
            .find(|c| c.customer.email == email)
            .cloned()
    }

    fn order(&self, id: OrderId) -> Option<OrderMeta> {
        self.read()?.orders.get(&id).cloned()
    }

    fn orders(&self) -> Vec<OrderMeta> {
        let Some(state) = self.read() else {
            return vec![];
        };
        let mut orders: Vec<_> = state.orders.values().cloned().collect();
        orders.sort_by_key(|o| o.created_at);
        orders
    }

    fn history(&self, order_id: OrderId) -> Option<OrderHistory> {
        self.read()?.histories.get(&order_id).cloned()
    }

    fn histories(&self) -> Vec<OrderHistory> {
        match self.read() {
            Some(state) => state.histories.values().cloned().collect(),
            None => vec![],
        }
    }

    fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut guard = self.inner.write().map_err(|_| StoreError::Poisoned)?;

        // Commit-or-discard: stage against a copy, swap in only on full success.
        let mut staged = guard.clone();
        for mutation in batch.into_mutations() {
            staged.apply(mutation)?;
        }
        *guard = staged;
        Ok(())
    }
}
