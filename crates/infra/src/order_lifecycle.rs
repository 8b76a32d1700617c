use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use tradelink_core::{AddressId, BasketId, DomainError, DomainResult, OrderId};
use tradelink_orders::{
    Address, Basket, CustomerInfo, OrderConfirmation, OrderHistory, OrderMeta, OrderStatus,
};

use crate::entity_store::{EntityStore, Mutation, WriteBatch};
use crate::notify::{EmailIntent, NotificationSink};

/// Delivery address fields as supplied at confirmation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressInput {
    pub city: String,
    pub street: String,
    pub building: String,
    pub office: String,
}

/// A fully joined view of one order for presentation.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub order: OrderMeta,
    pub basket: Basket,
    pub customer: CustomerInfo,
    pub address: Address,
    pub product_name: String,
    pub distributor_name: String,
}

/// Order confirmation and the status state machine.
///
/// Status transitions are unrestricted between the four states, but a
/// transition into a terminal state (`delivered`, `cancelled`) archives the
/// order into history exactly once, in the same write batch as the status
/// change. Notifications are fire-and-forget: a sink failure is logged and
/// the workflow continues.
pub struct OrderLifecycle<S> {
    store: S,
    notifier: Arc<dyn NotificationSink>,
}

impl<S: EntityStore> OrderLifecycle<S> {
    pub fn new(store: S, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { store, notifier }
    }

    /// Confirm a basket into an order.
    ///
    /// Reuses the address of the customer's previous confirmation (keyed by
    /// email), creates a fresh one otherwise. Emits two email intents:
    /// a summary to the customer and an alert to the superuser.
    pub fn confirm(
        &self,
        basket_id: BasketId,
        customer: CustomerInfo,
        address: AddressInput,
    ) -> DomainResult<OrderMeta> {
        let basket = self
            .store
            .basket(basket_id)
            .ok_or(DomainError::BasketNotFound)?;

        let mut batch = WriteBatch::new();
        let address_id = self.resolve_address(&customer, &address, &mut batch);

        let confirmation = OrderConfirmation {
            id: tradelink_core::ConfirmationId::new(),
            basket_id,
            customer: customer.clone(),
            address_id,
        };
        let order = OrderMeta {
            id: OrderId::new(),
            basket_id,
            confirmation_id: confirmation.id,
            created_at: Utc::now(),
            status: OrderStatus::New,
        };
        batch.push(Mutation::PutConfirmation(confirmation));
        batch.push(Mutation::PutOrder(order.clone()));
        self.store.apply(batch)?;

        info!(order_id = %order.id, %basket_id, "order confirmed");

        self.send(EmailIntent {
            to: customer.email.clone(),
            subject: format!("Order {} confirmed", order.id),
            body: format!(
                "Hello {},\n\nyour order for {} item(s) totalling {} was received.",
                customer.full_name(),
                basket.quantity,
                basket.total_price,
            ),
        });
        if let Some(admin) = self.store.superuser() {
            self.send(EmailIntent {
                to: admin.email,
                subject: format!("New order {}", order.id),
                body: format!(
                    "Order {} placed by {} <{}>, total {}.",
                    order.id,
                    customer.full_name(),
                    customer.email,
                    basket.total_price,
                ),
            });
        }

        Ok(order)
    }

    /// Move an order to `new_status`. A terminal target writes the history
    /// row and the status in one batch, so an order can never sit in a
    /// terminal state without its archive entry.
    pub fn change_status(&self, order_id: OrderId, new_status: OrderStatus) -> DomainResult<OrderMeta> {
        let order = self.store.order(order_id).ok_or(DomainError::NotFound)?;

        let mut batch = WriteBatch::new();
        if new_status.is_terminal() {
            let basket = self
                .store
                .basket(order.basket_id)
                .ok_or_else(|| DomainError::conflict("order references a missing basket"))?;
            batch.push(Mutation::InsertHistoryIfAbsent(OrderHistory {
                order_id,
                result_price: basket.total_price,
                final_status: new_status,
            }));
        }
        batch.push(Mutation::SetOrderStatus {
            order_id,
            status: new_status,
        });
        self.store.apply(batch)?;

        info!(%order_id, status = %new_status, "order status changed");
        self.store.order(order_id).ok_or(DomainError::NotFound)
    }

    pub fn get(&self, order_id: OrderId) -> DomainResult<OrderView> {
        let order = self.store.order(order_id).ok_or(DomainError::NotFound)?;
        self.view(order)
    }

    pub fn list(&self) -> DomainResult<Vec<OrderView>> {
        self.store
            .orders()
            .into_iter()
            .map(|order| self.view(order))
            .collect()
    }

    pub fn history(&self) -> Vec<OrderHistory> {
        self.store.histories()
    }

    fn view(&self, order: OrderMeta) -> DomainResult<OrderView> {
        let basket = self
            .store
            .basket(order.basket_id)
            .ok_or_else(|| DomainError::conflict("order references a missing basket"))?;
        let confirmation = self
            .store
            .confirmation(order.confirmation_id)
            .ok_or_else(|| DomainError::conflict("order references a missing confirmation"))?;
        let address = self
            .store
            .address(confirmation.address_id)
            .ok_or_else(|| DomainError::conflict("confirmation references a missing address"))?;
        let product_name = self
            .store
            .product(basket.product_id)
            .map(|p| p.name)
            .unwrap_or_default();
        let distributor_name = self
            .store
            .distributor(basket.distributor_id)
            .and_then(|d| self.store.user(d.user_id))
            .map(|u| u.display_name())
            .unwrap_or_default();
        Ok(OrderView {
            order,
            basket,
            customer: confirmation.customer,
            address,
            product_name,
            distributor_name,
        })
    }

    /// A repeat customer (keyed by email alone) keeps their existing address
    /// row; only a first-time customer gets a fresh one.
    fn resolve_address(
        &self,
        customer: &CustomerInfo,
        input: &AddressInput,
        batch: &mut WriteBatch,
    ) -> AddressId {
        if let Some(previous) = self.store.confirmation_by_email(&customer.email) {
            return previous.address_id;
        }
        let address = Address {
            id: AddressId::new(),
            city: input.city.clone(),
            street: input.street.clone(),
            building: input.building.clone(),
            office: input.office.clone(),
        };
        let id = address.id;
        batch.push(Mutation::PutAddress(address));
        id
    }

    fn send(&self, intent: EmailIntent) {
        if let Err(err) = self.notifier.deliver(intent) {
            warn!(error = %err, "notification delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tradelink_auth::{UserAccount, UserKind};
    use tradelink_catalog::{Distributor, FeedEntry};
    use tradelink_core::UserId;

    use super::*;
    use crate::basket_manager::BasketManager;
    use crate::catalog_sync::CatalogSynchronizer;
    use crate::entity_store::InMemoryEntityStore;
    use crate::notify::InMemoryNotificationSink;

    struct Fixture {
        store: Arc<InMemoryEntityStore>,
        sink: Arc<InMemoryNotificationSink>,
        lifecycle: OrderLifecycle<Arc<InMemoryEntityStore>>,
        basket_id: BasketId,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryEntityStore::new());

        let admin = UserAccount {
            id: UserId::new(),
            email: "admin@example.com".to_string(),
            password_digest: "digest".to_string(),
            username: "admin".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            middle_name: String::new(),
            company: String::new(),
            phone: String::new(),
            kind: UserKind::Customer,
            is_superuser: true,
            address_id: None,
        };
        let account = UserAccount {
            id: UserId::new(),
            email: "dist@example.com".to_string(),
            password_digest: "digest".to_string(),
            username: "dist".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            middle_name: String::new(),
            company: String::new(),
            phone: String::new(),
            kind: UserKind::Distributor,
            is_superuser: false,
            address_id: None,
        };
        let distributor = Distributor::new(account.id, true);
        let mut batch = WriteBatch::new();
        batch.push(Mutation::PutUser(admin));
        batch.push(Mutation::PutUser(account));
        batch.push(Mutation::PutDistributor(distributor.clone()));
        store.apply(batch).unwrap();

        let entry = FeedEntry {
            name: "Widget".to_string(),
            price: 80,
            price_rrc: 100,
            quantity: 5,
            parameters: BTreeMap::new(),
        };
        CatalogSynchronizer::new(store.clone())
            .synchronize(distributor.id, &[entry])
            .unwrap();

        let basket = BasketManager::new(store.clone())
            .add_to_basket("Widget", distributor.id, 3)
            .unwrap();

        let sink = Arc::new(InMemoryNotificationSink::new());
        let lifecycle = OrderLifecycle::new(store.clone(), sink.clone());
        Fixture {
            store,
            sink,
            lifecycle,
            basket_id: basket.id,
        }
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            last_name: "Petrov".to_string(),
            first_name: "Ivan".to_string(),
            middle_name: String::new(),
            email: "ivan@example.com".to_string(),
            phone: "+7000".to_string(),
        }
    }

    fn address() -> AddressInput {
        AddressInput {
            city: "SPb".to_string(),
            street: "Nevsky".to_string(),
            building: "1".to_string(),
            office: "2".to_string(),
        }
    }

    #[test]
    fn confirm_creates_a_new_order_and_notifies_both_parties() {
        let f = fixture();
        let order = f.lifecycle.confirm(f.basket_id, customer(), address()).unwrap();
        assert_eq!(order.status, OrderStatus::New);

        let sent = f.sink.all();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "ivan@example.com");
        assert_eq!(sent[1].to, "admin@example.com");
    }

    #[test]
    fn confirm_of_a_missing_basket_fails() {
        let f = fixture();
        let err = f
            .lifecycle
            .confirm(BasketId::new(), customer(), address())
            .unwrap_err();
        assert!(matches!(err, DomainError::BasketNotFound));
    }

    #[test]
    fn matching_address_is_reused_across_confirmations() {
        let f = fixture();
        let first = f.lifecycle.confirm(f.basket_id, customer(), address()).unwrap();

        let basket = BasketManager::new(f.store.clone())
            .add_to_basket("Widget", f.store.baskets()[0].distributor_id, 1)
            .unwrap();
        let second = f.lifecycle.confirm(basket.id, customer(), address()).unwrap();

        let c1 = f.store.confirmation(first.confirmation_id).unwrap();
        let c2 = f.store.confirmation(second.confirmation_id).unwrap();
        assert_eq!(c1.address_id, c2.address_id);
    }

    #[test]
    fn repeat_customer_keeps_their_address_even_when_fields_differ() {
        let f = fixture();
        let first = f.lifecycle.confirm(f.basket_id, customer(), address()).unwrap();

        let basket = BasketManager::new(f.store.clone())
            .add_to_basket("Widget", f.store.baskets()[0].distributor_id, 1)
            .unwrap();
        let mut other = address();
        other.office = "99".to_string();
        let second = f.lifecycle.confirm(basket.id, customer(), other).unwrap();

        // Reuse is keyed by email alone; the changed office does not fork a
        // new address row.
        let c1 = f.store.confirmation(first.confirmation_id).unwrap();
        let c2 = f.store.confirmation(second.confirmation_id).unwrap();
        assert_eq!(c1.address_id, c2.address_id);
        assert_eq!(f.store.address(c2.address_id).unwrap().office, "2");
    }

    #[test]
    fn a_different_customer_gets_their_own_address_row() {
        let f = fixture();
        let first = f.lifecycle.confirm(f.basket_id, customer(), address()).unwrap();

        let basket = BasketManager::new(f.store.clone())
            .add_to_basket("Widget", f.store.baskets()[0].distributor_id, 1)
            .unwrap();
        let mut stranger = customer();
        stranger.email = "other@example.com".to_string();
        let second = f.lifecycle.confirm(basket.id, stranger, address()).unwrap();

        let c1 = f.store.confirmation(first.confirmation_id).unwrap();
        let c2 = f.store.confirmation(second.confirmation_id).unwrap();
        assert_ne!(c1.address_id, c2.address_id);
    }

    #[test]
    fn terminal_transition_archives_exactly_once() {
        let f = fixture();
        let order = f.lifecycle.confirm(f.basket_id, customer(), address()).unwrap();

        f.lifecycle.change_status(order.id, OrderStatus::Delivered).unwrap();
        f.lifecycle.change_status(order.id, OrderStatus::Delivered).unwrap();

        let histories = f.lifecycle.history();
        assert_eq!(histories.len(), 1);
        assert_eq!(histories[0].order_id, order.id);
        assert_eq!(histories[0].result_price, 260);
        assert_eq!(histories[0].final_status, OrderStatus::Delivered);
    }

    #[test]
    fn cancellation_is_archived_too() {
        let f = fixture();
        let order = f.lifecycle.confirm(f.basket_id, customer(), address()).unwrap();
        f.lifecycle.change_status(order.id, OrderStatus::Cancelled).unwrap();

        let histories = f.lifecycle.history();
        assert_eq!(histories.len(), 1);
        assert_eq!(histories[0].final_status, OrderStatus::Cancelled);
    }

    #[test]
    fn non_terminal_transition_does_not_archive() {
        let f = fixture();
        let order = f.lifecycle.confirm(f.basket_id, customer(), address()).unwrap();
        let updated = f.lifecycle.change_status(order.id, OrderStatus::Paid).unwrap();
        assert_eq!(updated.status, OrderStatus::Paid);
        assert!(f.lifecycle.history().is_empty());
    }

    #[test]
    fn first_terminal_status_wins_in_history() {
        let f = fixture();
        let order = f.lifecycle.confirm(f.basket_id, customer(), address()).unwrap();
        f.lifecycle.change_status(order.id, OrderStatus::Cancelled).unwrap();
        f.lifecycle.change_status(order.id, OrderStatus::Delivered).unwrap();

        let histories = f.lifecycle.history();
        assert_eq!(histories.len(), 1);
        assert_eq!(histories[0].final_status, OrderStatus::Cancelled);
        // The live status still tracks the latest transition.
        assert_eq!(
            f.store.order(order.id).unwrap().status,
            OrderStatus::Delivered
        );
    }

    #[test]
    fn a_failing_sink_does_not_block_confirmation() {
        struct FailingSink;
        impl NotificationSink for FailingSink {
            fn deliver(&self, _intent: EmailIntent) -> anyhow::Result<()> {
                anyhow::bail!("smtp down")
            }
        }

        let f = fixture();
        let lifecycle = OrderLifecycle::new(f.store.clone(), Arc::new(FailingSink));
        let order = lifecycle.confirm(f.basket_id, customer(), address()).unwrap();
        assert_eq!(order.status, OrderStatus::New);
    }

    #[test]
    fn view_joins_names_for_presentation() {
        let f = fixture();
        let order = f.lifecycle.confirm(f.basket_id, customer(), address()).unwrap();
        let view = f.lifecycle.get(order.id).unwrap();
        assert_eq!(view.product_name, "Widget");
        assert_eq!(view.customer.email, "ivan@example.com");
        assert_eq!(view.address.city, "SPb");
        assert_eq!(view.basket.total_price, 260);
    }
}
