use tracing::{debug, info};

use tradelink_catalog::{FeedEntry, Parameter, Product, ProductDistributor, ProductParameter};
use tradelink_core::{DistributorId, DomainError, DomainResult};

use crate::entity_store::{EntityStore, Mutation, WriteBatch};

/// Outcome of one feed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub entries_applied: usize,
}

/// Reconciles a distributor's price-list feed into the catalog.
///
/// Each feed entry commits as its own batch: product and parameter upserts,
/// the parameter replacement scoped to this distributor, and the offer. A bad
/// entry aborts the run before writing anything for itself, but entries
/// already committed stay committed.
#[derive(Debug, Clone)]
pub struct CatalogSynchronizer<S> {
    store: S,
}

impl<S: EntityStore> CatalogSynchronizer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn synchronize(
        &self,
        distributor_id: DistributorId,
        entries: &[FeedEntry],
    ) -> DomainResult<SyncReport> {
        if self.store.distributor(distributor_id).is_none() {
            return Err(DomainError::NotFound);
        }

        let mut entries_applied = 0;
        for entry in entries {
            // Price sanity comes first so a bad entry writes nothing at all.
            let delivery_price = entry.delivery_price()?;

            let product = self
                .store
                .product_by_name(&entry.name)
                .unwrap_or_else(|| Product::new(&entry.name));

            let mut batch = WriteBatch::new();
            batch.push(Mutation::PutProduct(product.clone()));

            let mut rows = Vec::with_capacity(entry.parameters.len());
            for (name, value) in &entry.parameters {
                let parameter = self
                    .store
                    .parameter_by_name(name)
                    .unwrap_or_else(|| Parameter::new(name));
                batch.push(Mutation::PutParameter(parameter.clone()));
                rows.push(ProductParameter {
                    product_id: product.id,
                    distributor_id,
                    parameter_id: parameter.id,
                    value: value.clone(),
                });
            }
            batch.push(Mutation::ReplaceProductParameters {
                product_id: product.id,
                distributor_id,
                rows,
            });
            batch.push(Mutation::ReplaceOffer(ProductDistributor {
                product_id: product.id,
                distributor_id,
                price: entry.price,
                delivery_price,
                quantity: entry.quantity,
            }));

            self.store.apply(batch)?;
            debug!(product = %entry.name, %distributor_id, "feed entry applied");
            entries_applied += 1;
        }

        info!(%distributor_id, entries_applied, "price list synchronized");
        Ok(SyncReport { entries_applied })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use tradelink_auth::{UserAccount, UserKind};
    use tradelink_catalog::Distributor;
    use tradelink_core::UserId;

    use super::*;
    use crate::entity_store::InMemoryEntityStore;

    fn seed_distributor(store: &Arc<InMemoryEntityStore>, email: &str) -> Distributor {
        let account = UserAccount {
            id: UserId::new(),
            email: email.to_string(),
            password_digest: "digest".to_string(),
            username: email.to_string(),
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
        batch.push(Mutation::PutUser(account));
        batch.push(Mutation::PutDistributor(distributor.clone()));
        store.apply(batch).unwrap();
        distributor
    }

    fn widget_entry() -> FeedEntry {
        FeedEntry {
            name: "Widget".to_string(),
            price: 80,
            price_rrc: 100,
            quantity: 5,
            parameters: BTreeMap::from([("color".to_string(), "red".to_string())]),
        }
    }

    #[test]
    fn unknown_distributor_is_rejected() {
        let store = Arc::new(InMemoryEntityStore::new());
        let sync = CatalogSynchronizer::new(store);
        let err = sync
            .synchronize(DistributorId::new(), &[widget_entry()])
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    #[test]
    fn a_feed_entry_creates_product_offer_and_parameters() {
        let store = Arc::new(InMemoryEntityStore::new());
        let distributor = seed_distributor(&store, "dist@example.com");
        let sync = CatalogSynchronizer::new(store.clone());

        let report = sync.synchronize(distributor.id, &[widget_entry()]).unwrap();
        assert_eq!(report.entries_applied, 1);

        let product = store.product_by_name("Widget").unwrap();
        let offer = store.offer(product.id, distributor.id).unwrap();
        assert_eq!(offer.price, 80);
        assert_eq!(offer.delivery_price, 20);
        assert_eq!(offer.quantity, 5);

        let rows = store.product_parameters(product.id);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, "red");
    }

    #[test]
    fn resync_replaces_parameters_instead_of_accreting() {
        let store = Arc::new(InMemoryEntityStore::new());
        let distributor = seed_distributor(&store, "dist@example.com");
        let sync = CatalogSynchronizer::new(store.clone());

        sync.synchronize(distributor.id, &[widget_entry()]).unwrap();

        let mut second = widget_entry();
        second.parameters = BTreeMap::from([("weight".to_string(), "2kg".to_string())]);
        second.price = 85;
        second.price_rrc = 110;
        sync.synchronize(distributor.id, &[second]).unwrap();

        let product = store.product_by_name("Widget").unwrap();
        let rows = store.product_parameters(product.id);
        assert_eq!(rows.len(), 1);
        let weight = store.parameter(rows[0].parameter_id).unwrap();
        assert_eq!(weight.name, "weight");

        let offer = store.offer(product.id, distributor.id).unwrap();
        assert_eq!(offer.price, 85);
        assert_eq!(offer.delivery_price, 25);
    }

    #[test]
    fn a_bad_entry_aborts_but_keeps_earlier_entries() {
        let store = Arc::new(InMemoryEntityStore::new());
        let distributor = seed_distributor(&store, "dist@example.com");
        let sync = CatalogSynchronizer::new(store.clone());

        let good = widget_entry();
        let bad = FeedEntry {
            name: "Gadget".to_string(),
            price: 100,
            price_rrc: 90,
            quantity: 3,
            parameters: BTreeMap::new(),
        };
        let never = FeedEntry {
            name: "Gizmo".to_string(),
            price: 10,
            price_rrc: 15,
            quantity: 1,
            parameters: BTreeMap::new(),
        };

        let err = sync
            .synchronize(distributor.id, &[good, bad, never])
            .unwrap_err();
        assert!(matches!(err, DomainError::PriceInconsistency { .. }));

        // The entry before the failure is committed; the bad one and
        // everything after it are not.
        assert!(store.product_by_name("Widget").is_some());
        assert!(store.product_by_name("Gadget").is_none());
        assert!(store.product_by_name("Gizmo").is_none());
    }

    #[test]
    fn a_rejected_resync_leaves_the_previous_offer_intact() {
        let store = Arc::new(InMemoryEntityStore::new());
        let distributor = seed_distributor(&store, "dist@example.com");
        let sync = CatalogSynchronizer::new(store.clone());

        sync.synchronize(distributor.id, &[widget_entry()]).unwrap();

        let mut bad = widget_entry();
        bad.price_rrc = bad.price;
        assert!(sync.synchronize(distributor.id, &[bad]).is_err());

        let product = store.product_by_name("Widget").unwrap();
        let offer = store.offer(product.id, distributor.id).unwrap();
        assert_eq!(offer.price, 80);
        assert_eq!(offer.delivery_price, 20);
    }

    #[test]
    fn two_distributors_share_a_product_without_clobbering() {
        let store = Arc::new(InMemoryEntityStore::new());
        let d1 = seed_distributor(&store, "one@example.com");
        let d2 = seed_distributor(&store, "two@example.com");
        let sync = CatalogSynchronizer::new(store.clone());

        sync.synchronize(d1.id, &[widget_entry()]).unwrap();

        let mut theirs = widget_entry();
        theirs.price = 70;
        theirs.price_rrc = 95;
        theirs.parameters = BTreeMap::from([("color".to_string(), "blue".to_string())]);
        sync.synchronize(d2.id, &[theirs]).unwrap();

        let product = store.product_by_name("Widget").unwrap();
        assert_eq!(store.products().len(), 1);

        let offer1 = store.offer(product.id, d1.id).unwrap();
        let offer2 = store.offer(product.id, d2.id).unwrap();
        assert_eq!(offer1.price, 80);
        assert_eq!(offer2.price, 70);

        let mut values: Vec<_> = store
            .product_parameters(product.id)
            .into_iter()
            .map(|r| r.value)
            .collect();
        values.sort();
        assert_eq!(values, vec!["blue", "red"]);
    }
}
