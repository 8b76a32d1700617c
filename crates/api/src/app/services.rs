//! Service wiring and account operations.
//!
//! Everything below the HTTP layer is synchronous; handlers call straight
//! into these services and the in-memory store.

use std::sync::Arc;

use tracing::{info, warn};

use tradelink_auth::{
    InMemoryTokenStore, InsecurePlaintextVerifier, PasswordVerifier, Principal, Registration,
    TokenStore, UserAccount, UserKind, normalize_email,
};
use tradelink_catalog::Distributor;
use tradelink_core::{AddressId, DomainError, DomainResult, UserId};
use tradelink_orders::Address;
use tradelink_infra::basket_manager::BasketManager;
use tradelink_infra::catalog_sync::CatalogSynchronizer;
use tradelink_infra::entity_store::{EntityStore, InMemoryEntityStore, Mutation, WriteBatch};
use tradelink_infra::notify::{EmailIntent, NotificationSink, TracingNotificationSink};
use tradelink_infra::order_lifecycle::OrderLifecycle;

pub struct AppServices {
    pub store: Arc<InMemoryEntityStore>,
    pub synchronizer: CatalogSynchronizer<Arc<InMemoryEntityStore>>,
    pub baskets: BasketManager<Arc<InMemoryEntityStore>>,
    pub orders: OrderLifecycle<Arc<InMemoryEntityStore>>,
    pub tokens: Arc<dyn TokenStore>,
    verifier: Arc<dyn PasswordVerifier>,
    notifier: Arc<dyn NotificationSink>,
}

pub fn build_services() -> AppServices {
    let store = Arc::new(InMemoryEntityStore::new());
    let notifier: Arc<dyn NotificationSink> = Arc::new(TracingNotificationSink);
    AppServices {
        synchronizer: CatalogSynchronizer::new(store.clone()),
        baskets: BasketManager::new(store.clone()),
        orders: OrderLifecycle::new(store.clone(), notifier.clone()),
        tokens: Arc::new(InMemoryTokenStore::new()),
        verifier: Arc::new(InsecurePlaintextVerifier),
        notifier,
        store,
    }
}

impl AppServices {
    /// Create an account from a registration, issue a bearer token, and emit
    /// a confirmation email intent.
    pub fn register_account(
        &self,
        registration: Registration,
    ) -> DomainResult<(UserAccount, String)> {
        registration.validate()?;

        let email = normalize_email(&registration.email);
        if self.store.user_by_email(&email).is_some() {
            return Err(DomainError::DuplicateAccount);
        }

        let mut batch = WriteBatch::new();
        let address_id = registration.address.map(|input| {
            let address = Address {
                id: AddressId::new(),
                city: input.city,
                street: input.street,
                building: input.building,
                office: input.office,
            };
            let id = address.id;
            batch.push(Mutation::PutAddress(address));
            id
        });

        let account = UserAccount {
            id: UserId::new(),
            email: email.clone(),
            password_digest: self.verifier.digest(&registration.password),
            username: registration.username,
            first_name: registration.first_name,
            last_name: registration.last_name,
            middle_name: registration.middle_name,
            company: registration.company,
            phone: registration.phone,
            kind: registration.kind,
            is_superuser: false,
            address_id,
        };

        batch.push(Mutation::PutUser(account.clone()));
        if account.kind == UserKind::Distributor {
            batch.push(Mutation::PutDistributor(Distributor::new(
                account.id,
                registration.accepting_orders.unwrap_or(true),
            )));
        }
        self.store.apply(batch)?;

        info!(user_id = %account.id, kind = ?account.kind, "account registered");

        if let Err(err) = self.notifier.deliver(EmailIntent {
            to: account.email.clone(),
            subject: "Registration confirmed".to_string(),
            body: format!("Welcome, {}! Your account is ready.", account.display_name()),
        }) {
            warn!(error = %err, "registration notification failed");
        }

        let token = self.issue_token(&account);
        Ok((account, token))
    }

    /// Verify credentials and issue a fresh bearer token.
    pub fn login(&self, email: &str, password: &str) -> DomainResult<(UserAccount, String)> {
        let account = self
            .store
            .user_by_email(&normalize_email(email))
            .ok_or(DomainError::Unauthorized)?;
        if !self.verifier.verify(password, &account.password_digest) {
            return Err(DomainError::Unauthorized);
        }
        let token = self.issue_token(&account);
        Ok((account, token))
    }

    /// Delete the caller's account: distributor record (with its catalog
    /// rows), the account itself, and its address when nothing else still
    /// references it. All tokens of the user are revoked.
    pub fn delete_account(&self, user_id: UserId) -> DomainResult<()> {
        let account = self.store.user(user_id).ok_or(DomainError::NotFound)?;

        let mut batch = WriteBatch::new();
        if let Some(distributor) = self.store.distributor_by_user(user_id) {
            batch.push(Mutation::DeleteDistributor(distributor.id));
        }
        batch.push(Mutation::DeleteUser(user_id));
        if let Some(address_id) = account.address_id
            && !self.store.address_referenced(address_id)
        {
            batch.push(Mutation::DeleteAddress(address_id));
        }
        self.store.apply(batch)?;

        self.tokens.revoke_user(user_id);
        info!(%user_id, "account deleted");
        Ok(())
    }

    /// Toggle the caller's accepting-orders flag. The caller must own a
    /// distributor record.
    pub fn set_distributor_status(
        &self,
        user_id: UserId,
        accepting_orders: bool,
    ) -> DomainResult<Distributor> {
        let mut distributor = self
            .store
            .distributor_by_user(user_id)
            .ok_or(DomainError::NotADistributor)?;
        distributor.accepting_orders = accepting_orders;

        let mut batch = WriteBatch::new();
        batch.push(Mutation::PutDistributor(distributor.clone()));
        self.store.apply(batch)?;

        info!(distributor_id = %distributor.id, accepting_orders, "availability updated");
        Ok(distributor)
    }

    fn issue_token(&self, account: &UserAccount) -> String {
        self.tokens.issue(Principal::new(
            account.id,
            account.kind,
            account.is_superuser,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradelink_auth::RegistrationAddress;

    fn registration(email: &str, kind: UserKind) -> Registration {
        Registration {
            email: email.to_string(),
            password: "hunter2".to_string(),
            password_repeat: "hunter2".to_string(),
            username: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            middle_name: String::new(),
            company: String::new(),
            phone: String::new(),
            kind,
            address: Some(RegistrationAddress {
                city: "SPb".to_string(),
                street: "Nevsky".to_string(),
                building: "1".to_string(),
                office: "2".to_string(),
            }),
            accepting_orders: None,
        }
    }

    #[test]
    fn registration_stores_the_supplied_address() {
        let services = build_services();
        let (account, _) = services
            .register_account(registration("buyer@example.com", UserKind::Customer))
            .unwrap();

        let address_id = account.address_id.unwrap();
        let address = services.store.address(address_id).unwrap();
        assert_eq!(address.city, "SPb");
        assert_eq!(
            services.store.user(account.id).unwrap().address_id,
            Some(address_id)
        );
    }

    #[test]
    fn registration_without_an_address_is_fine() {
        let services = build_services();
        let mut reg = registration("buyer@example.com", UserKind::Customer);
        reg.address = None;
        let (account, _) = services.register_account(reg).unwrap();
        assert_eq!(account.address_id, None);
    }

    #[test]
    fn delete_account_removes_the_registration_address() {
        let services = build_services();
        let (account, _) = services
            .register_account(registration("buyer@example.com", UserKind::Customer))
            .unwrap();
        let address_id = account.address_id.unwrap();

        services.delete_account(account.id).unwrap();

        assert!(services.store.user(account.id).is_none());
        assert!(services.store.address(address_id).is_none());
    }

    #[test]
    fn distributor_registration_honors_initial_availability() {
        let services = build_services();
        let mut reg = registration("dist@example.com", UserKind::Distributor);
        reg.accepting_orders = Some(false);
        let (account, _) = services.register_account(reg).unwrap();

        let distributor = services.store.distributor_by_user(account.id).unwrap();
        assert!(!distributor.accepting_orders);
    }
}
