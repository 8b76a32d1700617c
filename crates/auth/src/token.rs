//! Bearer-token resolution seam.
//!
//! Token issuance is not a domain concern; the transport layer needs only a
//! way to turn an opaque bearer token into a [`Principal`]. The in-memory
//! implementation backs dev and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use tradelink_core::UserId;

use crate::principal::Principal;

/// Maps opaque bearer tokens to authenticated principals.
pub trait TokenStore: Send + Sync {
    /// Issue a fresh token for a principal.
    fn issue(&self, principal: Principal) -> String;

    /// Resolve a presented token, if it is known.
    fn resolve(&self, token: &str) -> Option<Principal>;

    /// Revoke every token belonging to a user (account deletion).
    fn revoke_user(&self, user_id: UserId);
}

/// In-memory token registry for dev/tests.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    inner: RwLock<HashMap<String, Principal>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn issue(&self, principal: Principal) -> String {
        let token = Uuid::now_v7().simple().to_string();
        if let Ok(mut map) = self.inner.write() {
            map.insert(token.clone(), principal);
        }
        token
    }

    fn resolve(&self, token: &str) -> Option<Principal> {
        let map = self.inner.read().ok()?;
        map.get(token).copied()
    }

    fn revoke_user(&self, user_id: UserId) {
        if let Ok(mut map) = self.inner.write() {
            map.retain(|_, p| p.user_id != user_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::UserKind;

    #[test]
    fn issued_token_resolves_to_the_same_principal() {
        let store = InMemoryTokenStore::new();
        let principal = Principal::new(UserId::new(), UserKind::Customer, false);
        let token = store.issue(principal);
        assert_eq!(store.resolve(&token), Some(principal));
    }

    #[test]
    fn unknown_token_does_not_resolve() {
        let store = InMemoryTokenStore::new();
        assert_eq!(store.resolve("bogus"), None);
    }

    #[test]
    fn revoke_user_drops_all_their_tokens() {
        let store = InMemoryTokenStore::new();
        let user = UserId::new();
        let principal = Principal::new(user, UserKind::Distributor, false);
        let t1 = store.issue(principal);
        let t2 = store.issue(principal);
        store.revoke_user(user);
        assert_eq!(store.resolve(&t1), None);
        assert_eq!(store.resolve(&t2), None);
    }
}
