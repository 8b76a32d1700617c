use serde::{Deserialize, Serialize};

use tradelink_core::UserId;

use crate::user::UserKind;

/// Identity of an authenticated principal, as resolved by the transport layer.
///
/// The domain never performs password checks itself; it only consumes this
/// already-authenticated identity and enforces kind-based rules (e.g. only a
/// distributor may push a price list).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub kind: UserKind,
    pub is_superuser: bool,
}

impl Principal {
    pub fn new(user_id: UserId, kind: UserKind, is_superuser: bool) -> Self {
        Self {
            user_id,
            kind,
            is_superuser,
        }
    }

    pub fn is_distributor(&self) -> bool {
        self.kind == UserKind::Distributor
    }
}
