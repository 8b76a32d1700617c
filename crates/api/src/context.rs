use tradelink_auth::Principal;
use tradelink_core::UserId;

/// Authenticated identity for a request, resolved from the bearer token.
///
/// Present on every protected route; public routes never see one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn principal(&self) -> Principal {
        self.principal
    }

    pub fn is_distributor(&self) -> bool {
        self.principal.is_distributor()
    }

    pub fn is_superuser(&self) -> bool {
        self.principal.is_superuser
    }
}
