//! Route-boundary authorization guards.
//!
//! Kind checks happen here, before a handler touches any service, so the
//! domain layer only ever sees already-authorized principals.

use axum::http::StatusCode;

use crate::app::errors;
use crate::context::PrincipalContext;

/// Only distributor-kind accounts may pass (price-list upload, availability
/// toggle).
pub fn require_distributor(
    principal: &PrincipalContext,
) -> Result<(), axum::response::Response> {
    if principal.is_distributor() {
        Ok(())
    } else {
        Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "not_a_distributor",
            "only distributors can perform this operation",
        ))
    }
}
