//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business/domain failures. Infrastructure
/// concerns (locks, I/O) belong elsewhere. Each variant carries enough
/// structured detail to render a precise message to the caller; none of these
/// are retried automatically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A feed entry carried `price_rrc <= price`; the delivery margin would be
    /// zero or negative.
    #[error("price inconsistency: recommended price {recommended} must exceed price {price}")]
    PriceInconsistency { price: u64, recommended: u64 },

    /// No price/stock record exists for the requested product + distributor pair.
    #[error("product is not offered by this distributor")]
    NotOffered,

    /// The referenced user is not a distributor account.
    #[error("only distributors can perform this operation")]
    NotADistributor,

    /// The distributor is currently not accepting orders.
    #[error("distributor is not accepting orders")]
    DistributorUnavailable,

    /// Requested quantity exceeds the distributor's stock ceiling.
    #[error("requested quantity exceeds the available limit of {limit}")]
    QuantityExceeded { limit: u32 },

    /// The referenced basket does not exist.
    #[error("basket not found")]
    BasketNotFound,

    /// Registration attempted with an email that already has an account.
    #[error("an account with this email already exists")]
    DuplicateAccount,

    /// Registration password and its repeat did not match.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. a referential-integrity violation in a write
    /// batch).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Authorization failure at the domain boundary.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
