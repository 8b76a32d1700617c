//! `tradelink-auth` — user accounts, authenticated principals and token plumbing.
//!
//! Password *hashing* and token *issuance* mechanics are intentionally thin
//! interfaces here; the domain only ever consumes a resolved [`Principal`].

pub mod principal;
pub mod token;
pub mod user;

pub use principal::Principal;
pub use token::{InMemoryTokenStore, TokenStore};
pub use user::{
    InsecurePlaintextVerifier, PasswordVerifier, Registration, RegistrationAddress, UserAccount,
    UserKind, normalize_email,
};
