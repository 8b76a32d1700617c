//! User accounts and registration validation.

use serde::{Deserialize, Serialize};

use tradelink_core::{AddressId, DomainError, DomainResult, UserId};

/// Account kind: an ordering customer or a catalog-publishing distributor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    Customer,
    Distributor,
}

/// A registered user account.
///
/// `password_digest` is opaque to the domain: hashing lives behind
/// [`PasswordVerifier`] and is supplied by the application layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub password_digest: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub company: String,
    pub phone: String,
    pub kind: UserKind,
    pub is_superuser: bool,
    pub address_id: Option<AddressId>,
}

impl UserAccount {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Address fields captured at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistrationAddress {
    pub city: String,
    pub street: String,
    pub building: String,
    #[serde(default)]
    pub office: String,
}

/// Registration input, validated before an account is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub password_repeat: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub phone: String,
    pub kind: UserKind,
    /// Optional home/delivery address stored alongside the account.
    #[serde(default)]
    pub address: Option<RegistrationAddress>,
    /// Distributor accounts only: initial accepting-orders flag
    /// (defaults to accepting).
    #[serde(default)]
    pub accepting_orders: Option<bool>,
}

impl Registration {
    /// Deterministic pre-persistence checks.
    ///
    /// Email uniqueness is the store's concern; this validates only what can
    /// be decided from the input alone.
    pub fn validate(&self) -> DomainResult<()> {
        if self.email.trim().is_empty() {
            return Err(DomainError::validation("email must be set"));
        }
        if !self.email.contains('@') {
            return Err(DomainError::validation("email is malformed"));
        }
        if self.password != self.password_repeat {
            return Err(DomainError::PasswordMismatch);
        }
        if self.password.is_empty() {
            return Err(DomainError::validation("password must not be empty"));
        }
        Ok(())
    }
}

/// Normalize an email for identity comparison: trim, lowercase the domain part.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Password digest/verify seam.
///
/// Real hashing is an application concern; the domain treats digests as
/// opaque strings.
pub trait PasswordVerifier: Send + Sync {
    fn digest(&self, password: &str) -> String;
    fn verify(&self, password: &str, digest: &str) -> bool;
}

/// Development-only verifier that stores passwords verbatim.
///
/// Never use outside tests/dev; the application should plug in a real hasher.
#[derive(Debug, Default)]
pub struct InsecurePlaintextVerifier;

impl PasswordVerifier for InsecurePlaintextVerifier {
    fn digest(&self, password: &str) -> String {
        password.to_string()
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        password == digest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            email: "buyer@example.com".to_string(),
            password: "hunter2".to_string(),
            password_repeat: "hunter2".to_string(),
            username: "buyer".to_string(),
            first_name: "Ivan".to_string(),
            last_name: "Petrov".to_string(),
            middle_name: String::new(),
            company: String::new(),
            phone: "+7-900-000-00-00".to_string(),
            kind: UserKind::Customer,
            address: None,
            accepting_orders: None,
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn mismatched_passwords_are_rejected() {
        let mut reg = registration();
        reg.password_repeat = "hunter3".to_string();
        assert_eq!(reg.validate().unwrap_err(), DomainError::PasswordMismatch);
    }

    #[test]
    fn empty_email_is_rejected() {
        let mut reg = registration();
        reg.email = "  ".to_string();
        assert!(matches!(
            reg.validate().unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn normalize_lowercases_domain_only() {
        assert_eq!(
            normalize_email("  Buyer@EXAMPLE.Com "),
            "Buyer@example.com"
        );
    }
}
