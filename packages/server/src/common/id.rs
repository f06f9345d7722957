//! Human-readable application identifiers.
//!
//! Registrations are keyed by a short, human-readable id (e.g. `AM26-4F09A1`)
//! rather than a raw UUID, because registrants quote it over phone and email
//! when chasing up their payment. The store assigns the id at row-creation
//! time; it is immutable afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix for the current event edition.
const ID_PREFIX: &str = "AM26";

/// A registration's unique, human-readable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Generate a fresh id. Uniqueness is enforced by the store's unique
    /// constraint; the 6 hex chars of entropy make collisions rare enough
    /// that insert-retry is not worth modeling.
    pub fn generate() -> Self {
        let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
        Self(format!("{}-{}", ID_PREFIX, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ApplicationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ApplicationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_the_event_prefix() {
        let id = ApplicationId::generate();
        assert!(id.as_str().starts_with("AM26-"));
        assert_eq!(id.as_str().len(), "AM26-".len() + 6);
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(ApplicationId::generate(), ApplicationId::generate());
    }
}
