use crate::error::AppError;
use bcrypt::{hash, verify};

/// Hashes and verifies user passwords with bcrypt.
///
/// The work factor is fixed at construction; production uses `bcrypt::DEFAULT_COST`,
/// tests use the minimum of 4 to stay fast.
#[derive(Debug, Clone, Copy)]
pub struct CredentialStore {
    cost: u32,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl CredentialStore {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Produces a salted one-way digest of `password`.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        Ok(hash(password, self.cost)?)
    }

    /// Checks `password` against `digest`. A malformed digest counts as a mismatch.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        match verify(password, digest) {
            Ok(matches) => matches,
            Err(e) => {
                log::warn!("rejecting password check against malformed digest: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let store = CredentialStore::new(4);
        let password = "test_password123";
        let hashed = store.hash(password).unwrap();

        assert!(store.verify(password, &hashed));
        assert!(!store.verify("wrong_password", &hashed));
    }

    #[test]
    fn test_hashes_are_salted() {
        let store = CredentialStore::new(4);
        let first = store.hash("same").unwrap();
        let second = store.hash("same").unwrap();

        assert_ne!(first, second);
        assert!(store.verify("same", &first));
        assert!(store.verify("same", &second));
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        let store = CredentialStore::new(4);
        assert!(!store.verify("test_password123", "invalidhashformat"));
        assert!(!store.verify("test_password123", ""));
    }
}
