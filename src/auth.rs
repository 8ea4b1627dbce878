//! Credential checks for administrative routes

use sha2::{Digest, Sha256};

/// Decides whether a caller-provided secret grants admin access
pub trait Authenticator: Send + Sync {
    fn check(&self, provided: &str) -> bool;
}

/// Accepts exactly one shared secret.
///
/// Secrets are compared by SHA-256 digest so the comparison always covers
/// the same number of bytes regardless of the input.
pub struct StaticSecretAuthenticator {
    digest: [u8; 32],
}

impl StaticSecretAuthenticator {
    pub fn new(secret: &str) -> Self {
        Self {
            digest: Sha256::digest(secret.as_bytes()).into(),
        }
    }
}

impl Authenticator for StaticSecretAuthenticator {
    fn check(&self, provided: &str) -> bool {
        let provided: [u8; 32] = Sha256::digest(provided.as_bytes()).into();
        provided
            .iter()
            .zip(self.digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}
