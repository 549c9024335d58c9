//! Credential checks and password hashing shared by the auth backends.
//!
//! A stored password is `HMAC-SHA256(secret, "<salt_hex>:<password>")`,
//! hex-encoded, with a fresh 16-byte salt per account.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use super::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

const SALT_LEN: usize = 16;

/// Lower-case and trim an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check sign-up input: a plausible email and a long enough password.
pub fn check_new_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    let email = email.trim();
    let plausible = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !plausible || email.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidEmail(email.to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

/// A salted password hash, both parts hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub salt: String,
    pub hash: String,
}

/// Hashes and verifies passwords with a server-side secret.
#[derive(Clone)]
pub struct PasswordHasher {
    secret: Vec<u8>,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl PasswordHasher {
    pub fn new(secret: Vec<u8>) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        Ok(Self { secret })
    }

    /// Build a hasher from a hex-encoded secret.
    pub fn from_hex(secret_hex: &str) -> Result<Self, AuthError> {
        let secret = hex::decode(secret_hex.trim())
            .map_err(|e| AuthError::InvalidSecret(e.to_string()))?;
        Self::new(secret)
    }

    /// Hash `password` under a new random salt.
    pub fn hash(&self, password: &str) -> PasswordHash {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill(&mut salt);
        let salt = hex::encode(salt);
        let hash = hex::encode(self.mac(&salt, password).finalize().into_bytes());
        PasswordHash { salt, hash }
    }

    /// Constant-time check of `password` against a stored hash.
    pub fn verify(&self, password: &str, stored: &PasswordHash) -> bool {
        let Ok(expected) = hex::decode(&stored.hash) else {
            return false;
        };
        self.mac(&stored.salt, password)
            .verify_slice(&expected)
            .is_ok()
    }

    fn mac(&self, salt_hex: &str, password: &str) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size");
        mac.update(salt_hex.as_bytes());
        mac.update(b":");
        mac.update(password.as_bytes());
        mac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(b"test-secret-for-stayfit".to_vec()).unwrap()
    }

    #[test]
    fn hash_and_verify() {
        let h = hasher();
        let stored = h.hash("hunter22");
        assert_eq!(stored.salt.len(), SALT_LEN * 2);
        assert_eq!(stored.hash.len(), 64, "HMAC-SHA256 hex should be 64 chars");
        assert!(h.verify("hunter22", &stored));
        assert!(!h.verify("hunter23", &stored));
    }

    #[test]
    fn salts_differ_per_hash() {
        let h = hasher();
        let a = h.hash("same-password");
        let b = h.hash("same-password");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn different_secret_does_not_verify() {
        let stored = hasher().hash("hunter22");
        let other = PasswordHasher::new(b"another-secret".to_vec()).unwrap();
        assert!(!other.verify("hunter22", &stored));
    }

    #[test]
    fn corrupt_hash_does_not_verify() {
        let h = hasher();
        let mut stored = h.hash("hunter22");
        stored.hash = "zz".to_string();
        assert!(!h.verify("hunter22", &stored));
    }

    #[test]
    fn secret_must_be_present_and_hex() {
        assert!(matches!(
            PasswordHasher::new(Vec::new()),
            Err(AuthError::MissingSecret)
        ));
        assert!(matches!(
            PasswordHasher::from_hex("not-hex"),
            Err(AuthError::InvalidSecret(_))
        ));
        assert!(PasswordHasher::from_hex(&"ab".repeat(32)).is_ok());
    }

    #[test]
    fn credential_checks() {
        assert!(check_new_credentials("a@b.co", "123456").is_ok());
        assert!(matches!(
            check_new_credentials("a@b.co", "12345"),
            Err(AuthError::WeakPassword)
        ));
        for bad in ["", "ab.co", "@b.co", "a@", "a b@c.d"] {
            assert!(
                matches!(
                    check_new_credentials(bad, "123456"),
                    Err(AuthError::InvalidEmail(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let rendered = format!("{:?}", hasher());
        assert!(rendered.contains("<redacted>"), "{rendered}");
        assert!(!rendered.contains("test-secret"), "{rendered}");
        assert!(!rendered.contains(&hex::encode(b"test-secret")), "{rendered}");
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }
}
