//! Password Hashing and Verification
//!
//! PBKDF2-HMAC-SHA256 password handling:
//! - 16-byte random salt, 100 000 iterations, 32-byte derived key
//! - Stored form is `base64(salt || key)`
//! - Constant-time comparison of the derived key
//! - Zeroization of clear text passwords
//!
//! Hashing is CPU-bound; async callers should run it on a blocking thread.

use std::fmt;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::{constant_time_eq, from_base64, random_bytes, to_base64};

// ============================================================================
// Constants
// ============================================================================

/// PBKDF2 iteration count
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length in bytes
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes
pub const KEY_LEN: usize = 32;

/// Minimum length recommended for the admin password
pub const MIN_PASSWORD_LENGTH: usize = 12;

// ============================================================================
// Error Types
// ============================================================================

/// Password strength violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must contain a lowercase letter")]
    MissingLowercase,

    #[error("Password must contain an uppercase letter")]
    MissingUppercase,

    #[error("Password must contain a digit")]
    MissingDigit,

    #[error("Password must contain a special character")]
    MissingSpecial,
}

/// Password hash format errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Hash / Verify
// ============================================================================

fn derive_key(password: &[u8], salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, &mut key[..]);
    key
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> String {
    let salt = random_bytes(SALT_LEN);
    hash_password_with_salt(password, &salt)
}

fn hash_password_with_salt(password: &str, salt: &[u8]) -> String {
    let key = derive_key(password.as_bytes(), salt);
    let mut combined = Vec::with_capacity(salt.len() + KEY_LEN);
    combined.extend_from_slice(salt);
    combined.extend_from_slice(&key[..]);
    to_base64(&combined)
}

/// Verify a password against a stored `base64(salt || key)` value
///
/// Undecodable or too-short stored values verify as `false`.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let Ok(combined) = from_base64(encoded) else {
        return false;
    };
    if combined.len() <= SALT_LEN {
        return false;
    }

    let (salt, stored_key) = combined.split_at(SALT_LEN);
    let derived = derive_key(password.as_bytes(), salt);
    constant_time_eq(&derived[..], stored_key)
}

/// Check admin password strength
///
/// Returns every violated rule, not just the first.
pub fn validate_password_strength(password: &str) -> Result<(), Vec<PasswordPolicyError>> {
    let mut errors = Vec::new();

    let char_count = password.chars().count();
    if char_count < MIN_PASSWORD_LENGTH {
        errors.push(PasswordPolicyError::TooShort {
            min: MIN_PASSWORD_LENGTH,
            actual: char_count,
        });
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        errors.push(PasswordPolicyError::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        errors.push(PasswordPolicyError::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(PasswordPolicyError::MissingDigit);
    }
    if !password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
    {
        errors.push(PasswordPolicyError::MissingSpecial);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Not `Clone`, and `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    pub fn new(raw: String) -> Self {
        Self(raw)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn hash(&self) -> HashedPassword {
        HashedPassword {
            encoded: hash_password(&self.0),
        }
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Stored admin password hash, validated on construction
///
/// ## Examples
/// ```rust
/// use platform::password::{ClearTextPassword, HashedPassword};
///
/// let password = ClearTextPassword::new("Correct#Horse9".to_string());
/// let hashed = password.hash();
///
/// let restored = HashedPassword::from_encoded(hashed.as_encoded()).unwrap();
/// assert!(restored.verify(&password));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    encoded: String,
}

impl HashedPassword {
    /// Parse a stored value (e.g., from `ADMIN_PASSWORD_HASH`)
    pub fn from_encoded(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let encoded = s.into().trim().to_string();
        let decoded = from_base64(&encoded).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        if decoded.len() <= SALT_LEN {
            return Err(PasswordHashError::InvalidHashFormat);
        }
        Ok(Self { encoded })
    }

    pub fn as_encoded(&self) -> &str {
        &self.encoded
    }

    pub fn verify(&self, password: &ClearTextPassword) -> bool {
        verify_password(password.expose(), &self.encoded)
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("encoded", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
