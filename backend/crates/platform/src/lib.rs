//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, HMAC, Base64)
//! - CSRF token issuance and verification
//! - Password hashing (PBKDF2-HMAC-SHA256)
//! - Client fingerprinting
//! - Key-value and blob store abstractions with in-memory implementations
//! - Rate limiting configuration and lockout schedule

pub mod blob;
pub mod client;
pub mod clock;
pub mod crypto;
pub mod csrf;
pub mod kv;
pub mod password;
pub mod rate_limit;
