//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.

pub mod config;
pub mod issue_csrf;
pub mod login;
pub mod rate_limit;
