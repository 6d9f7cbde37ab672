//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (RateLimitRecord)
//! - Domain value objects (RateLimitDecision, BearerCredential)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod value_objects;
