//! Access Control Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Rate-limit records, decisions, repository traits
//! - `application/` - Login, token issuance and rate-limit use cases
//! - `infra/` - Key-value backed repository and the PostgreSQL KV store
//! - `presentation/` - HTTP handlers and request gates
//!
//! ## Security Model
//! - Tokens are stateless: `nonce:timestamp:hmac`, valid until they age out
//! - A login token is the same format as a CSRF token and is presented as
//!   `Authorization: Bearer`; it is never stored server-side
//! - Failed logins are counted per client fingerprint with progressive lockout
//! - A failing store rejects the request, it never grants access

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AccessConfig;
pub use application::rate_limit::RateLimiter;
pub use domain::repository::RateLimitRepository;
pub use domain::value_objects::{BearerCredential, RateLimitDecision};
pub use error::{AccessError, AccessResult};
pub use infra::kv_store::KvRateLimitRepository;
pub use infra::postgres::PgKvStore;
pub use presentation::handlers::AccessAppState;
pub use presentation::router::{access_router, guard_all, guard_mutations};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
