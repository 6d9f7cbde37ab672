//! Presentation Layer
//!
//! HTTP handlers, routers and DTOs for the catalog API.

pub mod dto;
pub mod form;
pub mod handlers;
pub mod router;
