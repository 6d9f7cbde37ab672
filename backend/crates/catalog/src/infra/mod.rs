//! Infrastructure Layer - Repository and fetcher implementations

pub mod http;
pub mod memory;
pub mod postgres;
