//! Infrastructure Layer - Store implementations

pub mod kv_store;
pub mod postgres;
