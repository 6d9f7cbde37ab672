//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.

pub mod config;
pub mod export;
pub mod health;
pub mod images;
pub mod open_graph;
pub mod videos;
pub mod youtubers;
