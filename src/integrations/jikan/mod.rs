// src/integrations/jikan/mod.rs
//
// Jikan: per-item metadata (details, characters, staff)

pub mod client;
pub mod mapper;
pub mod types;

pub use client::{CatalogSource, JikanClient};
pub use mapper::normalize;
