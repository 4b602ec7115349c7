// src/integrations/mal/mod.rs
//
// MyAnimeList API v2: which items belong to a viewing context

pub mod client;

pub use client::{ListSource, MalClient};
