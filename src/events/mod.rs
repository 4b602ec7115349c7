// src/events/mod.rs
//
// Internal Event System - Public API

pub mod bus;
pub mod types;

pub use bus::{EventBus, EventLogEntry};
pub use types::{CatalogItemSynced, CatalogItemSyncFailed, ContextUpdated, DomainEvent};
