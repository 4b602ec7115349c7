// events/types.rs
//
// Domain events emitted by the sync pipeline.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events carry only the data needed to react

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ViewingContext;
use crate::error::ErrorCategory;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

macro_rules! impl_domain_event {
    ($event:ident) => {
        impl DomainEvent for $event {
            fn event_id(&self) -> Uuid {
                self.event_id
            }
            fn occurred_at(&self) -> DateTime<Utc> {
                self.occurred_at
            }
            fn event_type(&self) -> &'static str {
                stringify!($event)
            }
        }
    };
}

/// An item and all of its relations were written to the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItemSynced {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub item_id: i64,
    pub title: String,
    pub genre_count: usize,
}

impl CatalogItemSynced {
    pub fn new(item_id: i64, title: String, genre_count: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            item_id,
            title,
            genre_count,
        }
    }
}

impl_domain_event!(CatalogItemSynced);

/// Fetching, validating or writing one item failed; the batch moved on
#[derive(Debug, Clone, Serialize)]
pub struct CatalogItemSyncFailed {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub item_id: i64,
    pub category: ErrorCategory,
    pub message: String,
}

impl CatalogItemSyncFailed {
    pub fn new(item_id: i64, category: ErrorCategory, message: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            item_id,
            category,
            message,
        }
    }
}

impl_domain_event!(CatalogItemSyncFailed);

/// A context's member set and genre graph were replaced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextUpdated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    /// Context key ("global", "user:<name>")
    pub context: String,
    pub listed: usize,
    pub synced: usize,
    pub failed: usize,
    pub connection_count: usize,
}

impl ContextUpdated {
    pub fn new(
        context: &ViewingContext,
        listed: usize,
        synced: usize,
        failed: usize,
        connection_count: usize,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            context: context.key(),
            listed,
            synced,
            failed,
            connection_count,
        }
    }
}

impl_domain_event!(ContextUpdated);
