// src/domain/genre_connection.rs
//
// Derived co-occurrence data. A connection belongs to exactly one context
// and is only ever replaced as part of a whole-context snapshot.

use serde::{Deserialize, Serialize};

/// Unordered pair of distinct genre IDs, stored as (smaller, larger)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenrePair {
    pub genre_a: i64,
    pub genre_b: i64,
}

impl GenrePair {
    /// Returns `None` for a self-pair
    pub fn new(x: i64, y: i64) -> Option<Self> {
        if x == y {
            return None;
        }
        Some(Self {
            genre_a: x.min(y),
            genre_b: x.max(y),
        })
    }
}

/// Co-occurrence count for one pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreConnection {
    pub pair: GenrePair,
    pub count: i64,
}

/// Read model for the presentation layer: genre names plus the count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreLink {
    pub source: String,
    pub target: String,
    pub value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_ordered() {
        assert_eq!(GenrePair::new(8, 1), GenrePair::new(1, 8));
        let pair = GenrePair::new(8, 1).unwrap();
        assert_eq!((pair.genre_a, pair.genre_b), (1, 8));
    }

    #[test]
    fn test_self_pair_rejected() {
        assert!(GenrePair::new(4, 4).is_none());
    }
}
