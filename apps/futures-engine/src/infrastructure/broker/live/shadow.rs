//! Local shadow of remote bracket ids.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::infrastructure::broker::brokerage::BracketIds;

/// Maps an order's decision timestamp to the remote ids of its bracket.
///
/// Owned by one live adapter; entries are added on placement and removed
/// once the order is terminal.
#[derive(Debug, Default)]
pub struct ShadowBook {
    entries: Mutex<HashMap<DateTime<Utc>, BracketIds>>,
}

impl ShadowBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the bracket for an order, replacing any previous entry.
    pub fn insert(&self, order_timestamp: DateTime<Utc>, ids: BracketIds) {
        self.lock().insert(order_timestamp, ids);
    }

    /// Bracket ids for an order.
    #[must_use]
    pub fn get(&self, order_timestamp: DateTime<Utc>) -> Option<BracketIds> {
        self.lock().get(&order_timestamp).copied()
    }

    /// Forget an order.
    pub fn remove(&self, order_timestamp: DateTime<Utc>) -> Option<BracketIds> {
        self.lock().remove(&order_timestamp)
    }

    /// Number of tracked orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no orders are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // The map stays consistent across a panic in another holder, so a
    // poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<DateTime<Utc>, BracketIds>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn insert_get_remove() {
        let book = ShadowBook::new();
        let ts = Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap();
        let ids = BracketIds {
            main: 1,
            profit: 2,
            stop: 3,
        };

        assert!(book.get(ts).is_none());
        book.insert(ts, ids);
        assert_eq!(book.get(ts), Some(ids));
        assert_eq!(book.len(), 1);
        assert_eq!(book.remove(ts), Some(ids));
        assert!(book.is_empty());
    }
}
