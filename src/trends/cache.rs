// src/trends/cache.rs
//! Process-local cache of the last non-empty trend list.

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::Duration;

use crate::trends::types::TrendItem;

#[derive(Debug, Clone, PartialEq)]
pub struct TrendSnapshot {
    pub items: Vec<TrendItem>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct TrendCache {
    ttl: Duration,
    slot: Mutex<Option<TrendSnapshot>>,
}

impl TrendCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Snapshot if it is younger than the TTL at `now`.
    pub fn get_fresh(&self, now: DateTime<Utc>) -> Option<TrendSnapshot> {
        let g = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        let snap = g.as_ref()?;
        let age = now.signed_duration_since(snap.fetched_at);
        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::days(36_500));
        (age >= chrono::Duration::zero() && age < ttl).then(|| snap.clone())
    }

    /// Last snapshot regardless of age (rank lookups after the TTL ran out).
    pub fn last(&self) -> Option<TrendSnapshot> {
        self.slot.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Empty lists are not stored; the next request fetches again.
    pub fn store(&self, snap: TrendSnapshot) {
        if snap.items.is_empty() {
            return;
        }
        *self.slot.lock().unwrap_or_else(|p| p.into_inner()) = Some(snap);
    }

    pub fn invalidate(&self) {
        *self.slot.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }
}
