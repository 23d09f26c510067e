//! In-memory registry of orders awaiting a decision.
//!
//! The registry is the single source of truth for "pending". It is volatile:
//! a restart drops every entry. `remove` is the linearization point of a
//! decision, so every operation runs under one mutex and never across an
//! `.await`.
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::types::PendingOrder;

#[derive(Debug, Default)]
struct Inner {
    next_seq: u64,
    // order id -> (insertion sequence, record)
    entries: HashMap<String, (u64, PendingOrder)>,
}

/// Cheap to clone; every clone shares the same map.
#[derive(Debug, Clone, Default)]
pub struct OrderRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl OrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // entries are plain data, a panicked holder cannot leave them half written
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Upsert. A same-keyed entry is replaced and keeps its listing position.
    /// Returns the replaced record, if any.
    pub fn put(&self, order: PendingOrder) -> Option<PendingOrder> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if let Some((_, existing)) = inner.entries.get_mut(&order.order_id) {
            return Some(std::mem::replace(existing, order));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(order.order_id.clone(), (seq, order));
        None
    }

    pub fn get(&self, order_id: &str) -> Option<PendingOrder> {
        self.lock().entries.get(order_id).map(|(_, order)| order.clone())
    }

    /// Atomic removal. Exactly one caller observes `Some` for a given entry.
    pub fn remove(&self, order_id: &str) -> Option<PendingOrder> {
        self.lock().entries.remove(order_id).map(|(_, order)| order)
    }

    /// Snapshot in insertion order, oldest first.
    pub fn list_all(&self) -> Vec<(String, PendingOrder)> {
        let inner = self.lock();
        let mut entries: Vec<_> = inner.entries.values().collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries
            .into_iter()
            .map(|(_, order)| (order.order_id.clone(), order.clone()))
            .collect()
    }

    pub fn size(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}
