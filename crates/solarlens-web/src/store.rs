// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of SolarLens.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Pending analysis runs waiting for their dashboard view.
//!
//! Each upload stores one entry under a fresh id. Viewing the dashboard
//! takes the entry out again, so every run is rendered at most once.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug)]
struct Entries<T> {
    by_id: HashMap<Uuid, T>,
    order: VecDeque<Uuid>,
}

/// Bounded key-value store of unconsumed runs
#[derive(Debug)]
pub struct ResultStore<T> {
    entries: Mutex<Entries<T>>,
    capacity: usize,
}

impl<T> ResultStore<T> {
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Entries {
                by_id: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
        }
    }

    /// Store `value` under a new id, evicting the oldest runs beyond capacity
    pub fn insert(&self, value: T) -> Uuid {
        let id = Uuid::new_v4();
        let mut entries = self.entries.lock();
        entries.by_id.insert(id, value);
        entries.order.push_back(id);

        while entries.by_id.len() > self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            if entries.by_id.remove(&oldest).is_some() {
                debug!(run = %oldest, "Evicted unviewed run");
            }
        }
        id
    }

    /// Remove and return the run stored under `id`
    pub fn take(&self, id: &Uuid) -> Option<T> {
        let mut entries = self.entries.lock();
        let value = entries.by_id.remove(id)?;
        entries.order.retain(|queued| queued != id);
        Some(value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
