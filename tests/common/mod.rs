#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use nestegg::storage::{Clock, IdSource, Storage};
use nestegg::store::Store;

/// Deterministic ids: `id-1`, `id-2`, ...
pub struct SeqIds {
    next: Cell<u32>,
}

impl SeqIds {
    pub fn new() -> Self {
        Self { next: Cell::new(1) }
    }
}

impl IdSource for SeqIds {
    fn next_id(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("id-{n}")
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Map-backed storage whose contents stay visible to the test after the
/// store takes ownership, so persisted blobs can be inspected and a second
/// store can be opened over the same data.
#[derive(Clone, Default)]
pub struct SharedStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl SharedStorage {
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn seed(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl Storage for SharedStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

pub fn open_store(storage: SharedStorage) -> Store {
    Store::open(
        Box::new(storage),
        Box::new(SeqIds::new()),
        Box::new(FixedClock(test_time())),
    )
    .expect("store opens")
}

pub fn test_store() -> Store {
    open_store(SharedStorage::default())
}
