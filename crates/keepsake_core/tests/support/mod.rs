#![allow(dead_code)]

use keepsake_core::{
    seed_memories, BlobBucket, MemoryRow, MemoryTable, NewMemoryRow, RemoteError, RemoteResult,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

pub const CDN: &str = "https://cdn.test/memories";

/// In-memory table with failure switches and call counters.
#[derive(Default)]
pub struct FakeTable {
    rows: RefCell<Vec<MemoryRow>>,
    pub fail_select: Cell<bool>,
    pub fail_insert: Cell<bool>,
    pub select_calls: Cell<usize>,
    pub insert_calls: Cell<usize>,
}

impl FakeTable {
    pub fn seeded() -> Self {
        let table = Self::default();
        *table.rows.borrow_mut() = seed_memories()
            .into_iter()
            .map(|entry| MemoryRow {
                id: entry.id.0,
                title: entry.title,
                date: entry.date.format("%Y-%m-%d").to_string(),
                description: entry.description,
                image_url: entry.image_url,
            })
            .collect();
        table
    }

    pub fn row_count(&self) -> usize {
        self.rows.borrow().len()
    }
}

impl MemoryTable for FakeTable {
    fn select_ordered_by_date(&self) -> RemoteResult<Vec<MemoryRow>> {
        self.select_calls.set(self.select_calls.get() + 1);
        if self.fail_select.get() {
            return Err(RemoteError::Http {
                status: 503,
                message: "table unavailable".to_string(),
            });
        }
        let mut rows = self.rows.borrow().clone();
        rows.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(rows)
    }

    fn insert(&self, row: &NewMemoryRow) -> RemoteResult<()> {
        self.insert_calls.set(self.insert_calls.get() + 1);
        if self.fail_insert.get() {
            return Err(RemoteError::Http {
                status: 500,
                message: "insert rejected".to_string(),
            });
        }
        let mut rows = self.rows.borrow_mut();
        let id = rows.iter().map(|row| row.id).max().unwrap_or(0) + 1;
        rows.push(MemoryRow {
            id,
            title: row.title.clone(),
            date: row.date.clone(),
            description: row.description.clone(),
            image_url: row.image_url.clone(),
        });
        Ok(())
    }
}

/// In-memory bucket with a failure switch and call counter.
#[derive(Default)]
pub struct FakeBucket {
    objects: RefCell<BTreeMap<String, Vec<u8>>>,
    pub fail_upload: Cell<bool>,
    pub upload_calls: Cell<usize>,
}

impl FakeBucket {
    pub fn keys(&self) -> Vec<String> {
        self.objects.borrow().keys().cloned().collect()
    }

    /// Resolves a public URL back to the stored bytes.
    pub fn resolve(&self, url: &str) -> Option<Vec<u8>> {
        let key = url.strip_prefix(CDN)?.strip_prefix('/')?;
        self.objects.borrow().get(key).cloned()
    }
}

impl BlobBucket for FakeBucket {
    fn upload(&self, key: &str, bytes: &[u8], _content_type: &str) -> RemoteResult<()> {
        self.upload_calls.set(self.upload_calls.get() + 1);
        if self.fail_upload.get() {
            return Err(RemoteError::Transport("connection reset".to_string()));
        }
        let mut objects = self.objects.borrow_mut();
        if objects.contains_key(key) {
            return Err(RemoteError::Conflict(key.to_string()));
        }
        objects.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{CDN}/{key}")
    }
}
