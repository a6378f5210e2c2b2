//! In-process [`ResourceApi`]: backs `--offline` mode and the test suite.
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::{Payload, ResourceApi};
use crate::error::{ApiError, Result};
use crate::model::{Page, PhotoRef, Record, RecordId, ResourceKind};
use crate::search::QueryState;

#[derive(Default)]
pub struct MemoryApi {
    records: Mutex<HashMap<ResourceKind, Vec<Record>>>,
    next_id: AtomicU64,
    offline: AtomicBool,
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo data set used by `--offline`.
    pub fn seeded() -> Self {
        let api = Self::new();
        let names = [
            ("Ann", "Lee"),
            ("Bob", "Stone"),
            ("Carla", "Diaz"),
            ("Dmitri", "Orlov"),
            ("Eve", "Moss"),
        ];
        let users = (0..25)
            .map(|i| {
                let (first, last) = names[i % names.len()];
                let mut fields = json!({
                    "first_name": first,
                    "last_name": format!("{last} {i}"),
                    "username": format!("{}{i}", first.to_lowercase()),
                    "birthday": "1990-01-01",
                    "email": format!("{}{i}@example.com", first.to_lowercase()),
                    "description": "seeded account",
                });
                if i % 3 != 0 {
                    fields["phoneNumber"] = json!(format!("+1 555 01{i:02}"));
                    fields["address"] = json!(format!("{i} Main St"));
                }
                record(format!("u{i}"), fields)
            })
            .collect();
        let categories = ["news", "howto", "release"];
        let posts = (0..12)
            .map(|i| {
                let cat = categories[i % categories.len()];
                record(
                    format!("p{i}"),
                    json!({
                        "title": format!("Post number {i}"),
                        "description": format!("Body of post {i}"),
                        "category": { "_id": format!("c-{cat}"), "name": cat },
                    }),
                )
            })
            .collect();
        api.insert_all(ResourceKind::Users, users);
        api.insert_all(ResourceKind::Posts, posts);
        api
    }

    /// Backend holding exactly `records` of `kind`.
    pub fn with_records(kind: ResourceKind, records: Vec<Record>) -> Self {
        let api = Self::new();
        api.insert_all(kind, records);
        api
    }

    pub fn insert_all(&self, kind: ResourceKind, records: Vec<Record>) {
        if let Ok(mut all) = self.records.lock() {
            all.entry(kind).or_default().extend(records);
        }
    }

    /// Make every call fail as if the server were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.records
            .lock()
            .map(|all| all.get(&kind).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn reachable(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::unexpected("backend unreachable"));
        }
        Ok(())
    }

    fn with_records_mut<T>(
        &self,
        kind: ResourceKind,
        f: impl FnOnce(&mut Vec<Record>) -> Result<T>,
    ) -> Result<T> {
        self.reachable()?;
        let mut all = self
            .records
            .lock()
            .map_err(|_| ApiError::unexpected("record store poisoned"))?;
        f(all.entry(kind).or_default())
    }
}

fn record(id: String, fields: Value) -> Record {
    match fields {
        Value::Object(map) => Record::new(id, map),
        _ => Record::new(id, Payload::new()),
    }
}

fn matches(record: &Record, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    record
        .fields
        .keys()
        .filter_map(|k| record.text(k))
        .any(|v| v.to_lowercase().contains(needle))
}

#[async_trait]
impl ResourceApi for MemoryApi {
    async fn list(&self, kind: ResourceKind, query: &QueryState) -> Result<Page> {
        let needle = query.search().to_lowercase();
        self.with_records_mut(kind, |records| {
            let hits: Vec<&Record> = records.iter().filter(|r| matches(r, &needle)).collect();
            let size = query.page_size() as usize;
            let start = (query.page() as usize - 1).saturating_mul(size);
            let items = hits.iter().skip(start).take(size).map(|r| (*r).clone()).collect();
            Ok(Page::new(items, hits.len() as u64))
        })
    }

    async fn get(&self, kind: ResourceKind, id: &RecordId) -> Result<Record> {
        self.with_records_mut(kind, |records| {
            records
                .iter()
                .find(|r| &r.id == id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(id.clone()))
        })
    }

    async fn create(&self, kind: ResourceKind, payload: Payload) -> Result<()> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("{}-new-{n}", kind.endpoint());
        self.with_records_mut(kind, |records| {
            records.push(Record::new(id, payload));
            Ok(())
        })
    }

    async fn update(&self, kind: ResourceKind, id: &RecordId, payload: Payload) -> Result<()> {
        self.with_records_mut(kind, |records| {
            let existing = records
                .iter_mut()
                .find(|r| &r.id == id)
                .ok_or_else(|| ApiError::NotFound(id.clone()))?;
            existing.fields.extend(payload);
            Ok(())
        })
    }

    async fn delete(&self, kind: ResourceKind, id: &RecordId) -> Result<()> {
        self.with_records_mut(kind, |records| {
            let before = records.len();
            records.retain(|r| &r.id != id);
            if records.len() == before {
                return Err(ApiError::NotFound(id.clone()));
            }
            Ok(())
        })
    }

    async fn upload_photo(&self, path: &Path) -> Result<PhotoRef> {
        self.reachable()?;
        tokio::fs::metadata(path).await?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(PhotoRef::Id(format!("{n}-{name}")))
    }
}
