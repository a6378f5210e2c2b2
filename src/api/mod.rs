//! Remote data source the console reads from and writes to.
//!
//! [`ResourceApi`] is the seam between the controller and the outside world:
//! [`HttpApi`] talks to the real REST service, [`MemoryApi`] keeps everything
//! in process (offline mode and tests).
pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::Result;
use crate::model::{Page, PhotoRef, Record, RecordId, ResourceKind};
use crate::search::QueryState;

pub use http::HttpApi;
pub use memory::MemoryApi;

/// JSON object sent on create/update.
pub type Payload = Map<String, Value>;

#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// One page of `kind` matching the query's search filter.
    async fn list(&self, kind: ResourceKind, query: &QueryState) -> Result<Page>;

    async fn get(&self, kind: ResourceKind, id: &RecordId) -> Result<Record>;

    async fn create(&self, kind: ResourceKind, payload: Payload) -> Result<()>;

    async fn update(&self, kind: ResourceKind, id: &RecordId, payload: Payload) -> Result<()>;

    async fn delete(&self, kind: ResourceKind, id: &RecordId) -> Result<()>;

    /// Upload the image at `path`, returning the reference to embed in a record.
    async fn upload_photo(&self, path: &Path) -> Result<PhotoRef>;
}

/// `{ "data": [...], "pagination": { "total": n } }`
#[derive(Debug, Deserialize)]
pub(crate) struct ListEnvelope {
    pub data: Vec<Record>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Pagination {
    pub total: u64,
}

impl ListEnvelope {
    pub fn into_page(self) -> Page {
        let total = self.pagination.map(|p| p.total).unwrap_or(0);
        Page::new(self.data, total)
    }
}

/// `{ "data": {...} }`
#[derive(Debug, Deserialize)]
pub(crate) struct RecordEnvelope {
    pub data: Record,
}

/// `{ "photo": "id" }` or `{ "photo": { "_id": ..., "name": ... } }`
#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub photo: PhotoRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_envelope_without_pagination_counts_rows() {
        let env: ListEnvelope =
            serde_json::from_str(r#"{"data":[{"_id":"a"},{"_id":"b"}]}"#).unwrap();
        let page = env.into_page();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn list_envelope_accepts_records_carrying_id_virtuals() {
        let body = r#"{"data":[{"_id":"u1","id":"u1","first_name":"Ann"}],"pagination":{"total":3}}"#;
        let page = serde_json::from_str::<ListEnvelope>(body).unwrap().into_page();
        assert_eq!(page.items[0].id.as_str(), "u1");
        assert_eq!(page.total, 3);
    }

    #[test]
    fn upload_response_accepts_both_photo_shapes() {
        let bare: UploadResponse = serde_json::from_str(r#"{"photo":"x.png"}"#).unwrap();
        assert_eq!(bare.photo, PhotoRef::Id("x.png".into()));
        let obj: UploadResponse =
            serde_json::from_str(r#"{"photo":{"_id":"f1","name":"x.png"}}"#).unwrap();
        assert_eq!(obj.photo.id(), "f1");
    }
}
