//! Records as served by the API, the pages they come in, and the resource kinds
//! the console knows how to manage.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

/// Server-assigned record identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single entity. Only the identifier is typed; every other field is kept as
/// the server sent it because the field set depends on the resource kind.
///
/// The identifier is read from `_id`, falling back to `id`. Servers that send
/// both (a Mongo document with virtuals) decode the same way.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Record {
    pub id: RecordId,
    pub fields: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for Record {
    type Error = String;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let primary = fields.remove("_id");
        let virtual_id = fields.remove("id");
        let id = match primary.or(virtual_id) {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => return Err(format!("record identifier must be a string, got {other}")),
            None => return Err("record without `_id` or `id`".to_string()),
        };
        Ok(Self {
            id: RecordId(id),
            fields,
        })
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        let mut map = record.fields;
        map.insert("_id".to_string(), Value::String(record.id.0));
        map
    }
}

impl Record {
    pub fn new(id: impl Into<RecordId>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Field rendered as text. Nested objects (a post's category) show their `name`.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Object(obj) => obj.get("name").and_then(Value::as_str).map(str::to_string),
            Value::Null | Value::Array(_) => None,
        }
    }

    /// Identifier of a related record (`category: {_id, name}` or a bare id string).
    pub fn relation_id(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj.get("_id").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }

    pub fn photo(&self) -> Option<PhotoRef> {
        let raw = self.fields.get("photo")?;
        serde_json::from_value(raw.clone()).ok()
    }
}

/// Reference to an uploaded image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhotoRef {
    /// Bare identifier, already carrying its extension (users).
    Id(String),
    /// Stored file object; the URL needs the extension taken from `name` (posts).
    File {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl PhotoRef {
    pub fn id(&self) -> &str {
        match self {
            PhotoRef::Id(id) => id,
            PhotoRef::File { id, .. } => id,
        }
    }

    /// Public URL of the image under `image_base`.
    pub fn url(&self, image_base: &str) -> String {
        match self {
            PhotoRef::Id(id) => format!("{image_base}{id}"),
            PhotoRef::File { id, name } => {
                match name.as_deref().and_then(|n| n.split('.').nth(1)) {
                    Some(ext) if !ext.is_empty() => format!("{image_base}{id}.{ext}"),
                    _ => format!("{image_base}{id}"),
                }
            }
        }
    }
}

/// One server-paginated slice of records plus the number of matches overall.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Record>,
    pub total: u64,
}

impl Page {
    /// Build a page, raising `total` to at least the number of rows received.
    pub fn new(items: Vec<Record>, total: u64) -> Self {
        let total = total.max(items.len() as u64);
        Self { items, total }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.items.iter().any(|r| &r.id == id)
    }
}

/// The collections the console manages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Users,
    Posts,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Users, ResourceKind::Posts];

    /// Path segment under the API base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            ResourceKind::Users => "user",
            ResourceKind::Posts => "post",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            ResourceKind::Users => "User",
            ResourceKind::Posts => "Post",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            ResourceKind::Users => "Users",
            ResourceKind::Posts => "Posts",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "users" | "user" => Some(ResourceKind::Users),
            "posts" | "post" => Some(ResourceKind::Posts),
            _ => None,
        }
    }
}
