//! Form drafts behind the create/edit modal.
//!
//! Each resource kind has a static field schema. A draft is filled either empty
//! (create) or from a fetched record through [`FormDraft::from_record`], checked by
//! [`FormDraft::validate`] and turned into a request body by [`FormDraft::to_payload`].
//! All three are pure so they can be tested without a controller.
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::model::{PhotoRef, Record, ResourceKind};

/// How a field is edited and serialized.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Multiline,
    /// `YYYY-MM-DD`.
    Date,
    /// Masked on screen, never pre-filled, omitted from updates when left empty.
    Secret,
    /// Identifier of a related record (e.g. a post's category).
    Relation,
    /// Local path of an image to upload; the draft keeps the resulting reference.
    Photo,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn field(key: &'static str, label: &'static str, kind: FieldKind, required: bool) -> FieldSpec {
    FieldSpec {
        key,
        label,
        kind,
        required,
    }
}

const USER_FIELDS: &[FieldSpec] = &[
    field("first_name", "First Name", FieldKind::Text, true),
    field("last_name", "Last Name", FieldKind::Text, true),
    field("username", "Username", FieldKind::Text, true),
    field("phoneNumber", "Phone Number", FieldKind::Text, true),
    field("birthday", "Birthday", FieldKind::Date, true),
    field("address", "Address", FieldKind::Text, true),
    field("email", "Email", FieldKind::Text, true),
    field("password", "Password", FieldKind::Secret, true),
    field("description", "Description", FieldKind::Multiline, true),
    field("photo", "Image", FieldKind::Photo, false),
];

const POST_FIELDS: &[FieldSpec] = &[
    field("title", "Title", FieldKind::Text, true),
    field("category", "Category", FieldKind::Relation, true),
    field("description", "Description", FieldKind::Multiline, true),
    field("photo", "Image", FieldKind::Photo, false),
];

/// Field schema of a resource kind, in display order.
pub fn schema(kind: ResourceKind) -> &'static [FieldSpec] {
    match kind {
        ResourceKind::Users => USER_FIELDS,
        ResourceKind::Posts => POST_FIELDS,
    }
}

/// Partial record being edited in the modal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormDraft {
    values: BTreeMap<&'static str, String>,
    photo: Option<PhotoRef>,
}

impl FormDraft {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Map a fetched record onto the form fields of `kind`.
    pub fn from_record(kind: ResourceKind, record: &Record) -> Self {
        let mut values = BTreeMap::new();
        for spec in schema(kind) {
            let value = match spec.kind {
                FieldKind::Text | FieldKind::Multiline => record.text(spec.key),
                FieldKind::Date => record.text(spec.key).map(|d| date_part(&d)),
                FieldKind::Relation => record.relation_id(spec.key),
                FieldKind::Secret | FieldKind::Photo => None,
            };
            if let Some(v) = value {
                values.insert(spec.key, v);
            }
        }
        Self {
            values,
            photo: record.photo(),
        }
    }

    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, key: &'static str, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Mutable buffer of a field, created empty on first access.
    pub fn value_mut(&mut self, key: &'static str) -> &mut String {
        self.values.entry(key).or_default()
    }

    pub fn photo(&self) -> Option<&PhotoRef> {
        self.photo.as_ref()
    }

    pub fn set_photo(&mut self, photo: PhotoRef) {
        self.photo = Some(photo);
    }

    /// Required-field and format checks. `editing` relaxes secret fields, which
    /// keep their stored value when left empty.
    pub fn validate(&self, kind: ResourceKind, editing: bool) -> Result<(), ValidationError> {
        for spec in schema(kind) {
            if spec.kind == FieldKind::Photo {
                continue;
            }
            let value = self.get(spec.key).trim();
            let required = spec.required && !(editing && spec.kind == FieldKind::Secret);
            if required && value.is_empty() {
                return Err(ValidationError::MissingField { field: spec.label });
            }
            if spec.kind == FieldKind::Date
                && !value.is_empty()
                && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err()
            {
                return Err(ValidationError::InvalidDate {
                    field: spec.label,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Request body for create/update. Never carries the record identifier.
    pub fn to_payload(&self, kind: ResourceKind) -> Map<String, Value> {
        let mut body = Map::new();
        for spec in schema(kind) {
            match spec.kind {
                FieldKind::Photo => {
                    if let Some(photo) = &self.photo {
                        body.insert(spec.key.to_string(), Value::String(photo.id().to_string()));
                    }
                }
                FieldKind::Secret if self.get(spec.key).is_empty() => {}
                FieldKind::Date | FieldKind::Relation | FieldKind::Text => {
                    body.insert(spec.key.to_string(), Value::String(self.get(spec.key).trim().to_string()));
                }
                FieldKind::Secret | FieldKind::Multiline => {
                    body.insert(spec.key.to_string(), Value::String(self.get(spec.key).to_string()));
                }
            }
        }
        body
    }
}

/// `1990-05-01T00:00:00.000Z` -> `1990-05-01`; anything shorter is kept as is.
fn date_part(raw: &str) -> String {
    match raw.split_once('T') {
        Some((date, _)) => date.to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_record() -> Record {
        serde_json::from_value(json!({
            "_id": "u1",
            "first_name": "Ann",
            "last_name": "Lee",
            "username": "ann",
            "phoneNumber": "+1 555 0100",
            "birthday": "1990-05-01T00:00:00.000Z",
            "address": "1 Main St",
            "email": "ann@example.com",
            "password": "$2b$10$hash",
            "description": "ops",
            "photo": "ann.png"
        }))
        .unwrap()
    }

    #[test]
    fn edit_draft_maps_fields_by_name() {
        let draft = FormDraft::from_record(ResourceKind::Users, &user_record());
        assert_eq!(draft.get("first_name"), "Ann");
        assert_eq!(draft.get("birthday"), "1990-05-01");
        assert_eq!(draft.get("password"), "");
        assert_eq!(draft.photo(), Some(&PhotoRef::Id("ann.png".into())));
    }

    #[test]
    fn create_requires_password_but_edit_does_not() {
        let draft = FormDraft::from_record(ResourceKind::Users, &user_record());
        assert_eq!(
            draft.validate(ResourceKind::Users, false),
            Err(ValidationError::MissingField { field: "Password" })
        );
        assert_eq!(draft.validate(ResourceKind::Users, true), Ok(()));
    }

    #[test]
    fn malformed_birthday_is_rejected() {
        let mut draft = FormDraft::from_record(ResourceKind::Users, &user_record());
        draft.set("birthday", "01/05/1990");
        assert!(matches!(
            draft.validate(ResourceKind::Users, true),
            Err(ValidationError::InvalidDate { field: "Birthday", .. })
        ));
    }

    #[test]
    fn payload_omits_empty_secret_and_carries_photo_id() {
        let draft = FormDraft::from_record(ResourceKind::Users, &user_record());
        let body = draft.to_payload(ResourceKind::Users);
        assert!(!body.contains_key("password"));
        assert!(!body.contains_key("_id"));
        assert_eq!(body.get("photo"), Some(&json!("ann.png")));
        assert_eq!(body.get("username"), Some(&json!("ann")));
    }

    #[test]
    fn post_category_is_sent_as_its_id() {
        let record: Record = serde_json::from_value(json!({
            "_id": "p1", "title": "Hello", "description": "body",
            "category": {"_id": "c1", "name": "news"},
            "photo": {"_id": "f1", "name": "hello.jpg"}
        }))
        .unwrap();
        let draft = FormDraft::from_record(ResourceKind::Posts, &record);
        assert_eq!(draft.get("category"), "c1");
        let body = draft.to_payload(ResourceKind::Posts);
        assert_eq!(body.get("category"), Some(&json!("c1")));
        assert_eq!(body.get("photo"), Some(&json!("f1")));
    }
}
