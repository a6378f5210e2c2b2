use std::path::PathBuf;
use tracing::{debug, error};

use super::{ListController, ModalPhase, SessionId};
use crate::effects::Command;
use crate::error::{ApiError, ErrorKind};
use crate::form::FormDraft;
use crate::model::{PhotoRef, Record, RecordId};

impl ListController {
    pub fn phase(&self) -> &ModalPhase {
        &self.phase
    }

    pub fn selected_id(&self) -> Option<&RecordId> {
        self.selected_id.as_ref()
    }

    /// Id whose edit fetch is still in flight.
    pub fn pending_edit(&self) -> Option<&RecordId> {
        self.pending_edit.as_ref()
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut FormDraft {
        &mut self.draft
    }

    pub fn photo_preview(&self) -> Option<&str> {
        self.photo_preview.as_deref()
    }

    pub fn uploading(&self) -> bool {
        self.uploading
    }

    pub fn open_for_create(&mut self) {
        self.reset_modal();
        self.phase = ModalPhase::OpenForCreate;
    }

    /// Request the record for editing. The modal opens only once it arrives.
    pub fn open_for_edit(&mut self, id: RecordId) -> Command {
        self.reset_modal();
        debug!(kind = self.kind.endpoint(), %id, session = self.session.0, "fetching record for edit");
        self.pending_edit = Some(id.clone());
        Command::FetchRecord {
            session: self.session,
            id,
        }
    }

    /// Close the modal and forget the draft, preview and anything still in flight
    /// for it. Calling it again changes nothing.
    pub fn close(&mut self) {
        let idle = self.phase == ModalPhase::Closed
            && self.pending_edit.is_none()
            && !self.uploading
            && !self.submitting
            && self.selected_id.is_none();
        if idle {
            return;
        }
        self.reset_modal();
    }

    /// Upload the image at `path` for the open draft.
    pub fn attach_photo(&mut self, path: impl Into<PathBuf>) -> Option<Command> {
        let path = path.into();
        if !self.phase.is_open() || path.as_os_str().is_empty() {
            return None;
        }
        self.uploading = true;
        Some(Command::UploadPhoto {
            session: self.session,
            path,
        })
    }

    fn reset_modal(&mut self) {
        self.session = SessionId(self.session.0 + 1);
        self.phase = ModalPhase::Closed;
        self.pending_edit = None;
        self.selected_id = None;
        self.draft = FormDraft::empty();
        self.photo_preview = None;
        self.uploading = false;
        self.submitting = false;
    }

    pub(super) fn apply_record(
        &mut self,
        session: SessionId,
        id: RecordId,
        result: Result<Record, ApiError>,
    ) {
        if session != self.session || self.pending_edit.as_ref() != Some(&id) {
            debug!(kind = self.kind.endpoint(), %id, "ignoring record for an abandoned edit");
            return;
        }
        self.pending_edit = None;
        match result {
            Ok(record) => {
                self.draft = FormDraft::from_record(self.kind, &record);
                self.photo_preview = record.photo().map(|p| p.url(&self.image_base));
                self.selected_id = Some(id.clone());
                self.phase = ModalPhase::OpenForEdit(id);
            }
            Err(err) => {
                error!(kind = self.kind.endpoint(), %id, error = %err, "edit fetch failed");
                let msg = format!(
                    "An error occurred while fetching {} data. Please try again.",
                    self.noun()
                );
                self.notify_error(ErrorKind::NotFoundOnEdit, msg);
            }
        }
    }

    pub(super) fn apply_photo(&mut self, session: SessionId, result: Result<PhotoRef, ApiError>) {
        if session != self.session {
            debug!(kind = self.kind.endpoint(), "ignoring upload for a closed modal");
            return;
        }
        self.uploading = false;
        match result {
            Ok(photo) => {
                self.photo_preview = Some(photo.url(&self.image_base));
                self.draft.set_photo(photo);
                self.notify_success("Image uploaded".to_string());
            }
            Err(err) => {
                error!(kind = self.kind.endpoint(), error = %err, "photo upload failed");
                self.notify_error(
                    ErrorKind::NetworkOrServer,
                    "Image upload failed. Please try again.".to_string(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Outcome;
    use crate::model::ResourceKind;
    use serde_json::json;

    fn session_of(cmd: &Command) -> SessionId {
        match cmd {
            Command::FetchRecord { session, .. } | Command::UploadPhoto { session, .. } => *session,
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn ann() -> Record {
        serde_json::from_value(json!({"_id": "u1", "first_name": "Ann", "photo": "ann.png"})).unwrap()
    }

    #[test]
    fn edit_prefills_draft_then_opens() {
        let mut c = ListController::new(ResourceKind::Users, 10, "http://img/");
        let cmd = c.open_for_edit("u1".into());
        assert_eq!(c.phase(), &ModalPhase::Closed);
        c.apply(Outcome::RecordLoaded {
            session: session_of(&cmd),
            id: "u1".into(),
            result: Ok(ann()),
        });
        assert_eq!(c.phase(), &ModalPhase::OpenForEdit("u1".into()));
        assert_eq!(c.draft().get("first_name"), "Ann");
        assert_eq!(c.selected_id(), Some(&RecordId::from("u1")));
        assert_eq!(c.photo_preview(), Some("http://img/ann.png"));
    }

    #[test]
    fn close_before_fetch_resolves_prevents_opening() {
        let mut c = ListController::new(ResourceKind::Users, 10, "");
        let cmd = c.open_for_edit("u1".into());
        c.close();
        c.apply(Outcome::RecordLoaded {
            session: session_of(&cmd),
            id: "u1".into(),
            result: Ok(ann()),
        });
        assert_eq!(c.phase(), &ModalPhase::Closed);
        assert_eq!(c.draft().get("first_name"), "");
    }

    #[test]
    fn failed_edit_fetch_notifies_and_stays_closed() {
        let mut c = ListController::new(ResourceKind::Users, 10, "");
        let cmd = c.open_for_edit("gone".into());
        c.apply(Outcome::RecordLoaded {
            session: session_of(&cmd),
            id: "gone".into(),
            result: Err(ApiError::NotFound("gone".into())),
        });
        assert_eq!(c.phase(), &ModalPhase::Closed);
        let notices = c.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, Some(ErrorKind::NotFoundOnEdit));
    }

    #[test]
    fn server_error_on_edit_fetch_is_reported_like_a_missing_record() {
        let mut c = ListController::new(ResourceKind::Posts, 10, "");
        let cmd = c.open_for_edit("p1".into());
        c.apply(Outcome::RecordLoaded {
            session: session_of(&cmd),
            id: "p1".into(),
            result: Err(ApiError::from_status(500, "boom".into(), None)),
        });
        assert_eq!(c.phase(), &ModalPhase::Closed);
        assert_eq!(c.pending_edit(), None);
        let notices = c.take_notices();
        assert_eq!(notices[0].kind, Some(ErrorKind::NotFoundOnEdit));
        assert!(!notices[0].message.contains("boom"));
    }

    #[test]
    fn create_starts_from_an_empty_draft() {
        let mut c = ListController::new(ResourceKind::Users, 10, "");
        let cmd = c.open_for_edit("u1".into());
        c.apply(Outcome::RecordLoaded {
            session: session_of(&cmd),
            id: "u1".into(),
            result: Ok(ann()),
        });
        c.open_for_create();
        assert_eq!(c.phase(), &ModalPhase::OpenForCreate);
        assert_eq!(c.selected_id(), None);
        assert_eq!(c.draft(), &FormDraft::empty());
    }

    #[test]
    fn uploaded_photo_is_held_in_the_draft() {
        let mut c = ListController::new(ResourceKind::Users, 10, "http://img/");
        c.open_for_create();
        let cmd = c.attach_photo("/tmp/me.png").unwrap();
        assert!(c.uploading());
        c.apply(Outcome::PhotoUploaded {
            session: session_of(&cmd),
            result: Ok(PhotoRef::Id("me.png".into())),
        });
        assert_eq!(c.draft().photo(), Some(&PhotoRef::Id("me.png".into())));
        assert_eq!(c.photo_preview(), Some("http://img/me.png"));
        assert!(!c.uploading());
    }

    #[test]
    fn upload_after_close_is_dropped() {
        let mut c = ListController::new(ResourceKind::Users, 10, "");
        assert!(c.attach_photo("/tmp/x.png").is_none());
        c.open_for_create();
        let cmd = c.attach_photo("/tmp/x.png").unwrap();
        c.close();
        c.open_for_create();
        c.apply(Outcome::PhotoUploaded {
            session: session_of(&cmd),
            result: Ok(PhotoRef::Id("x.png".into())),
        });
        assert_eq!(c.draft().photo(), None);
    }

    #[test]
    fn close_is_idempotent() {
        let mut c = ListController::new(ResourceKind::Posts, 10, "");
        c.open_for_create();
        c.close();
        let before = (c.phase().clone(), c.draft().clone(), c.session);
        c.close();
        assert_eq!((c.phase().clone(), c.draft().clone(), c.session), before);
    }
}
