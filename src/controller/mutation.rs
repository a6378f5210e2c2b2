use tracing::{error, info};

use super::{ListController, ModalPhase, SessionId, SubmitMode};
use crate::effects::Command;
use crate::error::{ApiError, ErrorKind, ValidationError};
use crate::model::RecordId;

/// A delete waiting for the user's confirmation. Consumed by
/// [`ListController::confirm_remove`] or [`ListController::cancel_remove`].
#[derive(Debug, PartialEq, Eq)]
pub struct PendingRemoval {
    id: RecordId,
}

impl PendingRemoval {
    pub fn id(&self) -> &RecordId {
        &self.id
    }
}

impl ListController {
    pub fn submitting(&self) -> bool {
        self.submitting
    }

    /// Send the open draft: update when a record is selected, create otherwise.
    ///
    /// Returns `Ok(None)` when there is nothing to send (modal closed, or a submit
    /// for this session is already in flight).
    pub fn submit(&mut self) -> Result<Option<Command>, ValidationError> {
        if !self.phase.is_open() || self.submitting {
            return Ok(None);
        }
        let editing = self.selected_id.is_some();
        if let Err(err) = self.draft.validate(self.kind, editing) {
            self.notify_error(ErrorKind::from(&err), err.to_string());
            return Err(err);
        }
        let payload = self.draft.to_payload(self.kind);
        self.submitting = true;
        let cmd = match self.selected_id.clone() {
            Some(id) => Command::Update {
                session: self.session,
                id,
                payload,
            },
            None => Command::Create {
                session: self.session,
                payload,
            },
        };
        Ok(Some(cmd))
    }

    pub(super) fn apply_submit(
        &mut self,
        session: SessionId,
        mode: SubmitMode,
        result: Result<(), ApiError>,
    ) -> Vec<Command> {
        let current = session == self.session;
        if current {
            self.submitting = false;
        }
        match result {
            Ok(()) => {
                let verb = match mode {
                    SubmitMode::Create => "created",
                    SubmitMode::Update => "edited",
                };
                info!(kind = self.kind.endpoint(), ?mode, "record saved");
                self.notify_success(format!("{} {verb} successfully!", self.kind.singular()));
                if current {
                    self.close();
                }
                vec![self.load()]
            }
            Err(err) => {
                error!(kind = self.kind.endpoint(), ?mode, error = %err, "save failed");
                let msg = format!(
                    "An error occurred while creating/editing the {}. Please try again.",
                    self.noun()
                );
                self.notify_error(ErrorKind::NetworkOrServer, msg);
                Vec::new()
            }
        }
    }

    /// First half of a delete: nothing is sent until the removal is confirmed.
    pub fn request_remove(&self, id: RecordId) -> PendingRemoval {
        PendingRemoval { id }
    }

    pub fn confirm_remove(&mut self, pending: PendingRemoval) -> Command {
        info!(kind = self.kind.endpoint(), id = %pending.id, "delete confirmed");
        Command::Delete { id: pending.id }
    }

    pub fn cancel_remove(&mut self, pending: PendingRemoval) {
        info!(kind = self.kind.endpoint(), id = %pending.id, "deletion canceled");
    }

    pub(super) fn apply_remove(&mut self, id: RecordId, result: Result<(), ApiError>) -> Vec<Command> {
        match result {
            Ok(()) => {
                self.notify_success(format!("{} deleted successfully!", self.kind.singular()));
                if self.phase == ModalPhase::OpenForEdit(id.clone()) || self.pending_edit.as_ref() == Some(&id) {
                    self.close();
                }
                vec![self.load()]
            }
            Err(err) => {
                error!(kind = self.kind.endpoint(), %id, error = %err, "delete failed");
                let msg = format!(
                    "An error occurred while deleting the {}. Please try again.",
                    self.noun()
                );
                self.notify_error(ErrorKind::NetworkOrServer, msg);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::NoticeLevel;
    use crate::effects::Outcome;
    use crate::model::{Record, ResourceKind};
    use serde_json::json;

    fn filled_post(c: &mut ListController) {
        let d = c.draft_mut();
        d.set("title", "Hello");
        d.set("category", "c1");
        d.set("description", "body");
    }

    fn open_edit(c: &mut ListController, id: &str) {
        let cmd = c.open_for_edit(id.into());
        let session = match cmd {
            Command::FetchRecord { session, .. } => session,
            other => panic!("unexpected {other:?}"),
        };
        let record: Record = serde_json::from_value(json!({
            "_id": id, "title": "Old", "category": "c1", "description": "d"
        }))
        .unwrap();
        c.apply(Outcome::RecordLoaded {
            session,
            id: id.into(),
            result: Ok(record),
        });
    }

    #[test]
    fn submit_without_selection_creates() {
        let mut c = ListController::new(ResourceKind::Posts, 10, "");
        c.open_for_create();
        filled_post(&mut c);
        let cmd = c.submit().unwrap().unwrap();
        assert!(matches!(cmd, Command::Create { ref payload, .. } if payload["title"] == "Hello"));
        assert!(c.submitting());
        assert_eq!(c.submit(), Ok(None));
    }

    #[test]
    fn invalid_draft_is_not_sent() {
        let mut c = ListController::new(ResourceKind::Posts, 10, "");
        c.open_for_create();
        let err = c.submit().unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: "Title" });
        assert!(!c.submitting());
        assert_eq!(c.take_notices()[0].kind, Some(ErrorKind::Validation));
    }

    #[test]
    fn edit_submit_updates_and_reloads_current_page() {
        let mut c = ListController::new(ResourceKind::Posts, 10, "");
        c.set_page(3);
        open_edit(&mut c, "p1");
        let cmd = c.submit().unwrap().unwrap();
        let session = match cmd {
            Command::Update { session, ref id, .. } => {
                assert_eq!(id.as_str(), "p1");
                session
            }
            other => panic!("expected update, got {other:?}"),
        };
        let follow = c.apply(Outcome::Submitted {
            session,
            mode: SubmitMode::Update,
            result: Ok(()),
        });
        assert_eq!(c.phase(), &ModalPhase::Closed);
        assert!(matches!(follow.as_slice(), [Command::FetchPage { query, .. }] if query.page() == 3));
        assert_eq!(c.take_notices()[0].message, "Post edited successfully!");
    }

    #[test]
    fn failed_submit_keeps_modal_and_draft() {
        let mut c = ListController::new(ResourceKind::Posts, 10, "");
        c.open_for_create();
        filled_post(&mut c);
        let session = match c.submit().unwrap().unwrap() {
            Command::Create { session, .. } => session,
            other => panic!("unexpected {other:?}"),
        };
        let follow = c.apply(Outcome::Submitted {
            session,
            mode: SubmitMode::Create,
            result: Err(ApiError::Status {
                status: 500,
                body: "stack trace".into(),
            }),
        });
        assert!(follow.is_empty());
        assert_eq!(c.phase(), &ModalPhase::OpenForCreate);
        assert_eq!(c.draft().get("title"), "Hello");
        assert!(!c.submitting());
        let notice = &c.take_notices()[0];
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(!notice.message.contains("stack trace"));
    }

    #[test]
    fn late_submit_result_does_not_close_a_newer_modal() {
        let mut c = ListController::new(ResourceKind::Posts, 10, "");
        c.open_for_create();
        filled_post(&mut c);
        let cmd = c.submit().unwrap().unwrap();
        let session = match cmd {
            Command::Create { session, .. } => session,
            other => panic!("unexpected {other:?}"),
        };
        c.close();
        c.open_for_create();
        let follow = c.apply(Outcome::Submitted {
            session,
            mode: SubmitMode::Create,
            result: Ok(()),
        });
        assert_eq!(c.phase(), &ModalPhase::OpenForCreate);
        assert_eq!(follow.len(), 1);
    }

    #[test]
    fn delete_waits_for_confirmation() {
        let mut c = ListController::new(ResourceKind::Users, 10, "");
        let pending = c.request_remove("u1".into());
        assert_eq!(pending.id().as_str(), "u1");
        c.cancel_remove(pending);
        let pending = c.request_remove("u1".into());
        let cmd = c.confirm_remove(pending);
        assert!(matches!(cmd, Command::Delete { ref id } if id.as_str() == "u1"));
        let follow = c.apply(Outcome::Removed {
            id: "u1".into(),
            result: Ok(()),
        });
        assert!(matches!(follow.as_slice(), [Command::FetchPage { .. }]));
    }

    #[test]
    fn failed_delete_does_not_reload() {
        let mut c = ListController::new(ResourceKind::Users, 10, "");
        let follow = c.apply(Outcome::Removed {
            id: "u1".into(),
            result: Err(ApiError::unexpected("nope")),
        });
        assert!(follow.is_empty());
        assert_eq!(c.take_notices()[0].kind, Some(ErrorKind::NetworkOrServer));
    }
}
