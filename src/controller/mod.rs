//! List/detail synchronization controller.
//!
//! One [`ListController`] per resource kind owns the query state, the page on
//! screen, the create/edit modal and its draft. It never performs I/O: every
//! operation returns the [`Command`]s to run, and results come back through
//! [`ListController::apply`] as [`Outcome`]s. Fetch results carry a
//! [`RequestToken`] and modal results a [`SessionId`]; anything that no longer
//! matches the current token or session is dropped.
//!
//! The impl is split by concern:
//! - `fetch`: query changes, list loading, page back-off
//! - `selection`: modal open/close, edit prefill, photo attachment
//! - `mutation`: create/update submit and confirmed delete
mod fetch;
mod mutation;
mod selection;

use crate::effects::{Command, Outcome};
use crate::error::ErrorKind;
use crate::form::FormDraft;
use crate::model::{Page, RecordId, ResourceKind};
use crate::search::QueryState;

pub use mutation::PendingRemoval;

/// Identifies one issued list fetch. Increases monotonically per controller.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Identifies one modal session, from open (or edit request) to close.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

/// Visibility of the create/edit modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalPhase {
    Closed,
    OpenForCreate,
    OpenForEdit(RecordId),
}

impl ModalPhase {
    pub fn is_open(&self) -> bool {
        !matches!(self, ModalPhase::Closed)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    Update,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// User-facing notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub kind: Option<ErrorKind>,
}

pub struct ListController {
    kind: ResourceKind,
    image_base: String,
    query: QueryState,
    page: Page,
    loading: bool,
    latest_fetch: RequestToken,
    phase: ModalPhase,
    session: SessionId,
    pending_edit: Option<RecordId>,
    selected_id: Option<RecordId>,
    draft: FormDraft,
    photo_preview: Option<String>,
    uploading: bool,
    submitting: bool,
    notices: Vec<Notice>,
}

impl ListController {
    /// Controller for `kind`; photo previews are resolved under `image_base`.
    pub fn new(kind: ResourceKind, page_size: u32, image_base: impl Into<String>) -> Self {
        Self {
            kind,
            image_base: image_base.into(),
            query: QueryState::new(page_size),
            page: Page::default(),
            loading: false,
            latest_fetch: RequestToken::default(),
            phase: ModalPhase::Closed,
            session: SessionId::default(),
            pending_edit: None,
            selected_id: None,
            draft: FormDraft::empty(),
            photo_preview: None,
            uploading: false,
            submitting: false,
            notices: Vec::new(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Feed back the result of a command; returns follow-up commands.
    pub fn apply(&mut self, outcome: Outcome) -> Vec<Command> {
        match outcome {
            Outcome::PageLoaded { token, result } => self.apply_page(token, result),
            Outcome::RecordLoaded {
                session,
                id,
                result,
            } => {
                self.apply_record(session, id, result);
                Vec::new()
            }
            Outcome::PhotoUploaded { session, result } => {
                self.apply_photo(session, result);
                Vec::new()
            }
            Outcome::Submitted {
                session,
                mode,
                result,
            } => self.apply_submit(session, mode, result),
            Outcome::Removed { id, result } => self.apply_remove(id, result),
        }
    }

    /// Notifications raised since the last call, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify_success(&mut self, message: String) {
        self.notices.push(Notice {
            level: NoticeLevel::Success,
            message,
            kind: None,
        });
    }

    fn notify_error(&mut self, kind: ErrorKind, message: String) {
        self.notices.push(Notice {
            level: NoticeLevel::Error,
            message,
            kind: Some(kind),
        });
    }

    /// Lower-case singular noun for messages ("user", "post").
    fn noun(&self) -> String {
        self.kind.singular().to_lowercase()
    }
}
