//! Runs controller commands against a [`ResourceApi`] and routes the results back.
//!
//! Commands are spawned on the tokio runtime; each finished call is sent on a
//! channel tagged with the resource kind it belongs to. The UI thread drains the
//! channel between frames and is the only place controller state changes.
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::api::{Payload, ResourceApi};
use crate::controller::{RequestToken, SessionId, SubmitMode};
use crate::error::ApiError;
use crate::model::{Page, PhotoRef, Record, RecordId, ResourceKind};
use crate::search::QueryState;

/// Work requested by a controller.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    FetchPage {
        token: RequestToken,
        query: QueryState,
    },
    FetchRecord {
        session: SessionId,
        id: RecordId,
    },
    Create {
        session: SessionId,
        payload: Payload,
    },
    Update {
        session: SessionId,
        id: RecordId,
        payload: Payload,
    },
    Delete {
        id: RecordId,
    },
    UploadPhoto {
        session: SessionId,
        path: PathBuf,
    },
}

/// Settled result of a [`Command`].
#[derive(Debug)]
pub enum Outcome {
    PageLoaded {
        token: RequestToken,
        result: Result<Page, ApiError>,
    },
    RecordLoaded {
        session: SessionId,
        id: RecordId,
        result: Result<Record, ApiError>,
    },
    Submitted {
        session: SessionId,
        mode: SubmitMode,
        result: Result<(), ApiError>,
    },
    Removed {
        id: RecordId,
        result: Result<(), ApiError>,
    },
    PhotoUploaded {
        session: SessionId,
        result: Result<PhotoRef, ApiError>,
    },
}

/// Perform one command: exactly one API call.
pub async fn execute(api: &dyn ResourceApi, kind: ResourceKind, cmd: Command) -> Outcome {
    match cmd {
        Command::FetchPage { token, query } => Outcome::PageLoaded {
            token,
            result: api.list(kind, &query).await,
        },
        Command::FetchRecord { session, id } => {
            let result = api.get(kind, &id).await;
            Outcome::RecordLoaded {
                session,
                id,
                result,
            }
        }
        Command::Create { session, payload } => Outcome::Submitted {
            session,
            mode: SubmitMode::Create,
            result: api.create(kind, payload).await,
        },
        Command::Update {
            session,
            id,
            payload,
        } => Outcome::Submitted {
            session,
            mode: SubmitMode::Update,
            result: api.update(kind, &id, payload).await,
        },
        Command::Delete { id } => {
            let result = api.delete(kind, &id).await;
            Outcome::Removed { id, result }
        }
        Command::UploadPhoto { session, path } => Outcome::PhotoUploaded {
            session,
            result: api.upload_photo(&path).await,
        },
    }
}

pub struct Effects {
    api: Arc<dyn ResourceApi>,
    handle: Handle,
    tx: UnboundedSender<(ResourceKind, Outcome)>,
    rx: UnboundedReceiver<(ResourceKind, Outcome)>,
}

impl Effects {
    pub fn new(api: Arc<dyn ResourceApi>, handle: Handle) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            api,
            handle,
            tx,
            rx,
        }
    }

    /// Spawn every command; results arrive through [`Effects::try_next`] / [`Effects::next`].
    pub fn dispatch(&self, kind: ResourceKind, cmds: impl IntoIterator<Item = Command>) {
        for cmd in cmds {
            let api = Arc::clone(&self.api);
            let tx = self.tx.clone();
            self.handle.spawn(async move {
                let outcome = execute(api.as_ref(), kind, cmd).await;
                if tx.send((kind, outcome)).is_err() {
                    tracing::debug!("outcome dropped: receiver gone");
                }
            });
        }
    }

    /// A settled outcome if one is ready, without waiting.
    pub fn try_next(&mut self) -> Option<(ResourceKind, Outcome)> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next settled outcome.
    pub async fn next(&mut self) -> Option<(ResourceKind, Outcome)> {
        self.rx.recv().await
    }
}
