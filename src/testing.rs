//! In-memory peer and subscriber shared by the unit tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::client::{PeerClient, RawResponse, Target, TransportError};
use crate::file::{LocalBatch, LocalFile};
use crate::model::{NegotiationRequest, UploadToken};
use crate::orchestrator::BatchState;
use crate::progress::{ProgressEvent, ProgressReporter, TransferSubscriber};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Prepare(Vec<String>),
    Upload {
        session_id: String,
        file_id: String,
        token: String,
    },
    Skipped(Vec<String>),
    Progress(ProgressEvent),
    State(BatchState),
}

#[derive(Debug, Clone)]
pub enum UploadBehavior {
    Status(u16),
    Transport(String),
    Hang,
}

pub type Log = Arc<Mutex<Vec<Entry>>>;

pub struct FakePeer {
    prepare: std::result::Result<RawResponse, TransportError>,
    uploads: HashMap<String, UploadBehavior>,
    chunk_size: u64,
    pub log: Log,
    pub upload_started: Arc<Notify>,
}

impl FakePeer {
    pub fn answering(status: u16, body: &str) -> Self {
        Self::with_prepare(Ok(RawResponse {
            status,
            body: body.as_bytes().to_vec(),
        }))
    }

    pub fn offline(cause: &str) -> Self {
        Self::with_prepare(Err(TransportError(cause.to_string())))
    }

    fn with_prepare(
        prepare: std::result::Result<RawResponse, TransportError>,
    ) -> Self {
        Self {
            prepare,
            uploads: HashMap::new(),
            chunk_size: 64,
            log: Arc::new(Mutex::new(Vec::new())),
            upload_started: Arc::new(Notify::new()),
        }
    }

    pub fn on_upload(mut self, file_id: &str, behavior: UploadBehavior) -> Self {
        self.uploads.insert(file_id.to_string(), behavior);
        self
    }

    pub fn recorder(&self) -> Arc<Recorder> {
        Arc::new(Recorder {
            log: self.log.clone(),
        })
    }
}

#[async_trait]
impl PeerClient for FakePeer {
    async fn prepare_upload(
        &self,
        _target: &Target,
        request: &NegotiationRequest<'_>,
    ) -> std::result::Result<RawResponse, TransportError> {
        self.log
            .lock()
            .unwrap()
            .push(Entry::Prepare(request.files.keys().cloned().collect()));
        self.prepare.clone()
    }

    async fn upload(
        &self,
        _target: &Target,
        token: &UploadToken,
        file: &LocalFile,
        progress: ProgressReporter,
    ) -> std::result::Result<u16, TransportError> {
        self.log.lock().unwrap().push(Entry::Upload {
            session_id: token.session_id.clone(),
            file_id: token.file_id.clone(),
            token: token.token.clone(),
        });

        let behavior = self
            .uploads
            .get(&token.file_id)
            .cloned()
            .unwrap_or(UploadBehavior::Status(200));
        if let UploadBehavior::Hang = behavior {
            progress.report(self.chunk_size.min(file.size));
            self.upload_started.notify_one();
            return futures::future::pending().await;
        }

        let mut sent = 0;
        while sent < file.size {
            sent = (sent + self.chunk_size).min(file.size);
            progress.report(sent);
        }

        match behavior {
            UploadBehavior::Status(status) => Ok(status),
            UploadBehavior::Transport(cause) => Err(TransportError(cause)),
            UploadBehavior::Hang => unreachable!(),
        }
    }
}

pub struct Recorder {
    log: Log,
}

impl TransferSubscriber for Recorder {
    fn notify_skipped(&self, file_ids: &[String]) {
        self.log
            .lock()
            .unwrap()
            .push(Entry::Skipped(file_ids.to_vec()));
    }

    fn notify_progress(&self, event: ProgressEvent) {
        self.log.lock().unwrap().push(Entry::Progress(event));
    }

    fn notify_state(&self, state: &BatchState) {
        self.log.lock().unwrap().push(Entry::State(state.clone()));
    }
}

/// A batch of files that exist only as metadata; the fake peer never opens
/// them.
pub fn batch(files: &[(&str, u64)]) -> LocalBatch {
    LocalBatch::new(
        files
            .iter()
            .map(|(name, size)| LocalFile {
                path: PathBuf::from("/nonexistent").join(name),
                name: name.to_string(),
                size: *size,
                file_type: crate::OCTET_STREAM.to_string(),
                sha256: None,
            })
            .collect(),
    )
    .unwrap()
}
