use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::client::{HttpPeerClient, PeerClient, Target};
use crate::config::ClientConfig;
use crate::file::LocalBatch;
use crate::model::{PeerInfo, Protocol};
use crate::negotiate::negotiate;
use crate::partition::partition;
use crate::progress::TransferSubscriber;
use crate::upload::UploadDriver;
use crate::{Result, TransferError};

/// Where a batch is in its negotiate → upload lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Negotiating,
    /// The receiver answered 400, 403 or 500.
    Rejected,
    Unreachable,
    NoTransferNeeded,
    Partitioned { accepted: usize, skipped: usize },
    Uploading { index: usize, file_id: String },
    Completed,
    Failed,
}

impl BatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchState::Rejected
                | BatchState::Unreachable
                | BatchState::NoTransferNeeded
                | BatchState::Completed
                | BatchState::Failed
        )
    }

    fn after_negotiation_error(error: &TransferError) -> Self {
        match error {
            TransferError::NoTransferNeeded => BatchState::NoTransferNeeded,
            TransferError::Unreachable { .. } => BatchState::Unreachable,
            TransferError::InvalidRequest
            | TransferError::TransferRejected
            | TransferError::ReceiverError => BatchState::Rejected,
            _ => BatchState::Failed,
        }
    }
}

/// Sends one batch of files to one peer.
///
/// The orchestrator is consumed by [`TransferOrchestrator::run`]: session
/// tokens are single-use, so a failed batch is retried by building a new
/// orchestrator and negotiating again.
pub struct TransferOrchestrator {
    client: Arc<dyn PeerClient>,
    target: Target,
    info: PeerInfo,
    batch: LocalBatch,
    subscriber: Arc<dyn TransferSubscriber>,
    cancel: CancellationToken,
    state: BatchState,
}

impl TransferOrchestrator {
    pub fn new(
        client: Arc<dyn PeerClient>,
        target: Target,
        info: PeerInfo,
        batch: LocalBatch,
        subscriber: Arc<dyn TransferSubscriber>,
    ) -> Self {
        Self {
            client,
            target,
            info,
            batch,
            subscriber,
            cancel: CancellationToken::new(),
            state: BatchState::Idle,
        }
    }

    /// Ties the batch to an externally owned token, e.g. a child of an
    /// application-wide shutdown token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Cancelling this token abandons the upload in flight and stops the
    /// batch with [`TransferError::Cancelled`].
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    pub fn batch(&self) -> &LocalBatch {
        &self.batch
    }

    fn transition(&mut self, state: BatchState) {
        log::debug!(
            "batch to {}:{}: {:?} -> {:?}",
            self.target.address,
            self.target.port,
            self.state,
            state
        );
        self.subscriber.notify_state(&state);
        self.state = state;
    }

    pub async fn run(mut self) -> Result<()> {
        log::info!(
            "Starting file transfer with {} files to {}:{}",
            self.batch.len(),
            self.target.address,
            self.target.port
        );

        self.transition(BatchState::Negotiating);
        let descriptors = self.batch.descriptors();
        let negotiated = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(TransferError::Cancelled { file_id: None }),
            negotiated = negotiate(
                self.client.as_ref(),
                &self.target,
                &self.info,
                &descriptors,
            ) => negotiated,
        };
        let session = match negotiated {
            Ok(session) => session,
            Err(e) => {
                self.transition(BatchState::after_negotiation_error(&e));
                return Err(e);
            }
        };

        let split = partition(self.batch.ids(), &session);
        self.transition(BatchState::Partitioned {
            accepted: split.accepted.len(),
            skipped: split.skipped.len(),
        });
        if !split.skipped.is_empty() {
            log::info!("Receiver skipped files: {:?}", split.skipped);
            self.subscriber.notify_skipped(&split.skipped);
        }

        let client = self.client.clone();
        let subscriber = self.subscriber.clone();
        let cancel = self.cancel.clone();
        let target = self.target.clone();
        let batch = self.batch.clone();
        let driver = UploadDriver::new(
            client.as_ref(),
            &target,
            &session,
            &batch,
            subscriber,
            cancel,
        );

        let uploaded = driver
            .upload_all(&split.accepted, |index, file_id| {
                self.transition(BatchState::Uploading {
                    index,
                    file_id: file_id.to_string(),
                })
            })
            .await;

        match uploaded {
            Ok(()) => {
                self.transition(BatchState::Completed);
                log::info!("All files uploaded successfully");
                Ok(())
            }
            Err(e) => {
                self.transition(BatchState::Failed);
                Err(e)
            }
        }
    }
}

/// Everything needed to send local files to a resolved peer over HTTP.
#[derive(Debug, Clone)]
pub struct SendFilesRequest {
    pub address: String,
    /// Falls back to [`ClientConfig::default_port`].
    pub port: Option<u16>,
    pub protocol: Protocol,
    pub info: PeerInfo,
    pub files: Vec<PathBuf>,
    pub compute_sha256: bool,
    pub config: ClientConfig,
}

pub async fn send_files(
    request: SendFilesRequest,
    subscriber: Arc<dyn TransferSubscriber>,
    cancel: CancellationToken,
) -> Result<()> {
    let port = request.port.unwrap_or(request.config.default_port);
    let target = Target::new(request.address, port).with_protocol(request.protocol);
    let batch =
        LocalBatch::from_paths(request.files.as_slice(), request.compute_sha256).await?;
    let client = HttpPeerClient::new(request.config)?;

    TransferOrchestrator::new(
        Arc::new(client),
        target,
        request.info,
        batch,
        subscriber,
    )
    .with_cancellation(cancel)
    .run()
    .await
}
