use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::client::{PeerClient, Target};
use crate::errors::UploadFailure;
use crate::file::LocalBatch;
use crate::model::NegotiationResponse;
use crate::progress::{ProgressReporter, TransferSubscriber};
use crate::{Result, TransferError};

/// Streams the accepted files of one negotiated session, one at a time.
pub struct UploadDriver<'a, C: PeerClient + ?Sized> {
    client: &'a C,
    target: &'a Target,
    session: &'a NegotiationResponse,
    batch: &'a LocalBatch,
    subscriber: Arc<dyn TransferSubscriber>,
    cancel: CancellationToken,
}

impl<'a, C: PeerClient + ?Sized> UploadDriver<'a, C> {
    pub fn new(
        client: &'a C,
        target: &'a Target,
        session: &'a NegotiationResponse,
        batch: &'a LocalBatch,
        subscriber: Arc<dyn TransferSubscriber>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            target,
            session,
            batch,
            subscriber,
            cancel,
        }
    }

    /// Uploads `accepted` in order and stops at the first failure.
    /// `on_start` runs right before each file goes out.
    pub async fn upload_all<F>(
        &self,
        accepted: &[String],
        mut on_start: F,
    ) -> Result<()>
    where
        F: FnMut(usize, &str),
    {
        for (index, file_id) in accepted.iter().enumerate() {
            on_start(index, file_id);
            self.upload_one(file_id).await?;
        }
        Ok(())
    }

    pub async fn upload_one(&self, file_id: &str) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(TransferError::Cancelled {
                file_id: Some(file_id.to_string()),
            });
        }

        let (file, token) =
            match (self.batch.get(file_id), self.session.token(file_id)) {
                (Some(file), Some(token)) => (file, token),
                _ => {
                    return Err(TransferError::UploadFailed {
                        file_id: file_id.to_string(),
                        file_name: self
                            .batch
                            .get(file_id)
                            .map(|f| f.name.clone())
                            .unwrap_or_default(),
                        failure: UploadFailure::Transport(
                            "file is not part of this session".to_string(),
                        ),
                    })
                }
            };

        log::info!("Uploading file: {}", file.name);
        let reporter = ProgressReporter::new(
            file_id.to_string(),
            file.size,
            self.subscriber.clone(),
        );

        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                log::info!("Upload of {} cancelled", file.name);
                return Err(TransferError::Cancelled {
                    file_id: Some(file_id.to_string()),
                });
            }
            outcome = self.client.upload(self.target, &token, file, reporter.clone()) => outcome,
        };

        let failure = match outcome {
            Ok(200) => {
                reporter.finish();
                log::info!("File uploaded successfully: {}", file.name);
                return Ok(());
            }
            Ok(status) => UploadFailure::Rejected { status },
            Err(e) => UploadFailure::Transport(e.0),
        };

        log::error!("Failed to upload file {}: {}", file.name, failure);
        Err(TransferError::UploadFailed {
            file_id: file_id.to_string(),
            file_name: file.name.clone(),
            failure,
        })
    }
}
