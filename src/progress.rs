use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::orchestrator::BatchState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub file_id: String,
    pub sent: u64,
    pub total: u64,
}

/// Receives everything a batch reports while it runs.
///
/// Callbacks are invoked from the task driving the transfer and must not
/// block.
pub trait TransferSubscriber: Send + Sync {
    /// Called at most once, before the first upload, with the ids the
    /// receiver declined.
    fn notify_skipped(&self, file_ids: &[String]);
    fn notify_progress(&self, event: ProgressEvent);
    fn notify_state(&self, _state: &BatchState) {}
}

/// Everything a [`ChannelSubscriber`] forwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    Skipped(Vec<String>),
    Progress(ProgressEvent),
    State(BatchState),
}

/// Forwards events into an unbounded channel, for consumers living on
/// another task.
pub struct ChannelSubscriber {
    sender: UnboundedSender<TransferEvent>,
}

impl ChannelSubscriber {
    pub fn new(sender: UnboundedSender<TransferEvent>) -> Self {
        Self { sender }
    }
}

impl TransferSubscriber for ChannelSubscriber {
    fn notify_skipped(&self, file_ids: &[String]) {
        let _ = self
            .sender
            .send(TransferEvent::Skipped(file_ids.to_vec()));
    }

    fn notify_progress(&self, event: ProgressEvent) {
        let _ = self.sender.send(TransferEvent::Progress(event));
    }

    fn notify_state(&self, state: &BatchState) {
        let _ = self.sender.send(TransferEvent::State(state.clone()));
    }
}

/// Turns raw "bytes handed to the transport" counts for one file into
/// progress events.
///
/// Reported values never decrease and stay below the declared size until
/// [`ProgressReporter::finish`] emits the size itself, exactly once.
#[derive(Clone)]
pub struct ProgressReporter {
    inner: Arc<ReporterState>,
}

struct ReporterState {
    file_id: String,
    total: u64,
    last: AtomicU64,
    finished: AtomicBool,
    subscriber: Arc<dyn TransferSubscriber>,
}

impl ProgressReporter {
    pub fn new(
        file_id: String,
        total: u64,
        subscriber: Arc<dyn TransferSubscriber>,
    ) -> Self {
        Self {
            inner: Arc::new(ReporterState {
                file_id,
                total,
                last: AtomicU64::new(0),
                finished: AtomicBool::new(false),
                subscriber,
            }),
        }
    }

    pub fn file_id(&self) -> &str {
        &self.inner.file_id
    }

    pub fn total(&self) -> u64 {
        self.inner.total
    }

    /// Records that `sent` bytes of the file have been transmitted so far.
    pub fn report(&self, sent: u64) {
        let state = &self.inner;
        if sent >= state.total || state.finished.load(Ordering::Acquire) {
            return;
        }
        let previous = state.last.fetch_max(sent, Ordering::AcqRel);
        if sent > previous {
            log::trace!(
                "file {}: {}/{} bytes sent",
                state.file_id,
                sent,
                state.total
            );
            state.subscriber.notify_progress(ProgressEvent {
                file_id: state.file_id.clone(),
                sent,
                total: state.total,
            });
        }
    }

    /// Emits the full size. Later calls, and later `report`s, are ignored.
    pub fn finish(&self) {
        let state = &self.inner;
        if state.finished.swap(true, Ordering::AcqRel) {
            return;
        }
        state.last.store(state.total, Ordering::Release);
        state.subscriber.notify_progress(ProgressEvent {
            file_id: state.file_id.clone(),
            sent: state.total,
            total: state.total,
        });
    }
}
