//! Sender side of the LocalSend v2 HTTP upload protocol.
//!
//! A batch goes through two phases:
//! - prepare-upload: the sender's [`PeerInfo`] and a description of every
//!   offered file are posted to the receiver, which answers with a session id
//!   and one single-use token per file it accepts;
//! - upload: every accepted file is streamed, one after another, to the
//!   upload endpoint using the session id and its token.
//!
//! [`TransferOrchestrator`] drives both phases for one batch and reports
//! skipped files and progress to a [`TransferSubscriber`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use localsend_core::{
//!     send_files, ChannelSubscriber, ClientConfig, PeerInfo, Protocol,
//!     SendFilesRequest,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> localsend_core::Result<()> {
//! let (sender, _events) = tokio::sync::mpsc::unbounded_channel();
//! let request = SendFilesRequest {
//!     address: "192.168.1.23".into(),
//!     port: None,
//!     protocol: Protocol::Http,
//!     info: PeerInfo::new("Laptop".into(), "fingerprint".into(), 53317),
//!     files: vec!["/tmp/report.pdf".into()],
//!     compute_sha256: false,
//!     config: ClientConfig::default(),
//! };
//! send_files(request, Arc::new(ChannelSubscriber::new(sender)), CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
mod errors;
pub mod file;
pub mod hash;
pub mod model;
pub mod negotiate;
pub mod orchestrator;
pub mod partition;
pub mod progress;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{HttpPeerClient, PeerClient, RawResponse, Target, TransportError};
pub use config::ClientConfig;
pub use errors::{Result, TransferError, UploadFailure};
pub use file::{LocalBatch, LocalFile};
pub use model::{
    DeviceType, FileDescriptor, NegotiationRequest, NegotiationResponse,
    PeerInfo, Protocol, UploadToken,
};
pub use orchestrator::{
    send_files, BatchState, SendFilesRequest, TransferOrchestrator,
};
pub use partition::{partition, Partition};
pub use progress::{
    ChannelSubscriber, ProgressEvent, ProgressReporter, TransferEvent,
    TransferSubscriber,
};

pub const DEFAULT_PORT: u16 = 53317;
pub const PROTOCOL_VERSION: &str = "2.0";
pub const OCTET_STREAM: &str = "application/octet-stream";
