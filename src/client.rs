use std::net::Ipv6Addr;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Body;
use thiserror::Error;
use tokio_util::io::ReaderStream;
use url::Url;

use crate::config::ClientConfig;
use crate::file::LocalFile;
use crate::model::{NegotiationRequest, Protocol, UploadToken};
use crate::progress::ProgressReporter;
use crate::{Result, TransferError, OCTET_STREAM};

pub const PREPARE_UPLOAD_PATH: &str = "/api/localsend/v2/prepare-upload";
pub const UPLOAD_PATH: &str = "/api/localsend/v2/upload";

/// The request never produced an HTTP response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError(e.to_string())
    }
}

/// Status and body of a prepare-upload exchange, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// The receiving peer, as resolved by whoever discovered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub address: String,
    pub port: u16,
    pub protocol: Protocol,
}

impl Target {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
            protocol: Protocol::Http,
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    fn base_url(&self) -> std::result::Result<Url, TransportError> {
        let host = if self.address.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", self.address)
        } else {
            self.address.clone()
        };
        let raw = format!("{}://{}:{}", self.protocol.scheme(), host, self.port);
        Url::parse(&raw)
            .map_err(|e| TransportError(format!("invalid address {}: {}", raw, e)))
    }

    pub fn prepare_upload_url(&self) -> std::result::Result<Url, TransportError> {
        self.base_url()?.join(PREPARE_UPLOAD_PATH).map_err(|e| {
            TransportError(format!("invalid prepare-upload url: {}", e))
        })
    }

    pub fn upload_url(
        &self,
        token: &UploadToken,
    ) -> std::result::Result<Url, TransportError> {
        let mut url = self
            .base_url()?
            .join(UPLOAD_PATH)
            .map_err(|e| TransportError(format!("invalid upload url: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("sessionId", &token.session_id)
            .append_pair("fileId", &token.file_id)
            .append_pair("token", &token.token);
        Ok(url)
    }
}

/// Network side of a transfer. The orchestrator owns all protocol decisions;
/// implementations only move bytes.
#[async_trait]
pub trait PeerClient: Send + Sync {
    async fn prepare_upload(
        &self,
        target: &Target,
        request: &NegotiationRequest<'_>,
    ) -> std::result::Result<RawResponse, TransportError>;

    /// Streams `file` and returns the status the receiver answered with.
    /// Implementations call `progress.report` as bytes leave.
    async fn upload(
        &self,
        target: &Target,
        token: &UploadToken,
        file: &LocalFile,
        progress: ProgressReporter,
    ) -> std::result::Result<u16, TransportError>;
}

/// [`PeerClient`] over plain reqwest.
pub struct HttpPeerClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpPeerClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .danger_accept_invalid_certs(config.accept_self_signed)
            // A followed redirect turns the upload into a body-less GET.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TransferError::ClientSetup(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl PeerClient for HttpPeerClient {
    async fn prepare_upload(
        &self,
        target: &Target,
        request: &NegotiationRequest<'_>,
    ) -> std::result::Result<RawResponse, TransportError> {
        let url = target.prepare_upload_url()?;
        log::debug!("Sending prepare-upload request to: {}", url);

        let response = self
            .client
            .post(url)
            .timeout(self.config.negotiation_timeout)
            .json(request)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { status, body })
    }

    async fn upload(
        &self,
        target: &Target,
        token: &UploadToken,
        file: &LocalFile,
        progress: ProgressReporter,
    ) -> std::result::Result<u16, TransportError> {
        let url = target.upload_url(token)?;
        log::debug!("Uploading file: {} to {}", file.name, url);

        let source = tokio::fs::File::open(&file.path).await.map_err(|e| {
            TransportError(format!(
                "failed to open {}: {}",
                file.path.display(),
                e
            ))
        })?;
        let mut sent: u64 = 0;
        let stream = ReaderStream::with_capacity(source, self.config.chunk_size)
            .map(move |chunk| {
                if let Ok(bytes) = &chunk {
                    sent += bytes.len() as u64;
                    progress.report(sent);
                }
                chunk
            });

        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .header(CONTENT_LENGTH, file.size)
            .body(Body::wrap_stream(stream));
        if let Some(timeout) = self.config.upload_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        Ok(response.status().as_u16())
    }
}
