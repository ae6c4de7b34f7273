//! Wire types of the LocalSend v2 upload API.
//!
//! Field names follow the JSON the receivers expect (camelCase). Optional
//! fields are omitted from the payload rather than sent as `null`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::PROTOCOL_VERSION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn scheme(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Protocol::Http
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Desktop,
    Web,
    Headless,
    Server,
}

/// Identity the sender presents to the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerInfo {
    pub alias: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
    pub fingerprint: String,
    pub port: u16,
    pub protocol: Protocol,
    pub download: bool,
}

impl PeerInfo {
    pub fn new(alias: String, fingerprint: String, port: u16) -> Self {
        Self {
            alias,
            version: PROTOCOL_VERSION.to_string(),
            device_model: None,
            device_type: None,
            fingerprint,
            port,
            protocol: Protocol::default(),
            download: false,
        }
    }

    pub fn with_device(
        mut self,
        model: Option<String>,
        device_type: DeviceType,
    ) -> Self {
        self.device_model = model;
        self.device_type = Some(device_type);
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }
}

/// One candidate file offered to the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub id: String,
    pub file_name: String,
    pub size: u64,
    pub file_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NegotiationRequest<'a> {
    pub info: &'a PeerInfo,
    pub files: &'a IndexMap<String, FileDescriptor>,
}

/// Body of a successful prepare-upload answer. `files` keeps the order the
/// receiver enumerated, which is the order uploads happen in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationResponse {
    pub session_id: String,
    #[serde(default)]
    pub files: IndexMap<String, String>,
}

impl NegotiationResponse {
    pub fn token(&self, file_id: &str) -> Option<UploadToken> {
        self.files.get(file_id).map(|token| UploadToken {
            session_id: self.session_id.clone(),
            file_id: file_id.to_string(),
            token: token.clone(),
        })
    }
}

/// Authorization to upload one file in one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadToken {
    pub session_id: String,
    pub file_id: String,
    pub token: String,
}
