use std::time::Duration;

use crate::DEFAULT_PORT;

/// Knobs for the HTTP side of a transfer.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub default_port: u16,
    pub connect_timeout: Duration,
    /// Upper bound for the whole prepare-upload exchange.
    pub negotiation_timeout: Duration,
    /// Upper bound for a single file upload. `None` lets large bodies take
    /// as long as they need.
    pub upload_timeout: Option<Duration>,
    pub chunk_size: usize,
    /// LocalSend receivers serve https with self-signed certificates.
    pub accept_self_signed: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_port: DEFAULT_PORT,
            connect_timeout: Duration::from_secs(5),
            negotiation_timeout: Duration::from_secs(30),
            upload_timeout: None,
            chunk_size: 64 * KILOBYTE,
            accept_self_signed: true,
        }
    }
}

impl ClientConfig {
    pub fn lan() -> Self {
        Self {
            connect_timeout: Duration::from_secs(2),
            chunk_size: MEGABYTE,
            ..Self::default()
        }
    }

    pub fn slow_network() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            negotiation_timeout: Duration::from_secs(120),
            chunk_size: 16 * KILOBYTE,
            ..Self::default()
        }
    }

    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }
}

const KILOBYTE: usize = 1024;
const MEGABYTE: usize = 1024 * KILOBYTE;
