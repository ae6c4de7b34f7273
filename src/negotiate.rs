//! The prepare-upload phase: announce the sender and the candidate files,
//! and turn whatever the receiver answers into a session or a typed failure.

use indexmap::IndexMap;

use crate::client::{PeerClient, RawResponse, Target};
use crate::model::{
    FileDescriptor, NegotiationRequest, NegotiationResponse, PeerInfo,
};
use crate::{Result, TransferError};

pub async fn negotiate<C: PeerClient + ?Sized>(
    client: &C,
    target: &Target,
    info: &PeerInfo,
    files: &IndexMap<String, FileDescriptor>,
) -> Result<NegotiationResponse> {
    if files.is_empty() {
        return Err(TransferError::EmptyBatch);
    }
    debug_assert!(files.iter().all(|(id, file)| id == &file.id));

    let request = NegotiationRequest { info, files };
    let raw = client
        .prepare_upload(target, &request)
        .await
        .map_err(|e| unreachable_error(target, e.to_string()))?;

    let response = interpret_prepare_response(target, &raw)?;
    log::debug!(
        "Prepare upload response: session {} accepted {} of {} files",
        response.session_id,
        response.files.len(),
        files.len()
    );
    Ok(response)
}

/// Maps a prepare-upload answer to its outcome. 204 is checked before the
/// generic 2xx branch because it carries no body.
pub fn interpret_prepare_response(
    target: &Target,
    raw: &RawResponse,
) -> Result<NegotiationResponse> {
    match raw.status {
        204 => Err(TransferError::NoTransferNeeded),
        200..=299 => serde_json::from_slice(&raw.body).map_err(|e| {
            unreachable_error(target, format!("invalid prepare-upload response: {}", e))
        }),
        400 => Err(TransferError::InvalidRequest),
        403 => Err(TransferError::TransferRejected),
        500 => Err(TransferError::ReceiverError),
        status => Err(unreachable_error(
            target,
            format!("Failed to prepare upload: {}", status),
        )),
    }
}

fn unreachable_error(target: &Target, cause: String) -> TransferError {
    log::warn!(
        "Failed to prepare upload with {}:{}: {}",
        target.address,
        target.port,
        cause
    );
    TransferError::Unreachable {
        address: target.address.clone(),
        port: target.port,
        cause,
    }
}
