use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::Result;

const KILOBYTE: u64 = 1024;
const MEGABYTE: u64 = 1024 * KILOBYTE;
const BUFFER_CAPACITY: usize = 512 * KILOBYTE as usize;

/// Lowercase hex SHA-256 of the file contents, as receivers compare it.
pub fn sha256_file<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let file_path = file_path.as_ref();
    let source = fs::OpenOptions::new().read(true).open(file_path)?;
    log::trace!(
        "Calculating sha256 of {} (given size is {} megabytes)",
        file_path.display(),
        source.metadata()?.len() / MEGABYTE
    );

    let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, source);
    let mut hasher = Sha256::new();
    let mut bytes_read: u64 = 0;
    loop {
        let buffer = reader.fill_buf()?;
        let bytes_read_iteration = buffer.len();
        if bytes_read_iteration == 0 {
            break;
        }
        hasher.update(buffer);
        reader.consume(bytes_read_iteration);
        bytes_read += bytes_read_iteration as u64;
    }

    let digest = hex::encode(hasher.finalize());
    log::trace!("{} bytes has been read", bytes_read);
    log::trace!("sha256: {}", digest);
    Ok(digest)
}
