use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::hash::sha256_file;
use crate::model::FileDescriptor;
use crate::{Result, TransferError, OCTET_STREAM};

/// A file on the local disk that can be offered to a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub file_type: String,
    pub sha256: Option<String>,
}

impl LocalFile {
    /// Reads the metadata of `path`. The file itself is not opened until
    /// it is uploaded.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Path is not a file: {}", path.display()),
            )
            .into());
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Invalid file name: {}", path.display()),
                )
            })?
            .to_string();
        let file_type = mime_guess::from_path(&path)
            .first_raw()
            .unwrap_or(OCTET_STREAM)
            .to_string();

        Ok(Self {
            path,
            name,
            size: metadata.len(),
            file_type,
            sha256: None,
        })
    }

    /// Computes the content hash on the blocking pool and attaches it.
    pub async fn with_sha256(mut self) -> Result<Self> {
        let path = self.path.clone();
        let digest = tokio::task::spawn_blocking(move || sha256_file(path))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;
        self.sha256 = Some(digest);
        Ok(self)
    }

    pub fn descriptor(&self, id: &str) -> FileDescriptor {
        FileDescriptor {
            id: id.to_string(),
            file_name: self.name.clone(),
            size: self.size,
            file_type: self.file_type.clone(),
            sha256: self.sha256.clone(),
            preview: None,
        }
    }
}

/// The files of one transfer, keyed by their batch-scoped ids.
///
/// Ids are the positions in the original list (`"0"`, `"1"`, ...) so they are
/// unique regardless of file names.
#[derive(Debug, Clone)]
pub struct LocalBatch {
    files: IndexMap<String, LocalFile>,
}

impl LocalBatch {
    pub fn new(files: Vec<LocalFile>) -> Result<Self> {
        if files.is_empty() {
            return Err(TransferError::EmptyBatch);
        }
        let files = files
            .into_iter()
            .enumerate()
            .map(|(i, file)| (i.to_string(), file))
            .collect();
        Ok(Self { files })
    }

    pub async fn from_paths<P: AsRef<Path>>(
        paths: &[P],
        compute_sha256: bool,
    ) -> Result<Self> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let file = LocalFile::open(path).await?;
            let file = if compute_sha256 {
                file.with_sha256().await?
            } else {
                file
            };
            files.push(file);
        }
        Self::new(files)
    }

    pub fn descriptors(&self) -> IndexMap<String, FileDescriptor> {
        self.files
            .iter()
            .map(|(id, file)| (id.clone(), file.descriptor(id)))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&LocalFile> {
        self.files.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.files.values().map(|f| f.size).sum()
    }
}
