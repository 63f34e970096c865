//! Filesystem-based Content-Addressable Storage

#![allow(clippy::result_large_err)]

use crate::cas::atomic::atomic_write;
use crate::cas::sharding::shard_path;
use crate::errors::{cas_collision, cas_missing, io_error, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// What a blob holds; decides its file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    Manifest,
    Torrent,
}

impl BlobKind {
    const ALL: [BlobKind; 2] = [BlobKind::Manifest, BlobKind::Torrent];

    fn extension(self) -> &'static str {
        match self {
            BlobKind::Manifest => "json",
            BlobKind::Torrent => "torrent",
        }
    }
}

/// Filesystem-based CAS store
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write content and return its SHA-256 digest
    ///
    /// Writing the same content twice is a no-op. Finding different bytes
    /// under the same digest is a collision error.
    pub fn write(&self, content: &[u8], kind: BlobKind) -> Result<String> {
        let digest = compute_digest(content);
        let target_path = shard_path(&self.root, &digest, kind.extension());

        if target_path.exists() {
            let existing = fs::read(&target_path).map_err(|e| io_error("read_cas", e))?;
            if existing == content {
                return Ok(digest);
            }
            return Err(cas_collision(&digest));
        }

        atomic_write(&target_path, content)?;
        Ok(digest)
    }

    /// Read content by digest
    ///
    /// # Errors
    ///
    /// `NotFound` if no blob of any kind is stored under `digest`.
    pub fn read(&self, digest: &str) -> Result<Vec<u8>> {
        for kind in BlobKind::ALL {
            let path = shard_path(&self.root, digest, kind.extension());
            if path.exists() {
                return fs::read(&path).map_err(|e| io_error("read_cas", e));
            }
        }
        Err(cas_missing(digest))
    }

    pub fn contains(&self, digest: &str) -> bool {
        BlobKind::ALL
            .iter()
            .any(|kind| shard_path(&self.root, digest, kind.extension()).exists())
    }
}

fn compute_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
