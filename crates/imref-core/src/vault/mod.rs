//! Local document store contract
//!
//! The note vault is host territory; the pipeline only reads, writes, and
//! probes documents through this interface. [`FsVault`] is the stock
//! filesystem-backed implementation.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::remote::BoxFuture;

/// Document store error
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        VaultError::Io(err.to_string())
    }
}

/// Abstract note vault
pub trait Vault: Send + Sync {
    /// Read a document; `None` when it does not exist
    fn read_document<'a>(
        &'a self,
        path: &'a Path,
    ) -> BoxFuture<'a, Result<Option<String>, VaultError>>;

    /// Create or overwrite a document, creating missing parent
    /// directories first
    fn write_document<'a>(
        &'a self,
        path: &'a Path,
        text: &'a str,
    ) -> BoxFuture<'a, Result<(), VaultError>>;

    /// Whether a document exists at the path
    fn document_exists<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<bool, VaultError>>;

    /// Open the document in the host interface. Hosts without an
    /// interface ignore this.
    fn open_document<'a>(&'a self, _path: &'a Path) -> BoxFuture<'a, Result<(), VaultError>> {
        Box::pin(async { Ok(()) })
    }
}

/// Filesystem-backed vault rooted at a directory
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl Vault for FsVault {
    fn read_document<'a>(
        &'a self,
        path: &'a Path,
    ) -> BoxFuture<'a, Result<Option<String>, VaultError>> {
        Box::pin(async move {
            match std::fs::read_to_string(self.resolve(path)) {
                Ok(text) => Ok(Some(text)),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            }
        })
    }

    fn write_document<'a>(
        &'a self,
        path: &'a Path,
        text: &'a str,
    ) -> BoxFuture<'a, Result<(), VaultError>> {
        Box::pin(async move {
            let full = self.resolve(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(full, text)?;
            Ok(())
        })
    }

    fn document_exists<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<bool, VaultError>> {
        Box::pin(async move { Ok(self.resolve(path).exists()) })
    }
}
