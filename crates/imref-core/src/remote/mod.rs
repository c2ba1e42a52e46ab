//! Remote library transport contract
//!
//! The HTTP transport itself lives in the host; this module defines the
//! abstract interface the pipeline consumes, plus the raw payload wrapper
//! the normalizer reads through.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use thiserror::Error;

/// Boxed future alias used by all collaborator traits, keeping them
/// object-safe behind `Arc<dyn ...>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Remote transport error
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("request failed: {message}")]
    RequestFailed { message: String },

    #[error("rate limited")]
    RateLimited,

    #[error("parse error: {message}")]
    Parse { message: String },
}

impl RemoteError {
    pub fn parse(message: impl Into<String>) -> Self {
        RemoteError::Parse {
            message: message.into(),
        }
    }
}

/// One raw payload from the remote service.
///
/// The transport returns items in several inconsistent shapes: fields may
/// sit at the top level, under a `data` sub-object, or (for fields the
/// transport occasionally relocates) under `meta`. Accessors here walk
/// ordered lists of paths so the fallback order is data, not scattered
/// conditionals.
#[derive(Clone, Debug, PartialEq)]
pub struct RawItem(Value);

impl RawItem {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Walk one accessor path into the payload
    pub fn at(&self, path: &[&str]) -> Option<&Value> {
        let mut current = &self.0;
        for segment in path {
            current = current.get(segment)?;
        }
        Some(current)
    }

    /// First value found along the ordered accessor paths
    pub fn first_value(&self, paths: &[&[&str]]) -> Option<&Value> {
        paths.iter().find_map(|path| self.at(path))
    }

    /// First non-empty string found along the ordered accessor paths
    pub fn first_str(&self, paths: &[&[&str]]) -> Option<&str> {
        paths.iter().find_map(|path| {
            self.at(path)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
    }
}

impl From<Value> for RawItem {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Abstract remote reference-manager service.
///
/// Timeouts and retries are the transport's responsibility; this layer
/// imposes neither.
pub trait RemoteLibrary: Send + Sync {
    /// Search the library by term
    fn search<'a>(&'a self, term: &'a str) -> BoxFuture<'a, Result<Vec<RawItem>, RemoteError>>;

    /// Fetch the full detail record for an item key
    fn fetch_detail<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<RawItem>, RemoteError>>;

    /// Fetch the child items (notes, attachments) of an item key
    fn fetch_children<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Vec<RawItem>, RemoteError>>;

    /// Fetch one collection record by key
    fn fetch_collection<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<RawItem>, RemoteError>>;
}
