//! Collection path resolution
//!
//! Resolves collection keys to their full hierarchical paths by walking
//! parent links upward. Fetched collection records are cached for the
//! lifetime of the resolver, concurrent fetches for the same key are
//! de-duplicated onto one in-flight request, and a per-path visiting set
//! guarantees termination when remote data contains parent cycles.
//!
//! One resolver is meant to live for one import invocation; a fresh import
//! gets a fresh cache so collection renames show up.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::domain::{CollectionInfo, CollectionWithPath};
use crate::normalize::normalize_collection;
use crate::remote::{RemoteError, RemoteLibrary};

/// Separator between path segments
pub const PATH_SEPARATOR: &str = "/";

/// Upward walks never ascend past this many ancestors, even if cycle
/// detection were somehow defeated.
const MAX_ANCESTRY_DEPTH: usize = 64;

type CachedInfo = Arc<OnceCell<Option<CollectionInfo>>>;

pub struct CollectionPathResolver {
    remote: Arc<dyn RemoteLibrary>,
    entries: Mutex<HashMap<String, CachedInfo>>,
}

impl CollectionPathResolver {
    pub fn new(remote: Arc<dyn RemoteLibrary>) -> Self {
        Self {
            remote,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve each requested key to its root-to-leaf path.
    ///
    /// Empty keys are filtered out, duplicates are resolved once, and the
    /// result order matches the de-duplicated input order.
    pub async fn resolve_paths(
        &self,
        keys: &[String],
    ) -> Result<Vec<CollectionWithPath>, RemoteError> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        for key in keys {
            let key = key.trim();
            if key.is_empty() || !seen.insert(key.to_string()) {
                continue;
            }
            resolved.push(self.full_path(key).await?);
        }
        Ok(resolved)
    }

    /// Fetch (or reuse) one collection record. Concurrent callers for the
    /// same key share a single in-flight fetch.
    async fn info(&self, key: &str) -> Result<Option<CollectionInfo>, RemoteError> {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };
        cell.get_or_try_init(|| async {
            match self.remote.fetch_collection(key).await? {
                Some(raw) => Ok(Some(normalize_collection(&raw)?)),
                None => Ok(None),
            }
        })
        .await
        .cloned()
    }

    async fn full_path(&self, key: &str) -> Result<CollectionWithPath, RemoteError> {
        let mut visiting: HashSet<String> = HashSet::new();
        let mut segments: Vec<String> = Vec::new();
        let mut leaf_name: Option<String> = None;
        let mut current = key.to_string();

        loop {
            if !visiting.insert(current.clone()) {
                // Parent cycle: terminate the path with the repeated key's
                // identifier instead of ascending forever.
                segments.insert(0, current);
                break;
            }
            if visiting.len() > MAX_ANCESTRY_DEPTH {
                tracing::warn!(key, "collection ancestry exceeds depth cap");
                break;
            }
            match self.info(&current).await? {
                Some(info) => {
                    segments.insert(0, info.name.clone());
                    leaf_name.get_or_insert(info.name);
                    match info.parent {
                        Some(parent) => current = parent,
                        None => break,
                    }
                }
                None => {
                    // Unknown node: its identifier stands in for the name
                    // and nothing above it is knowable.
                    segments.insert(0, current);
                    break;
                }
            }
        }

        Ok(CollectionWithPath {
            key: key.to_string(),
            name: leaf_name.unwrap_or_else(|| key.to_string()),
            full_path: segments.join(PATH_SEPARATOR),
        })
    }
}
