//! Collection hierarchy representation

use serde::{Deserialize, Serialize};

/// One node in a collection hierarchy.
///
/// The parent relation forms a forest in well-behaved libraries, but
/// inconsistent remote data can introduce cycles; consumers must not
/// assume the chain is acyclic.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionInfo {
    pub key: String,
    /// Display label; defaults to `key` when the remote record carries none.
    pub name: String,
    /// Absent for root collections.
    pub parent: Option<String>,
}

impl CollectionInfo {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            parent: None,
        }
    }

    /// Builder method to place this collection under a parent
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// A collection together with its resolved hierarchical path,
/// root-to-leaf names joined with `/`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionWithPath {
    pub key: String,
    pub name: String,
    pub full_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_with_parent() {
        let child = CollectionInfo::new("B", "Reading").with_parent("A");
        assert_eq!(child.parent, Some("A".to_string()));
    }
}
