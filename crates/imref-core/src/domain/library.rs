//! Remote library identity

use serde::{Deserialize, Serialize};

/// Base of the web URI space for remote items
pub const WEB_URI_BASE: &str = "http://zotero.org/";

/// Ownership of a remote library
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LibraryKind {
    User,
    Group,
}

impl LibraryKind {
    /// URI path segment for this library kind
    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryKind::User => "users",
            LibraryKind::Group => "groups",
        }
    }
}

/// Identity of the remote library an import runs against
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryContext {
    pub kind: LibraryKind,
    pub id: u64,
}

impl LibraryContext {
    pub fn new(kind: LibraryKind, id: u64) -> Self {
        Self { kind, id }
    }

    /// Canonical web URI for an item in this library. Every other
    /// link-like field the pipeline produces is derived from this one.
    pub fn item_uri(&self, key: &str) -> String {
        format!("{}{}/{}/items/{}", WEB_URI_BASE, self.kind.as_str(), self.id, key)
    }
}
