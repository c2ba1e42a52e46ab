//! Canonical bibliographic record fetched from the remote library

use serde::{Deserialize, Serialize};

/// One creator of a remote record. Order within a record reflects
/// authorship order.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Creator {
    pub last_name: String,
    pub first_name: Option<String>,
}

impl Creator {
    pub fn new(last_name: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            first_name: None,
        }
    }

    /// Builder method to add a first name
    pub fn with_first_name(mut self, first: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self
    }

    /// Format as "Last, First" for display; bare last name when no first
    /// name is present.
    pub fn display_name(&self) -> String {
        match self.first_name.as_deref().map(str::trim) {
            Some(first) if !first.is_empty() => format!("{}, {}", self.last_name, first),
            _ => self.last_name.clone(),
        }
    }
}

/// Join creators as `Last, First; Last, First`, omitting creators with no
/// usable name at all.
pub fn format_creator_list(creators: &[Creator]) -> String {
    creators
        .iter()
        .filter(|c| !c.last_name.trim().is_empty() || c.first_name.is_some())
        .map(Creator::display_name)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A child attachment of a remote record
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub key: String,
    pub title: Option<String>,
}

/// Canonical representation of one bibliographic item.
///
/// `key` is the stable remote identifier and is always present; every
/// other field is best-effort and may be absent depending on which raw
/// shape the record arrived in.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RemoteRecord {
    pub key: String,
    pub title: Option<String>,
    pub item_type: Option<String>,
    pub creators: Vec<Creator>,
    pub date: Option<String>,
    pub cite_key: Option<String>,
    pub citation: Option<String>,
    pub bibliography: Option<String>,
    pub collections: Vec<String>,
}

impl RemoteRecord {
    /// Create a record carrying only its key
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: None,
            item_type: None,
            creators: Vec::new(),
            date: None,
            cite_key: None,
            citation: None,
            bibliography: None,
            collections: Vec::new(),
        }
    }
}
