//! Template input construction
//!
//! Combines a normalized record, its notes and attachments, its resolved
//! collection paths, and import-history metadata into the flat document
//! the rendering step consumes. Building is pure: identical inputs always
//! produce identical output, and the rendering engine itself lives in the
//! host.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    format_creator_list, Attachment, CollectionWithPath, Creator, LibraryContext, RemoteRecord,
    WEB_URI_BASE,
};

/// The flat document fed to template rendering.
///
/// Constructed fresh per import attempt and never mutated afterwards.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TemplateInput {
    pub key: String,
    pub title: Option<String>,
    pub item_type: Option<String>,
    pub creators: Vec<Creator>,
    /// Creators pre-formatted for display as `Last, First; Last, First`
    pub authors: String,
    pub date: Option<String>,
    pub cite_key: Option<String>,
    pub citation: Option<String>,
    pub bibliography: Option<String>,
    pub collections: Vec<CollectionWithPath>,
    pub notes: Vec<String>,
    pub attachments: Vec<Attachment>,
    pub annotations: Vec<String>,
    /// Canonical web URI of the item
    pub uri: String,
    /// Link opening the item in the desktop client's list
    pub select_uri: String,
    /// Link opening the item itself in the desktop client
    pub desktop_uri: String,
    /// Vault path of the pre-existing local document, on re-import
    pub source_path: Option<String>,
    pub last_import_date: DateTime<Utc>,
    pub is_first_import: bool,
}

/// Rewrite the canonical web URI into a desktop-client link. Both
/// link-like fields go through this one function so they cannot diverge
/// from the URI they derive from.
fn app_link(uri: &str, action: &str) -> String {
    let tail = uri.strip_prefix(WEB_URI_BASE).unwrap_or(uri);
    format!("zotero://{}/{}", action, tail)
}

/// Build the template input for one import attempt.
///
/// `is_first_import` is computed from `last_import` alone: it is true iff
/// the timestamp is the epoch sentinel used for never-imported documents.
#[allow(clippy::too_many_arguments)]
pub fn build_template_input(
    source_path: Option<&str>,
    record: &RemoteRecord,
    notes: &[String],
    attachments: &[Attachment],
    collections: &[CollectionWithPath],
    last_import: DateTime<Utc>,
    library: &LibraryContext,
) -> TemplateInput {
    let uri = library.item_uri(&record.key);
    let select_uri = app_link(&uri, "select");
    let desktop_uri = app_link(&uri, "open");

    TemplateInput {
        key: record.key.clone(),
        title: record.title.clone(),
        item_type: record.item_type.clone(),
        authors: format_creator_list(&record.creators),
        creators: record.creators.clone(),
        date: record.date.clone(),
        cite_key: record.cite_key.clone(),
        citation: record.citation.clone(),
        bibliography: record.bibliography.clone(),
        collections: collections.to_vec(),
        notes: notes.to_vec(),
        attachments: attachments.to_vec(),
        annotations: Vec::new(),
        uri,
        select_uri,
        desktop_uri,
        source_path: source_path.map(str::to_string),
        last_import_date: last_import,
        is_first_import: last_import == DateTime::UNIX_EPOCH,
    }
}
