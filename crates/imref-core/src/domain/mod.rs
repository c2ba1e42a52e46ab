//! Domain models for imref
//!
//! Canonical representations of the entities moving through the import
//! pipeline, independent of the raw shapes the Zotero transport produces.

mod collection;
mod library;
mod record;

pub use collection::{CollectionInfo, CollectionWithPath};
pub use library::{LibraryContext, LibraryKind, WEB_URI_BASE};
pub use record::{format_creator_list, Attachment, Creator, RemoteRecord};
