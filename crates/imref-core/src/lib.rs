//! imref-core: incremental Zotero-to-vault note import
//!
//! This library provides pure Rust implementations of:
//! - Raw remote record normalization (search hits, detail records,
//!   collection records in their several inconsistent shapes)
//! - Memoized, cycle-safe collection path resolution
//! - Template input construction (deterministic URIs and links)
//! - Annotation-preserving merge of rendered notes with local documents
//! - The import orchestration state machine
//!
//! The remote HTTP transport, the note vault, the template engine, and the
//! selection UI are host capabilities injected through the traits in
//! [`remote`], [`vault`], and [`import`].

pub mod collections;
pub mod config;
pub mod domain;
pub mod error;
pub mod import;
pub mod merge;
pub mod normalize;
pub mod remote;
pub mod template;
pub mod text;
pub mod vault;

// Re-export main types for convenience
pub use collections::CollectionPathResolver;
pub use config::{ConfigError, ImportSettings};
pub use domain::{
    Attachment, CollectionInfo, CollectionWithPath, Creator, LibraryContext, LibraryKind,
    RemoteRecord,
};
pub use error::{ImportError, Result};
pub use import::{
    Collaborators, ImportOutcome, ImportPhase, Importer, Notifier, RenderError, Selection,
    SelectionUi, TemplateEngine,
};
pub use merge::{HistoryCodec, MarkerCodec, ANNOTATIONS_BEGIN, ANNOTATIONS_END};
pub use remote::{BoxFuture, RawItem, RemoteError, RemoteLibrary};
pub use template::{build_template_input, TemplateInput};
pub use vault::{FsVault, Vault, VaultError};
