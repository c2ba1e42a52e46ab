//! Import orchestration
//!
//! Drives one import end to end: search, selection, detail and children
//! fetch, collection resolution, template rendering, annotation-preserving
//! merge, and the final write. All host capabilities (remote transport,
//! vault, selection UI, template engine, notifications) are injected, so
//! the whole pipeline runs deterministically against fakes.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::collections::CollectionPathResolver;
use crate::config::ImportSettings;
use crate::domain::{Attachment, LibraryContext, RemoteRecord};
use crate::error::{summarize_for_notice, ImportError, Result};
use crate::merge::HistoryCodec;
use crate::normalize;
use crate::remote::{BoxFuture, RemoteLibrary};
use crate::template::{build_template_input, TemplateInput};
use crate::vault::Vault;

/// Item types that never appear as import candidates even when search
/// surfaces them
const NON_CANDIDATE_TYPES: &[&str] = &["attachment", "note", "annotation"];

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).unwrap();
}

/// Template rendering error, surfaced by the host engine
#[derive(Error, Debug)]
#[error("{message}")]
pub struct RenderError {
    pub message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome of the selection step. Cancellation is an ordinary outcome,
/// not an error.
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Chosen(RemoteRecord),
    Cancelled,
}

/// Interactive candidate picker
pub trait SelectionUi: Send + Sync {
    fn prompt<'a>(&'a self, candidates: &'a [RemoteRecord]) -> BoxFuture<'a, Selection>;
}

/// Host templating engine.
///
/// `Ok(None)` means the template declined to produce content for this
/// input, which ends the import without a write.
pub trait TemplateEngine: Send + Sync {
    fn render(
        &self,
        template: &str,
        input: &TemplateInput,
    ) -> std::result::Result<Option<String>, RenderError>;
}

/// Host notification surface
pub trait Notifier: Send + Sync {
    /// Show a user-visible message
    fn notify(&self, message: &str);

    /// Raise or dismiss the transient loading indicator
    fn loading(&self, active: bool);
}

/// Phases an import moves through, in order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportPhase {
    Idle,
    Searching,
    AwaitingSelection,
    FetchingDetail,
    ResolvingMetadata,
    Rendering,
    Merging,
    Persisting,
    Done,
    Cancelled,
    Failed,
}

impl ImportPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportPhase::Idle => "idle",
            ImportPhase::Searching => "searching",
            ImportPhase::AwaitingSelection => "awaiting-selection",
            ImportPhase::FetchingDetail => "fetching-detail",
            ImportPhase::ResolvingMetadata => "resolving-metadata",
            ImportPhase::Rendering => "rendering",
            ImportPhase::Merging => "merging",
            ImportPhase::Persisting => "persisting",
            ImportPhase::Done => "done",
            ImportPhase::Cancelled => "cancelled",
            ImportPhase::Failed => "failed",
        }
    }
}

/// Result of one import invocation
#[derive(Clone, Debug, PartialEq)]
pub enum ImportOutcome {
    /// A note was written (or rewritten)
    Imported { path: PathBuf, first_import: bool },
    /// The template declined to render; nothing was written
    Unchanged,
    /// The user dismissed the selection step
    Cancelled,
    /// The search term was empty; nothing was attempted
    NoSearchTerm,
    /// The pipeline failed; `message` is what the user saw
    Failed { message: String },
}

/// Injected host capabilities
#[derive(Clone)]
pub struct Collaborators {
    pub remote: Arc<dyn RemoteLibrary>,
    pub vault: Arc<dyn Vault>,
    pub selection: Arc<dyn SelectionUi>,
    pub templates: Arc<dyn TemplateEngine>,
    pub history: Arc<dyn HistoryCodec>,
    pub notifier: Arc<dyn Notifier>,
}

/// One-shot loading indicator handle; dismissal happens exactly once no
/// matter how the pipeline exits.
struct LoadingGuard {
    notifier: Arc<dyn Notifier>,
    engaged: bool,
}

impl LoadingGuard {
    fn engage(notifier: Arc<dyn Notifier>) -> Self {
        notifier.loading(true);
        Self {
            notifier,
            engaged: true,
        }
    }

    fn dismiss(&mut self) {
        if std::mem::take(&mut self.engaged) {
            self.notifier.loading(false);
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.dismiss();
    }
}

pub struct Importer {
    settings: ImportSettings,
    caps: Collaborators,
}

impl Importer {
    pub fn new(settings: ImportSettings, caps: Collaborators) -> Self {
        Self { settings, caps }
    }

    /// Run one import for a search term.
    ///
    /// Failures surface as a single summarized notification and a
    /// [`ImportOutcome::Failed`]; cancellation is silent. The write is the
    /// last fallible step, so a failed import leaves no partial document.
    pub async fn run(&self, term: &str) -> ImportOutcome {
        let library = match self.settings.validate() {
            Ok(library) => library,
            Err(err) => return self.fail(ImportError::Config(err)),
        };
        let term = term.trim();
        if term.is_empty() {
            return ImportOutcome::NoSearchTerm;
        }

        let mut loading = LoadingGuard::engage(Arc::clone(&self.caps.notifier));
        let result = self.execute(term, &library).await;
        loading.dismiss();

        match result {
            Ok(outcome) => outcome,
            Err(err) => self.fail(err),
        }
    }

    fn fail(&self, err: ImportError) -> ImportOutcome {
        tracing::error!(error = %err, "import failed");
        let message = summarize_for_notice(&err.to_string());
        self.caps.notifier.notify(&message);
        ImportOutcome::Failed { message }
    }

    async fn execute(&self, term: &str, library: &LibraryContext) -> Result<ImportOutcome> {
        let mut phase = ImportPhase::Idle;

        advance(&mut phase, ImportPhase::Searching);
        let hits = self.caps.remote.search(term).await?;
        let candidates: Vec<RemoteRecord> = hits
            .iter()
            .filter_map(|raw| match normalize::normalize(raw) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unreadable search hit");
                    None
                }
            })
            .filter(is_candidate)
            .collect();
        if candidates.is_empty() {
            return Err(ImportError::NoResults);
        }

        advance(&mut phase, ImportPhase::AwaitingSelection);
        let chosen = match self.caps.selection.prompt(&candidates).await {
            Selection::Chosen(record) => record,
            Selection::Cancelled => {
                advance(&mut phase, ImportPhase::Cancelled);
                return Ok(ImportOutcome::Cancelled);
            }
        };

        advance(&mut phase, ImportPhase::FetchingDetail);
        let detail = self
            .caps
            .remote
            .fetch_detail(&chosen.key)
            .await?
            .ok_or_else(|| ImportError::MissingDetail(chosen.key.clone()))?;
        let record = normalize::normalize(&detail)?;
        let children = self.caps.remote.fetch_children(&record.key).await?;
        let notes: Vec<String> = children
            .iter()
            .filter(|child| normalize::item_type(child) == Some("note"))
            .map(normalize::note_text)
            .filter(|text| !text.is_empty())
            .collect();
        let attachments: Vec<Attachment> = children
            .iter()
            .filter(|child| normalize::item_type(child) == Some("attachment"))
            .filter_map(normalize::attachment)
            .collect();

        advance(&mut phase, ImportPhase::ResolvingMetadata);
        let resolver = CollectionPathResolver::new(Arc::clone(&self.caps.remote));
        let collections = match resolver.resolve_paths(&record.collections).await {
            Ok(paths) => paths,
            Err(err) => {
                // Collections are enrichment, not a hard dependency
                tracing::warn!(error = %err, "collection resolution failed, importing without collections");
                Vec::new()
            }
        };

        // The note path must not depend on import history, so it renders
        // from an epoch-pinned input.
        let path_input = build_template_input(
            None,
            &record,
            &notes,
            &attachments,
            &collections,
            DateTime::UNIX_EPOCH,
            library,
        );
        let note_path = self.note_path(&record, &path_input)?;

        let existing = self.caps.vault.read_document(&note_path).await?;
        let last_import = existing
            .as_deref()
            .map(|text| self.caps.history.extract_last_import(text))
            .unwrap_or(DateTime::UNIX_EPOCH);
        let prior_annotations = existing
            .as_deref()
            .and_then(|text| self.caps.history.extract_annotations(text));
        let source_path = existing
            .is_some()
            .then(|| note_path.to_string_lossy().into_owned());

        advance(&mut phase, ImportPhase::Rendering);
        let input = build_template_input(
            source_path.as_deref(),
            &record,
            &notes,
            &attachments,
            &collections,
            last_import,
            library,
        );
        let first_import = input.is_first_import;
        let note_template = self.settings.note_template.as_deref().unwrap_or_default();
        let Some(rendered) = self
            .caps
            .templates
            .render(note_template, &input)
            .map_err(ImportError::Render)?
        else {
            advance(&mut phase, ImportPhase::Done);
            return Ok(ImportOutcome::Unchanged);
        };

        advance(&mut phase, ImportPhase::Merging);
        let merged = self.caps.history.merge(&rendered, prior_annotations.as_deref());
        let stamped = self.caps.history.stamp_last_import(&merged, Utc::now());

        advance(&mut phase, ImportPhase::Persisting);
        self.caps.vault.write_document(&note_path, &stamped).await?;
        if self.settings.open_after_import {
            if let Err(err) = self.caps.vault.open_document(&note_path).await {
                tracing::warn!(error = %err, "could not open imported note");
            }
        }

        advance(&mut phase, ImportPhase::Done);
        tracing::info!(path = %note_path.display(), first_import, "import complete");
        Ok(ImportOutcome::Imported {
            path: note_path,
            first_import,
        })
    }

    /// Deterministic vault path for the note: the rendered path template
    /// when one is configured, otherwise a sanitized cite-key/title stem.
    fn note_path(&self, record: &RemoteRecord, path_input: &TemplateInput) -> Result<PathBuf> {
        let configured = self
            .settings
            .path_template
            .as_deref()
            .map(str::trim)
            .filter(|template| !template.is_empty());
        let rendered = match configured {
            Some(template) => self
                .caps
                .templates
                .render(template, path_input)
                .map_err(ImportError::Render)?
                .map(|path| path.trim().to_string())
                .filter(|path| !path.is_empty())
                .ok_or_else(|| {
                    ImportError::Render(RenderError::new("path template produced no output"))
                })?,
            None => fallback_note_name(record),
        };
        let mut path = PathBuf::from(rendered);
        if path.extension().is_none() {
            path.set_extension("md");
        }
        Ok(path)
    }
}

fn advance(phase: &mut ImportPhase, next: ImportPhase) {
    tracing::debug!(from = phase.as_str(), to = next.as_str(), "import phase");
    *phase = next;
}

fn is_candidate(record: &RemoteRecord) -> bool {
    record
        .item_type
        .as_deref()
        .map_or(true, |tag| !NON_CANDIDATE_TYPES.contains(&tag))
}

fn fallback_note_name(record: &RemoteRecord) -> String {
    let stem = record
        .cite_key
        .as_deref()
        .or(record.title.as_deref())
        .unwrap_or(&record.key);
    sanitize_filename(stem)
}

/// Strip characters the host filesystems reject from a note name
fn sanitize_filename(name: &str) -> String {
    UNSAFE_FILENAME_CHARS
        .replace_all(name.trim(), "-")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename("what: a \"title\"?"),
            "what- a -title--"
        );
    }

    #[test]
    fn test_fallback_note_name_prefers_cite_key() {
        let record = RemoteRecord {
            cite_key: Some("darwin1859origin".to_string()),
            title: Some("On the Origin of Species".to_string()),
            ..RemoteRecord::new("ABCD2345")
        };
        assert_eq!(fallback_note_name(&record), "darwin1859origin");
    }

    #[test]
    fn test_fallback_note_name_uses_key_as_last_resort() {
        assert_eq!(fallback_note_name(&RemoteRecord::new("ABCD2345")), "ABCD2345");
    }

    #[test]
    fn test_attachment_hits_are_not_candidates() {
        let mut record = RemoteRecord::new("ATT1");
        record.item_type = Some("attachment".to_string());
        assert!(!is_candidate(&record));

        record.item_type = Some("journalArticle".to_string());
        assert!(is_candidate(&record));

        record.item_type = None;
        assert!(is_candidate(&record));
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(ImportPhase::AwaitingSelection.as_str(), "awaiting-selection");
        assert_eq!(ImportPhase::Done.as_str(), "done");
    }
}
