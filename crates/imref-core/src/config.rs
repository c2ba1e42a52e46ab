//! Import settings and validation
//!
//! Settings storage itself is a host concern; this module only defines the
//! shape the host hands in and the validation that gates the pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{LibraryContext, LibraryKind};

/// Settings for one import configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Master switch; a disabled configuration never starts a pipeline
    pub enabled: bool,
    pub library_kind: LibraryKind,
    pub library_id: Option<u64>,
    /// Credential for the remote transport. Only its presence is checked
    /// here; authentication itself happens in the transport layer.
    pub api_key: Option<String>,
    /// Template the note body is rendered from
    pub note_template: Option<String>,
    /// Template the note path is rendered from; when empty the path is
    /// derived from the record's cite key or title instead
    pub path_template: Option<String>,
    /// Open the written note in the host interface after import
    pub open_after_import: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            library_kind: LibraryKind::User,
            library_id: None,
            api_key: None,
            note_template: None,
            path_template: None,
            open_after_import: false,
        }
    }
}

impl ImportSettings {
    /// Validate the settings and produce the library identity imports run
    /// against. Each failure maps to one user-reportable condition.
    pub fn validate(&self) -> Result<LibraryContext, ConfigError> {
        if !self.enabled {
            return Err(ConfigError::Disabled);
        }
        let id = self.library_id.ok_or(ConfigError::MissingLibraryId)?;
        if self
            .api_key
            .as_deref()
            .map_or(true, |key| key.trim().is_empty())
        {
            return Err(ConfigError::MissingCredential);
        }
        if self
            .note_template
            .as_deref()
            .map_or(true, |template| template.trim().is_empty())
        {
            return Err(ConfigError::MissingImportFormat);
        }
        Ok(LibraryContext::new(self.library_kind, id))
    }
}

/// Configuration validation error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("import is disabled in settings")]
    Disabled,

    #[error("no remote library id is configured")]
    MissingLibraryId,

    #[error("no API credential is configured")]
    MissingCredential,

    #[error("no import format is configured")]
    MissingImportFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_settings() -> ImportSettings {
        ImportSettings {
            library_id: Some(475425),
            api_key: Some("k3y".to_string()),
            note_template: Some("{{title}}".to_string()),
            ..ImportSettings::default()
        }
    }

    #[test]
    fn test_complete_settings_validate() {
        let library = complete_settings().validate().unwrap();
        assert_eq!(library.id, 475425);
        assert_eq!(library.kind, LibraryKind::User);
    }

    #[test]
    fn test_disabled() {
        let settings = ImportSettings {
            enabled: false,
            ..complete_settings()
        };
        assert_eq!(settings.validate(), Err(ConfigError::Disabled));
    }

    #[test]
    fn test_missing_library_id() {
        let settings = ImportSettings {
            library_id: None,
            ..complete_settings()
        };
        assert_eq!(settings.validate(), Err(ConfigError::MissingLibraryId));
    }

    #[test]
    fn test_blank_credential() {
        let settings = ImportSettings {
            api_key: Some("   ".to_string()),
            ..complete_settings()
        };
        assert_eq!(settings.validate(), Err(ConfigError::MissingCredential));
    }

    #[test]
    fn test_missing_import_format() {
        let settings = ImportSettings {
            note_template: None,
            ..complete_settings()
        };
        assert_eq!(settings.validate(), Err(ConfigError::MissingImportFormat));
    }
}
