//! Annotation-preserving merge
//!
//! A freshly rendered note replaces everything in the local document
//! except the user's annotation block, which is carried over verbatim
//! between its markers. The same markers record when the document was
//! last imported, so re-imports can distinguish themselves from first
//! imports.

use chrono::{DateTime, SecondsFormat, Utc};
use lazy_static::lazy_static;
use regex::Regex;

/// Opens the user-owned annotation block
pub const ANNOTATIONS_BEGIN: &str = "%% begin annotations %%";
/// Closes the user-owned annotation block
pub const ANNOTATIONS_END: &str = "%% end annotations %%";

lazy_static! {
    static ref LAST_IMPORT: Regex =
        Regex::new(r"(?m)^%% last-import: (?P<ts>\S+) %%[ \t]*$").unwrap();
}

/// Reads and writes the import-history markers of a local document.
///
/// Implemented by the host when it stores history differently (e.g. in
/// frontmatter); [`MarkerCodec`] is the stock comment-marker format.
pub trait HistoryCodec: Send + Sync {
    /// Text of the annotation block, markers excluded; `None` when the
    /// document has no block
    fn extract_annotations(&self, text: &str) -> Option<String>;

    /// Timestamp of the previous import; the epoch when the document has
    /// never been imported (or the marker is unreadable)
    fn extract_last_import(&self, text: &str) -> DateTime<Utc>;

    /// Merge freshly rendered content with a previously extracted
    /// annotation block
    fn merge(&self, rendered: &str, prior_annotations: Option<&str>) -> String;

    /// Record an import timestamp in the document
    fn stamp_last_import(&self, text: &str, when: DateTime<Utc>) -> String;
}

/// Stock codec: `%%`-comment markers in the document body
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkerCodec;

impl MarkerCodec {
    fn block_bounds(text: &str) -> Option<(usize, usize)> {
        let start = text.find(ANNOTATIONS_BEGIN)? + ANNOTATIONS_BEGIN.len();
        let end = start + text[start..].find(ANNOTATIONS_END)?;
        Some((start, end))
    }
}

impl HistoryCodec for MarkerCodec {
    fn extract_annotations(&self, text: &str) -> Option<String> {
        Self::block_bounds(text).map(|(start, end)| text[start..end].to_string())
    }

    fn extract_last_import(&self, text: &str) -> DateTime<Utc> {
        LAST_IMPORT
            .captures(text)
            .and_then(|caps| DateTime::parse_from_rfc3339(&caps["ts"]).ok())
            .map(|ts| ts.with_timezone(&Utc))
            .unwrap_or(DateTime::UNIX_EPOCH)
    }

    fn merge(&self, rendered: &str, prior_annotations: Option<&str>) -> String {
        let Some(prior) = prior_annotations else {
            return rendered.to_string();
        };
        match Self::block_bounds(rendered) {
            Some((start, end)) => {
                format!("{}{}{}", &rendered[..start], prior, &rendered[end..])
            }
            None => format!(
                "{}\n{}{}{}\n",
                rendered.trim_end_matches('\n'),
                ANNOTATIONS_BEGIN,
                prior,
                ANNOTATIONS_END
            ),
        }
    }

    fn stamp_last_import(&self, text: &str, when: DateTime<Utc>) -> String {
        let marker = format!(
            "%% last-import: {} %%",
            when.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        if LAST_IMPORT.is_match(text) {
            LAST_IMPORT.replace(text, marker.as_str()).into_owned()
        } else {
            format!("{}\n{}\n", text.trim_end_matches('\n'), marker)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const CODEC: MarkerCodec = MarkerCodec;

    fn doc_with_annotations(inner: &str) -> String {
        format!(
            "# Darwin 1859\n\n{}{}{}\n\n%% last-import: 2024-05-01T09:30:00Z %%\n",
            ANNOTATIONS_BEGIN, inner, ANNOTATIONS_END
        )
    }

    #[test]
    fn test_extract_annotations() {
        let doc = doc_with_annotations("\nmy margin note\n");
        assert_eq!(
            CODEC.extract_annotations(&doc),
            Some("\nmy margin note\n".to_string())
        );
    }

    #[test]
    fn test_extract_annotations_absent() {
        assert!(CODEC.extract_annotations("# plain document").is_none());
    }

    #[test]
    fn test_extract_last_import() {
        let doc = doc_with_annotations("");
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(CODEC.extract_last_import(&doc), expected);
    }

    #[test]
    fn test_last_import_defaults_to_epoch() {
        assert_eq!(
            CODEC.extract_last_import("# never imported"),
            DateTime::UNIX_EPOCH
        );
        let garbled = "%% last-import: yesterday %%";
        assert_eq!(CODEC.extract_last_import(garbled), DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_merge_preserves_prior_annotations() {
        let rendered = format!(
            "# Darwin 1859 (revised)\n\n{}\n{}\n",
            ANNOTATIONS_BEGIN, ANNOTATIONS_END
        );
        let merged = CODEC.merge(&rendered, Some("\nmy margin note\n"));
        assert!(merged.contains("my margin note"));
        assert!(merged.starts_with("# Darwin 1859 (revised)"));
    }

    #[test]
    fn test_merge_without_prior_is_identity() {
        let rendered = "# fresh render\n";
        assert_eq!(CODEC.merge(rendered, None), rendered);
    }

    #[test]
    fn test_merge_appends_block_when_render_lacks_markers() {
        let merged = CODEC.merge("# no block here\n", Some("\nkept\n"));
        let inner = CODEC.extract_annotations(&merged);
        assert_eq!(inner, Some("\nkept\n".to_string()));
    }

    #[test]
    fn test_merge_round_trip_is_stable() {
        let rendered = format!("# doc\n\n{}\ninitial\n{}\n", ANNOTATIONS_BEGIN, ANNOTATIONS_END);
        let first = CODEC.merge(&rendered, Some("\nuser text\n"));
        let second = CODEC.merge(&rendered, CODEC.extract_annotations(&first).as_deref());
        assert_eq!(first, second);
    }

    #[test]
    fn test_stamp_replaces_existing_marker() {
        let doc = doc_with_annotations("");
        let when = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let stamped = CODEC.stamp_last_import(&doc, when);
        assert_eq!(CODEC.extract_last_import(&stamped), when);
        assert_eq!(stamped.matches("%% last-import:").count(), 1);
    }

    #[test]
    fn test_stamp_appends_when_absent() {
        let when = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let stamped = CODEC.stamp_last_import("# doc", when);
        assert_eq!(CODEC.extract_last_import(&stamped), when);
    }
}
