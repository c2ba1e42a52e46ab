//! Remote record normalization
//!
//! Single boundary mapping the transport's raw shapes (lightweight search
//! hits and full detail records) into [`RemoteRecord`]. Each field's
//! fallback locations are enumerated as an ordered accessor-path table;
//! `data` is preferred over the top level, with `meta` as the secondary
//! location for fields the transport occasionally relocates.

use serde_json::Value;

use crate::domain::{Attachment, CollectionInfo, Creator, RemoteRecord};
use crate::remote::{RawItem, RemoteError};
use crate::text;

const KEY: &[&[&str]] = &[&["key"], &["data", "key"]];
const TITLE: &[&[&str]] = &[&["data", "title"], &["title"]];
const ITEM_TYPE: &[&[&str]] = &[&["data", "itemType"], &["itemType"]];
const DATE: &[&[&str]] = &[&["data", "date"], &["date"]];
const CITATION: &[&[&str]] = &[&["data", "citation"], &["citation"]];
const BIBLIOGRAPHY: &[&[&str]] = &[
    &["data", "bib"],
    &["bib"],
    &["data", "bibliography"],
    &["bibliography"],
];
const CREATORS: &[&[&str]] = &[&["data", "creators"], &["creators"]];
const COLLECTIONS: &[&[&str]] = &[&["data", "collections"], &["collections"]];
const NOTE: &[&[&str]] = &[&["data", "note"], &["note"]];

/// Cite-key fallback order: camel-case, hyphenated, then both again from
/// the secondary `meta` location.
const CITE_KEY: &[&[&str]] = &[
    &["data", "citationKey"],
    &["citationKey"],
    &["data", "citation-key"],
    &["citation-key"],
    &["meta", "citationKey"],
    &["meta", "citation-key"],
];

/// Collection record fields
const COLLECTION_KEY: &[&[&str]] = &[&["key"], &["data", "key"]];
const COLLECTION_NAME: &[&[&str]] = &[&["data", "name"], &["name"]];
const COLLECTION_PARENT: &[&[&str]] = &[&["data", "parentCollection"], &["parentCollection"]];

/// Normalize one raw item (search hit or detail record) into the
/// canonical record. A missing item key is the only hard failure.
pub fn normalize(raw: &RawItem) -> Result<RemoteRecord, RemoteError> {
    let key = raw
        .first_str(KEY)
        .ok_or_else(|| RemoteError::parse("item record has no key"))?
        .to_string();

    Ok(RemoteRecord {
        key,
        title: raw.first_str(TITLE).map(str::to_string),
        item_type: raw.first_str(ITEM_TYPE).map(str::to_string),
        creators: creators(raw),
        date: raw.first_str(DATE).map(str::to_string),
        cite_key: raw.first_str(CITE_KEY).map(str::to_string),
        citation: rich_text(raw, CITATION),
        bibliography: rich_text(raw, BIBLIOGRAPHY),
        collections: string_list(raw, COLLECTIONS),
    })
}

/// Normalize one raw collection record.
///
/// The transport writes `parentCollection: false` for root collections;
/// false, null, and absent all mean root here.
pub fn normalize_collection(raw: &RawItem) -> Result<CollectionInfo, RemoteError> {
    let key = raw
        .first_str(COLLECTION_KEY)
        .ok_or_else(|| RemoteError::parse("collection record has no key"))?
        .to_string();
    let name = raw
        .first_str(COLLECTION_NAME)
        .map(str::to_string)
        .unwrap_or_else(|| key.clone());
    let parent = raw
        .first_value(COLLECTION_PARENT)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    Ok(CollectionInfo { key, name, parent })
}

/// Plain-text body of a child note record
pub fn note_text(raw: &RawItem) -> String {
    text::value_to_text(raw.first_value(NOTE))
}

/// Item type tag of a raw item, if any
pub fn item_type(raw: &RawItem) -> Option<&str> {
    raw.first_str(ITEM_TYPE)
}

/// Child attachment record, when the raw item is one and carries a key
pub fn attachment(raw: &RawItem) -> Option<Attachment> {
    Some(Attachment {
        key: raw.first_str(KEY)?.to_string(),
        title: raw.first_str(TITLE).map(str::to_string),
    })
}

fn rich_text(raw: &RawItem, paths: &[&[&str]]) -> Option<String> {
    let plain = text::value_to_text(raw.first_value(paths));
    if plain.is_empty() {
        None
    } else {
        Some(plain)
    }
}

fn creators(raw: &RawItem) -> Vec<Creator> {
    let Some(list) = raw.first_value(CREATORS).and_then(Value::as_array) else {
        return Vec::new();
    };
    list.iter().filter_map(creator).collect()
}

fn creator(value: &Value) -> Option<Creator> {
    let last = field(value, "lastName");
    let first = field(value, "firstName");
    // Institutional creators carry a single `name` field instead
    let single = field(value, "name");

    match (last, single) {
        (Some(last), _) => Some(Creator {
            last_name: last,
            first_name: first,
        }),
        (None, Some(name)) => Some(Creator::new(name)),
        (None, None) => first.map(|f| Creator {
            last_name: String::new(),
            first_name: Some(f),
        }),
    }
}

fn field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(raw: &RawItem, paths: &[&[&str]]) -> Vec<String> {
    raw.first_value(paths)
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    const DETAIL_RECORD: &str = r#"{
        "key": "ABCD2345",
        "meta": { "citationKey": "darwin1859origin" },
        "data": {
            "key": "ABCD2345",
            "itemType": "book",
            "title": "On the Origin of Species",
            "date": "1859",
            "creators": [
                { "creatorType": "author", "lastName": "Darwin", "firstName": "Charles" }
            ],
            "collections": ["COLL1111", "COLL2222"]
        }
    }"#;

    const SEARCH_HIT: &str = r#"{
        "key": "EFGH6789",
        "title": "A Lightweight Hit",
        "itemType": "journalArticle"
    }"#;

    fn raw(json: &str) -> RawItem {
        RawItem::new(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_normalize_detail_record() {
        let record = normalize(&raw(DETAIL_RECORD)).unwrap();
        assert_eq!(record.key, "ABCD2345");
        assert_eq!(record.title.as_deref(), Some("On the Origin of Species"));
        assert_eq!(record.item_type.as_deref(), Some("book"));
        assert_eq!(record.date.as_deref(), Some("1859"));
        assert_eq!(record.cite_key.as_deref(), Some("darwin1859origin"));
        assert_eq!(record.creators.len(), 1);
        assert_eq!(record.creators[0].last_name, "Darwin");
        assert_eq!(record.collections, vec!["COLL1111", "COLL2222"]);
    }

    #[test]
    fn test_normalize_search_hit() {
        let record = normalize(&raw(SEARCH_HIT)).unwrap();
        assert_eq!(record.key, "EFGH6789");
        assert_eq!(record.title.as_deref(), Some("A Lightweight Hit"));
        assert!(record.creators.is_empty());
        assert!(record.collections.is_empty());
    }

    #[test]
    fn test_normalize_without_key_fails() {
        assert!(normalize(&raw(r#"{"data": {"title": "keyless"}}"#)).is_err());
    }

    #[test_case(r#"{"key": "K", "data": {"citationKey": "camel"}}"#, Some("camel"); "camel case field wins")]
    #[test_case(r#"{"key": "K", "data": {"citation-key": "hyphen"}}"#, Some("hyphen"); "hyphenated field when no camel case")]
    #[test_case(r#"{"key": "K", "data": {"citationKey": "camel", "citation-key": "hyphen"}}"#, Some("camel"); "camel case preferred over hyphenated")]
    #[test_case(r#"{"key": "K", "meta": {"citation-key": "relocated"}}"#, Some("relocated"); "secondary location as last resort")]
    #[test_case(r#"{"key": "K", "data": {}}"#, None; "absent when nowhere")]
    fn test_cite_key_fallback(json: &str, expected: Option<&str>) {
        let record = normalize(&raw(json)).unwrap();
        assert_eq!(record.cite_key.as_deref(), expected);
    }

    #[test]
    fn test_data_preferred_over_top_level() {
        let record = normalize(&raw(
            r#"{"key": "K", "title": "outer", "data": {"title": "inner"}}"#,
        ))
        .unwrap();
        assert_eq!(record.title.as_deref(), Some("inner"));
    }

    #[test]
    fn test_rich_text_fields_converted() {
        let record = normalize(&raw(
            r#"{"key": "K", "citation": "<i>Darwin</i> (1859)", "bib": null}"#,
        ))
        .unwrap();
        assert_eq!(record.citation.as_deref(), Some("Darwin (1859)"));
        assert!(record.bibliography.is_none());
    }

    #[test]
    fn test_institutional_creator() {
        let record = normalize(&raw(
            r#"{"key": "K", "data": {"creators": [{"creatorType": "author", "name": "Royal Society"}]}}"#,
        ))
        .unwrap();
        assert_eq!(record.creators[0].last_name, "Royal Society");
        assert!(record.creators[0].first_name.is_none());
    }

    #[test]
    fn test_normalize_collection() {
        let info = normalize_collection(&raw(
            r#"{"key": "COLL1111", "data": {"name": "Biology", "parentCollection": "COLL0000"}}"#,
        ))
        .unwrap();
        assert_eq!(info.key, "COLL1111");
        assert_eq!(info.name, "Biology");
        assert_eq!(info.parent.as_deref(), Some("COLL0000"));
    }

    #[test]
    fn test_collection_parent_false_means_root() {
        let info = normalize_collection(&raw(
            r#"{"key": "COLL1111", "data": {"name": "Biology", "parentCollection": false}}"#,
        ))
        .unwrap();
        assert!(info.parent.is_none());
    }

    #[test]
    fn test_collection_name_defaults_to_key() {
        let info = normalize_collection(&raw(r#"{"key": "COLL1111"}"#)).unwrap();
        assert_eq!(info.name, "COLL1111");
    }

    #[test]
    fn test_note_text() {
        let child = RawItem::new(json!({
            "key": "NOTE1234",
            "data": { "itemType": "note", "note": "<p>interesting &amp; relevant</p>" }
        }));
        assert_eq!(item_type(&child), Some("note"));
        assert_eq!(note_text(&child), "interesting & relevant");
    }

    #[test]
    fn test_attachment_child() {
        let child = RawItem::new(json!({
            "key": "ATT5678",
            "data": { "itemType": "attachment", "title": "Full Text PDF" }
        }));
        let att = attachment(&child).unwrap();
        assert_eq!(att.key, "ATT5678");
        assert_eq!(att.title.as_deref(), Some("Full Text PDF"));
    }
}
