//! Payload normalization.
//!
//! The upstream outage API is undocumented and its records do not share a
//! stable shape. Extraction is therefore driven by ordered key lists: a set of
//! list-valued "container" fields that may hold place sub-records, and a set
//! of "text" fields read from each sub-record. When none of the known text
//! fields is present the sub-record is scanned for any string field whose
//! name looks like a name or text field.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::error::BuildError;

/// Container fields that carry affected-area sub-records, in lookup order.
pub const AREA_LIST_KEYS: &[&str] = &[
    "lektikoGenikonDiakoponList",
    "exyphretoumeniPerioxiList",
    "exyphretoumeniDhmEnothtaList",
    "kallikratikiDhmotikiEnothtaList",
    "kallikratikosOTAList",
];

/// Text fields read from an affected-area sub-record.
pub const AREA_TEXT_KEYS: &[&str] = &[
    "text",
    "name",
    "perioxi",
    "perioxh",
    "peri",
    "description",
    "title",
    "ota",
    "nomos",
    "dhm_enothta",
    "dhm_enothta_name",
    "kallikratikos_ota",
];

/// Container fields that carry prefecture sub-records.
pub const PREFECTURE_LIST_KEYS: &[&str] = &["kallikratikiNomarxiaList"];

/// Text fields read from a prefecture sub-record.
pub const PREFECTURE_TEXT_KEYS: &[&str] = &["peri", "name", "text", "nomos"];

/// An ordered pair of container and text key lists.
#[derive(Debug, Clone, Copy)]
pub struct FieldKeys {
    /// List-valued fields holding sub-records or bare strings.
    pub containers: &'static [&'static str],
    /// String fields read from each sub-record.
    pub texts: &'static [&'static str],
}

impl FieldKeys {
    /// Keys used to extract affected areas.
    pub const AREAS: FieldKeys = FieldKeys {
        containers: AREA_LIST_KEYS,
        texts: AREA_TEXT_KEYS,
    };

    /// Keys used to extract the prefecture name.
    pub const PREFECTURE: FieldKeys = FieldKeys {
        containers: PREFECTURE_LIST_KEYS,
        texts: PREFECTURE_TEXT_KEYS,
    };
}

/// Canonical fields extracted from one raw outage record.
///
/// Every optional field is `None` when the payload did not carry a usable
/// value; nothing is inferred at this stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub incident_id: Option<i64>,
    pub areas: BTreeSet<String>,
    pub prefecture: Option<String>,
    pub start_time: Option<i64>,
    pub eta_restore_time: Option<i64>,
    pub announced_restore_time: Option<i64>,
    pub creator: String,
    pub cause: String,
    pub is_active: bool,
    pub is_scheduled: bool,
}

impl NormalizedRecord {
    /// Normalize a raw record using the area and prefecture key lists.
    pub fn from_value(record: &Value) -> Result<Self, BuildError> {
        let object = record
            .as_object()
            .ok_or_else(|| BuildError::Malformed(json_kind(record)))?;

        Ok(Self {
            incident_id: object.get("id").and_then(to_int),
            areas: extract_areas(object, FieldKeys::AREAS),
            prefecture: extract_first(object, FieldKeys::PREFECTURE),
            start_time: object.get("start_date").and_then(to_int),
            eta_restore_time: object.get("end_date").and_then(to_int),
            announced_restore_time: object.get("end_date_announced").and_then(to_int),
            creator: text_or(object.get("creator"), "Unknown"),
            cause: text_or(object.get("cause"), ""),
            is_active: object.get("is_active").map_or(true, truthy),
            is_scheduled: object.get("is_scheduled").map_or(false, truthy),
        })
    }
}

/// Collapse internal whitespace and trim the ends.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a candidate place name, rejecting blanks and bare numbers.
///
/// Purely numeric strings are IDs leaking into text fields.
pub fn normalize_place(raw: &str) -> Option<String> {
    let text = normalize_text(raw);
    if text.is_empty() || text.chars().all(|c| c.is_ascii_digit()) {
        None
    } else {
        Some(text)
    }
}

/// Coerce a loosely-typed JSON value into an integer.
pub fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            let digits = s.strip_prefix('-').unwrap_or(s);
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                s.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Non-blank text values of a sub-record.
///
/// Known keys are tried first, in order. Only if none of them yields text are
/// the remaining string fields scanned by name, in document order.
pub fn extract_texts<'a>(item: &'a Map<String, Value>, keys: &[&str]) -> Vec<&'a str> {
    let known: Vec<&str> = keys
        .iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .filter(|text| !text.trim().is_empty())
        .collect();
    if !known.is_empty() {
        return known;
    }

    item.iter()
        .filter_map(|(key, value)| {
            let text = value.as_str().filter(|t| !t.trim().is_empty())?;
            let lowered = key.to_lowercase();
            (lowered.contains("name") || lowered.contains("text")).then_some(text)
        })
        .collect()
}

/// Deduplicated, sorted area names from every known container.
pub fn extract_areas(record: &Map<String, Value>, keys: FieldKeys) -> BTreeSet<String> {
    container_texts(record, keys).collect()
}

/// The first acceptable name found in the given containers.
pub fn extract_first(record: &Map<String, Value>, keys: FieldKeys) -> Option<String> {
    container_texts(record, keys).next()
}

fn container_texts<'a>(
    record: &'a Map<String, Value>,
    keys: FieldKeys,
) -> impl Iterator<Item = String> + 'a {
    keys.containers
        .iter()
        .filter_map(move |key| record.get(*key).and_then(Value::as_array))
        .flatten()
        .flat_map(move |item| match item {
            Value::Object(sub) => extract_texts(sub, keys.texts),
            Value::String(text) => vec![text.as_str()],
            _ => Vec::new(),
        })
        .filter_map(normalize_place)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(v) if truthy(v) => match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
        _ => default.to_string(),
    }
}

/// Short name of a JSON value's type, for diagnostics.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_text_collapses_whitespace() {
        assert_eq!(normalize_text("  Άνω   Πόλη \n Πάτρας "), "Άνω Πόλη Πάτρας");
    }

    #[test]
    fn test_normalize_place_rejects_numeric() {
        assert_eq!(normalize_place(" 12345 "), None);
        assert_eq!(normalize_place("   "), None);
        assert_eq!(normalize_place("Οδός 25ης Μαρτίου"), Some("Οδός 25ης Μαρτίου".to_string()));
    }

    #[test]
    fn test_normalize_place_keeps_non_decimal_numerals() {
        assert_eq!(normalize_place("Ⅳ"), Some("Ⅳ".to_string()));
        assert_eq!(normalize_place("½"), Some("½".to_string()));
    }

    #[test]
    fn test_to_int_coercion() {
        assert_eq!(to_int(&json!(42)), Some(42));
        assert_eq!(to_int(&json!(42.9)), Some(42));
        assert_eq!(to_int(&json!(" -17 ")), Some(-17));
        assert_eq!(to_int(&json!("12a")), None);
        assert_eq!(to_int(&json!("")), None);
        assert_eq!(to_int(&json!(true)), None);
        assert_eq!(to_int(&json!(null)), None);
    }

    #[test]
    fn test_extract_texts_prefers_known_keys() {
        let item = json!({"name": "Ρίο", "otherName": "ignored"});
        let texts = extract_texts(item.as_object().unwrap(), AREA_TEXT_KEYS);
        assert_eq!(texts, vec!["Ρίο"]);
    }

    #[test]
    fn test_extract_texts_falls_back_to_name_like_fields() {
        let item = json!({"areaName": "Ρίο", "label_text": "Αίγιο", "code": "abc", "id": 4});
        let mut texts = extract_texts(item.as_object().unwrap(), AREA_TEXT_KEYS);
        texts.sort();
        assert_eq!(texts, vec!["Αίγιο", "Ρίο"]);
    }

    #[test]
    fn test_fallback_scan_follows_document_order() {
        let record: Value = serde_json::from_str(
            r#"{"kallikratikiNomarxiaList": [{"nomarxiaName": "Αχαΐας", "codeText": "ACH"}]}"#,
        )
        .unwrap();
        let prefecture = extract_first(record.as_object().unwrap(), FieldKeys::PREFECTURE);
        assert_eq!(prefecture.as_deref(), Some("Αχαΐας"));
    }

    #[test]
    fn test_extract_areas_dedupes_and_sorts() {
        let record = json!({
            "lektikoGenikonDiakoponList": [{"text": "Ρίο"}, "  Αίγιο  ", 7],
            "kallikratikosOTAList": [{"name": "Ρίο"}, {"name": "0205"}],
            "exyphretoumeniPerioxiList": "not a list",
        });
        let areas = extract_areas(record.as_object().unwrap(), FieldKeys::AREAS);
        assert_eq!(areas.into_iter().collect::<Vec<_>>(), vec!["Αίγιο", "Ρίο"]);
    }

    #[test]
    fn test_extract_prefecture_first_wins() {
        let record = json!({
            "kallikratikiNomarxiaList": [{"peri": "123"}, {"peri": "Νομός Αχαΐας"}, {"peri": "Ηλείας"}]
        });
        let prefecture = extract_first(record.as_object().unwrap(), FieldKeys::PREFECTURE);
        assert_eq!(prefecture.as_deref(), Some("Νομός Αχαΐας"));
    }

    #[test]
    fn test_normalized_record_defaults() {
        let record = json!({"id": "901", "lektikoGenikonDiakoponList": ["Ρίο"]});
        let normalized = NormalizedRecord::from_value(&record).unwrap();
        assert_eq!(normalized.incident_id, Some(901));
        assert_eq!(normalized.creator, "Unknown");
        assert_eq!(normalized.cause, "");
        assert!(normalized.is_active);
        assert!(!normalized.is_scheduled);
        assert_eq!(normalized.prefecture, None);
    }

    #[test]
    fn test_normalized_record_flags_use_truthiness() {
        let record = json!({"id": 1, "is_active": 0, "is_scheduled": "yes", "creator": 55});
        let normalized = NormalizedRecord::from_value(&record).unwrap();
        assert!(!normalized.is_active);
        assert!(normalized.is_scheduled);
        assert_eq!(normalized.creator, "55");
    }

    #[test]
    fn test_non_object_is_malformed() {
        let err = NormalizedRecord::from_value(&json!(["x"])).unwrap_err();
        assert_eq!(err, BuildError::Malformed("array"));
    }
}
