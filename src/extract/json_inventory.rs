//! Nested JSON Inventory Extraction
//!
//! Handles vendors that return their camera inventory as a JSON object with
//! the camera array under a fixed top-level key ("cameras" for Emstone,
//! "RegisteredCameras" for Hanwha). Elements are passed through verbatim as
//! raw records; renaming is the transformation engine's job.

use crate::record::RawCameraRecord;
use crate::{Error, Result};

/// Extract camera records from a JSON inventory payload.
///
/// The payload must parse as a JSON object carrying an array under
/// `array_key`. Array elements that are not objects are skipped.
pub fn extract_records(payload: &str, array_key: &str) -> Result<Vec<RawCameraRecord>> {
    let document: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| Error::Parse(format!("invalid JSON inventory: {}", e)))?;

    let items = document
        .get(array_key)
        .and_then(|value| value.as_array())
        .ok_or_else(|| {
            Error::Parse(format!("JSON inventory has no \"{}\" array", array_key))
        })?;

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match item.as_object() {
            Some(object) => records.push(RawCameraRecord::from_json_object(object)),
            None => {
                tracing::warn!(
                    array_key = %array_key,
                    "Skipping non-object inventory element"
                );
            }
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    #[test]
    fn test_extracts_records_in_document_order() {
        let payload = r#"{"cameras":[
            {"id":2,"name":"Gate"},
            {"id":1,"name":"Lobby","connected":true}
        ]}"#;

        let records = extract_records(payload, "cameras").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("id"), Some(&FieldValue::Int(2)));
        assert_eq!(records[1].get("id"), Some(&FieldValue::Int(1)));
        assert_eq!(records[1].get("connected"), Some(&FieldValue::Bool(true)));
    }

    #[test]
    fn test_missing_array_key_is_payload_failure() {
        let payload = r#"{"devices":[]}"#;
        let result = extract_records(payload, "cameras");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_invalid_json_is_payload_failure() {
        let result = extract_records("not json at all", "cameras");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_non_object_elements_skipped() {
        let payload = r#"{"RegisteredCameras":[{"Channel":0},"stray",{"Channel":1}]}"#;
        let records = extract_records(payload, "RegisteredCameras").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_null_fields_skipped_composites_flattened() {
        let payload = r#"{"cameras":[{"id":1,"gone":null,"profile":{"w":1920}}]}"#;
        let records = extract_records(payload, "cameras").unwrap();
        assert!(!records[0].contains("gone"));
        assert_eq!(
            records[0].get("profile"),
            Some(&FieldValue::Text("{\"w\":1920}".to_string()))
        );
    }

    #[test]
    fn test_empty_array_yields_no_records() {
        let records = extract_records(r#"{"cameras":[]}"#, "cameras").unwrap();
        assert!(records.is_empty());
    }
}
