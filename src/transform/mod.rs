//! Transformation Engine
//!
//! Pure, rule-driven mapping from raw vendor records to unified cameras.
//! Holds no state and performs no I/O, so the same raw record and rule set
//! always produce byte-identical output.
//!
//! Conversion semantics:
//! - DEFAULT_CONVERSION assigns the stringified source value unchanged
//! - BOOLEAN_CONVERSION is true iff the value is a truthy token
//!   ("true", "1", "yes", "on", case-insensitive)
//! - NUMBER_CONVERSION parses integer first, then float; a parse failure
//!   skips the assignment and the target keeps its prior value
//! - STRING_FORMAT substitutes the value into the "format" parameter at
//!   its `{}` placeholder; without a template it degrades to DEFAULT

use crate::mapping::{FieldTransformation, MappingRuleSet, TransformationType};
use crate::record::{FieldValue, RawCameraRecord};
use crate::unified::UnifiedCamera;

/// Truthy tokens recognized by BOOLEAN_CONVERSION
const TRUTHY_TOKENS: [&str; 4] = ["true", "1", "yes", "on"];

/// Result of applying one rule set to a raw snapshot
#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    pub cameras: Vec<UnifiedCamera>,
    /// Records dropped because the channel-identity field was missing
    pub excluded: usize,
}

/// Apply a rule set to every record of a raw snapshot.
///
/// Records without a usable channel identity are excluded, counted, and
/// never an error.
pub fn apply_rule_set(records: &[RawCameraRecord], rules: &MappingRuleSet) -> TransformOutcome {
    let mut outcome = TransformOutcome::default();
    for record in records {
        match apply_rules(record, rules) {
            Some(camera) => outcome.cameras.push(camera),
            None => outcome.excluded += 1,
        }
    }
    outcome
}

/// Apply a rule set to one raw record.
///
/// Returns `None` when the rule set has no channel-identity rule or the
/// record lacks the identity field. Transformations run in declared order;
/// later rules overwrite earlier ones targeting the same field.
pub fn apply_rules(raw: &RawCameraRecord, rules: &MappingRuleSet) -> Option<UnifiedCamera> {
    let identity = rules.channel_id_transformation.as_ref()?;
    let channel_id = raw.get(&identity.source_field)?.as_string();
    if channel_id.is_empty() {
        return None;
    }

    let mut camera = UnifiedCamera::new(&rules.vendor_type, channel_id);

    for transformation in &rules.transformations {
        let source = match raw.get(&transformation.source_field) {
            Some(value) => value,
            None => continue,
        };
        let converted = match convert(source, transformation) {
            Some(value) => value,
            None => continue,
        };
        assign(&mut camera, &transformation.target_field, converted);
    }

    Some(camera)
}

fn convert(source: &FieldValue, transformation: &FieldTransformation) -> Option<FieldValue> {
    match transformation.transformation_type {
        TransformationType::DefaultConversion => Some(FieldValue::Text(source.as_string())),
        TransformationType::BooleanConversion => {
            Some(FieldValue::Bool(is_truthy(&source.as_string())))
        }
        TransformationType::NumberConversion => parse_number(&source.as_string()),
        TransformationType::StringFormat => {
            let formatted = match transformation.parameters.get("format") {
                Some(template) => template.replacen("{}", &source.as_string(), 1),
                None => source.as_string(),
            };
            Some(FieldValue::Text(formatted))
        }
    }
}

fn is_truthy(text: &str) -> bool {
    let token = text.trim();
    TRUTHY_TOKENS
        .iter()
        .any(|truthy| token.eq_ignore_ascii_case(truthy))
}

fn parse_number(text: &str) -> Option<FieldValue> {
    let trimmed = text.trim();
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Some(FieldValue::Int(integer));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(FieldValue::Float)
}

/// Write a converted value into its target field.
///
/// The canonical target names map onto the typed fields of
/// [`UnifiedCamera`]; any other name lands in `extra`.
fn assign(camera: &mut UnifiedCamera, target_field: &str, value: FieldValue) {
    match target_field {
        "channel_ID" => camera.channel_id = value.as_string(),
        "name" => camera.name = value.as_string(),
        "channel_name" => camera.channel_name = value.as_string(),
        "supports_PTZ" => camera.supports_ptz = as_flag(&value),
        "is_enabled" => camera.is_enabled = as_flag(&value),
        "rtsp_URL" => camera.rtsp_url = value.as_string(),
        "original_ID" => camera.original_id = value.as_string(),
        other => {
            camera.extra.insert(other.to_string(), field_to_json(&value));
        }
    }
}

fn as_flag(value: &FieldValue) -> bool {
    match value {
        FieldValue::Bool(b) => *b,
        other => is_truthy(&other.as_string()),
    }
}

fn field_to_json(value: &FieldValue) -> serde_json::Value {
    match value {
        FieldValue::Bool(b) => serde_json::Value::Bool(*b),
        FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
        FieldValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
        FieldValue::Text(s) => serde_json::Value::String(s.clone()),
    }
}
