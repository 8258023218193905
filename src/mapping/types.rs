//! Mapping rule data types

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value conversion applied when a transformation assigns its target field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformationType {
    DefaultConversion,
    BooleanConversion,
    NumberConversion,
    StringFormat,
}

impl Default for TransformationType {
    fn default() -> Self {
        Self::DefaultConversion
    }
}

/// One field mapping: raw source field to canonical target field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldTransformation {
    pub source_field: String,
    pub target_field: String,
    #[serde(default)]
    pub transformation_type: TransformationType,
    /// Extra settings per conversion (STRING_FORMAT reads its template
    /// from the "format" key)
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

/// Names the raw field that supplies the per-vendor channel identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelIdTransformation {
    pub source_field: String,
}

/// Ordered rule set for one vendor type.
///
/// Transformation order is significant: later rules overwrite earlier ones
/// when they target the same field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingRuleSet {
    pub vendor_type: String,
    pub transformations: Vec<FieldTransformation>,
    pub channel_id_transformation: Option<ChannelIdTransformation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MappingRuleSet {
    /// Empty default synthesized when a vendor has no stored rule set
    pub fn default_for(vendor_type: &str) -> Self {
        let now = Utc::now();
        Self {
            vendor_type: vendor_type.to_string(),
            transformations: Vec::new(),
            channel_id_transformation: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Rule set save request (PUT body)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMappingRequest {
    #[serde(default)]
    pub transformations: Vec<FieldTransformation>,
    pub channel_id_transformation: Option<ChannelIdTransformation>,
}

impl SaveMappingRequest {
    pub fn validate(&self) -> Result<(), String> {
        for (position, transformation) in self.transformations.iter().enumerate() {
            if transformation.source_field.trim().is_empty() {
                return Err(format!(
                    "transformations[{}]: source_field must not be empty",
                    position
                ));
            }
            if transformation.target_field.trim().is_empty() {
                return Err(format!(
                    "transformations[{}]: target_field must not be empty",
                    position
                ));
            }
        }
        if let Some(channel_id) = &self.channel_id_transformation {
            if channel_id.source_field.trim().is_empty() {
                return Err("channel_id_transformation.source_field must not be empty".to_string());
            }
        }
        Ok(())
    }
}
