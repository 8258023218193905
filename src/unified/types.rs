//! Unified camera data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical camera record produced by the transformation engine.
///
/// Identity is (vendor_type, channel_id). Carries no timestamps so the same
/// raw record and rule set always produce an identical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedCamera {
    pub vendor_type: String,
    pub channel_id: String,
    pub name: String,
    pub channel_name: String,
    pub supports_ptz: bool,
    pub is_enabled: bool,
    pub rtsp_url: String,
    pub original_id: String,
    /// Target fields outside the canonical set
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UnifiedCamera {
    /// New record with field defaults (enabled, no PTZ, empty strings)
    pub fn new(vendor_type: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            vendor_type: vendor_type.into(),
            channel_id: channel_id.into(),
            name: String::new(),
            channel_name: String::new(),
            supports_ptz: false,
            is_enabled: true,
            rtsp_url: String::new(),
            original_id: String::new(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Unified camera as stored, with write timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUnifiedCamera {
    pub vendor_type: String,
    pub channel_id: String,
    pub name: String,
    pub channel_name: String,
    pub supports_ptz: bool,
    pub is_enabled: bool,
    pub rtsp_url: String,
    pub original_id: String,
    pub extra: serde_json::Map<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
