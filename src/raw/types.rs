//! Raw snapshot types

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::record::RawCameraRecord;

/// Latest fetched inventory for one vendor
#[derive(Debug, Clone, Serialize)]
pub struct RawSnapshot {
    pub vendor_type: String,
    /// Response body exactly as received from the vendor device
    pub payload: String,
    pub records: Vec<RawCameraRecord>,
    pub record_count: i64,
    pub fetched_at: DateTime<Utc>,
}
