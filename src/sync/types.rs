//! Synchronization result types

use serde::Serialize;

use super::status::{PeriodicSyncState, VendorSyncState};

/// Result of one vendor's full cycle (fetch, persist raw, transform, upsert)
#[derive(Debug, Clone, Serialize)]
pub struct VendorSyncReport {
    pub vendor_type: String,
    /// Records extracted from the vendor payload
    pub record_count: usize,
    /// Unified cameras written
    pub camera_count: usize,
    /// Records excluded for missing channel identity
    pub excluded_count: usize,
}

/// Result of re-running the transformation from the stored snapshot
#[derive(Debug, Clone, Serialize)]
pub struct TransformReport {
    pub vendor_type: String,
    pub camera_count: usize,
    pub excluded_count: usize,
}

/// Result of a sync across all enabled vendors
#[derive(Debug, Clone, Serialize)]
pub struct FullSyncResponse {
    pub success: bool,
    pub synced_count: usize,
    pub failed_count: usize,
    pub details: Vec<VendorSyncDetail>,
}

/// Per-vendor outcome within a full sync
#[derive(Debug, Clone, Serialize)]
pub struct VendorSyncDetail {
    pub vendor_type: String,
    pub status: String,
    pub record_count: usize,
    pub camera_count: usize,
    pub excluded_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate view returned by the sync status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatusResponse {
    pub periodic: PeriodicSyncState,
    pub vendors: std::collections::BTreeMap<String, VendorSyncState>,
}
