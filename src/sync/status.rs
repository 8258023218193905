//! Sync Status Tracker
//!
//! In-memory per-vendor synchronization state, surfaced over the API.
//! State is rebuilt from scratch on process restart.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

/// One vendor's synchronization state
#[derive(Debug, Clone, Default, Serialize)]
pub struct VendorSyncState {
    /// Cycle currently executing
    pub is_running: bool,
    /// Last time a cycle started
    pub last_attempt: Option<DateTime<Utc>>,
    /// Last time a cycle finished without error
    pub last_success: Option<DateTime<Utc>>,
    /// Records extracted by the last successful fetch
    pub record_count: usize,
    /// Unified cameras written by the last successful transformation
    pub camera_count: usize,
    /// Records excluded for missing channel identity
    pub excluded_count: usize,
    /// Consecutive failed cycles
    pub consecutive_failures: u32,
    /// Last error message
    pub last_error: Option<String>,
}

/// Periodic scheduler state
#[derive(Debug, Clone, Default, Serialize)]
pub struct PeriodicSyncState {
    /// Last full sync across all enabled vendors
    pub last_full_sync: Option<DateTime<Utc>>,
    /// Full sync currently executing
    pub is_running: bool,
    /// Next scheduled sync
    pub next_sync_at: Option<DateTime<Utc>>,
    /// Consecutive failed full syncs
    pub consecutive_failures: u32,
    /// Last error message
    pub last_error: Option<String>,
}

/// Tracks per-vendor and scheduler-level sync state
#[derive(Default)]
pub struct SyncStatusTracker {
    vendors: RwLock<HashMap<String, VendorSyncState>>,
    periodic: RwLock<PeriodicSyncState>,
}

impl SyncStatusTracker {
    /// Create new tracker
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================
    // Vendor cycle state
    // ========================================

    /// Record a cycle start
    pub async fn mark_started(&self, vendor_type: &str) {
        let mut vendors = self.vendors.write().await;
        let state = vendors.entry(vendor_type.to_string()).or_default();
        state.is_running = true;
        state.last_attempt = Some(Utc::now());
    }

    /// Record the fetch phase result
    pub async fn complete_fetch(&self, vendor_type: &str, record_count: usize) {
        let mut vendors = self.vendors.write().await;
        let state = vendors.entry(vendor_type.to_string()).or_default();
        state.record_count = record_count;
    }

    /// Record the transformation phase result
    pub async fn complete_transform(
        &self,
        vendor_type: &str,
        camera_count: usize,
        excluded_count: usize,
    ) {
        let mut vendors = self.vendors.write().await;
        let state = vendors.entry(vendor_type.to_string()).or_default();
        state.camera_count = camera_count;
        state.excluded_count = excluded_count;
    }

    /// Record a cycle finishing without error
    pub async fn complete(&self, vendor_type: &str) {
        let mut vendors = self.vendors.write().await;
        let state = vendors.entry(vendor_type.to_string()).or_default();
        state.is_running = false;
        state.last_success = Some(Utc::now());
        state.consecutive_failures = 0;
        state.last_error = None;
    }

    /// Record a failed cycle
    pub async fn fail(&self, vendor_type: &str, error: &str) {
        let mut vendors = self.vendors.write().await;
        let state = vendors.entry(vendor_type.to_string()).or_default();
        state.is_running = false;
        state.consecutive_failures += 1;
        state.last_error = Some(error.to_string());
    }

    /// Snapshot of every vendor's state, keyed by vendor type
    pub async fn vendor_states(&self) -> BTreeMap<String, VendorSyncState> {
        self.vendors
            .read()
            .await
            .iter()
            .map(|(vendor, state)| (vendor.clone(), state.clone()))
            .collect()
    }

    // ========================================
    // Periodic scheduler state
    // ========================================

    /// Record the next scheduled run
    pub async fn set_next_sync_at(&self, at: DateTime<Utc>) {
        let mut state = self.periodic.write().await;
        state.next_sync_at = Some(at);
    }

    /// Mark the periodic run as started. Returns false when one is already
    /// running.
    pub async fn begin_periodic(&self) -> bool {
        let mut state = self.periodic.write().await;
        if state.is_running {
            return false;
        }
        state.is_running = true;
        true
    }

    /// Record a periodic run finishing without error
    pub async fn complete_periodic(&self) {
        let mut state = self.periodic.write().await;
        state.is_running = false;
        state.last_full_sync = Some(Utc::now());
        state.consecutive_failures = 0;
        state.last_error = None;
    }

    /// Record a failed periodic run
    pub async fn fail_periodic(&self, error: &str) {
        let mut state = self.periodic.write().await;
        state.is_running = false;
        state.consecutive_failures += 1;
        state.last_error = Some(error.to_string());
    }

    /// Record a manually triggered full sync
    pub async fn mark_full_sync(&self) {
        let mut state = self.periodic.write().await;
        state.last_full_sync = Some(Utc::now());
    }

    /// Snapshot of the scheduler state
    pub async fn periodic_state(&self) -> PeriodicSyncState {
        self.periodic.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cycle_lifecycle() {
        let tracker = SyncStatusTracker::new();

        tracker.mark_started("dahua").await;
        let states = tracker.vendor_states().await;
        assert!(states["dahua"].is_running);
        assert!(states["dahua"].last_attempt.is_some());

        tracker.complete_fetch("dahua", 5).await;
        tracker.complete_transform("dahua", 4, 1).await;
        tracker.complete("dahua").await;

        let states = tracker.vendor_states().await;
        assert!(!states["dahua"].is_running);
        assert_eq!(states["dahua"].record_count, 5);
        assert_eq!(states["dahua"].camera_count, 4);
        assert_eq!(states["dahua"].excluded_count, 1);
        assert!(states["dahua"].last_success.is_some());
    }

    #[tokio::test]
    async fn test_failures_accumulate_and_reset() {
        let tracker = SyncStatusTracker::new();

        tracker.mark_started("naiz").await;
        tracker.fail("naiz", "connection refused").await;
        tracker.mark_started("naiz").await;
        tracker.fail("naiz", "connection refused").await;

        let states = tracker.vendor_states().await;
        assert_eq!(states["naiz"].consecutive_failures, 2);
        assert_eq!(
            states["naiz"].last_error.as_deref(),
            Some("connection refused")
        );

        tracker.mark_started("naiz").await;
        tracker.complete("naiz").await;

        let states = tracker.vendor_states().await;
        assert_eq!(states["naiz"].consecutive_failures, 0);
        assert!(states["naiz"].last_error.is_none());
    }

    #[tokio::test]
    async fn test_periodic_guard() {
        let tracker = SyncStatusTracker::new();

        assert!(tracker.begin_periodic().await);
        assert!(!tracker.begin_periodic().await);

        tracker.complete_periodic().await;
        let state = tracker.periodic_state().await;
        assert!(!state.is_running);
        assert!(state.last_full_sync.is_some());

        assert!(tracker.begin_periodic().await);
        tracker.fail_periodic("database unavailable").await;
        let state = tracker.periodic_state().await;
        assert_eq!(state.consecutive_failures, 1);
    }
}
