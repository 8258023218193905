//! Unicam Server Library
//!
//! Unified camera inventory for mixed VMS/NVR fleets
//!
//! ## Architecture (8 Components)
//!
//! 1. VendorAdapter - Per-vendor inventory fetch (dahua, emstone, hanwha, naiz)
//! 2. WireFormatExtractor - Dotted-config / JSON / XML payload extraction
//! 3. RawSnapshot - Persisted vendor responses and extracted records
//! 4. MappingRuleStore - Per-vendor field transformation rules
//! 5. TransformationEngine - Raw records to unified camera schema
//! 6. SyncOrchestrator - Fetch, extract, persist, transform, upsert
//! 7. UnifiedCameraStore - Cross-vendor camera inventory
//! 8. WebAPI - REST API endpoints
//!
//! ## Design Principles
//!
//! - Raw snapshots are the replayable source for re-transformation
//! - Per-vendor isolation: one vendor failing never blocks another
//! - Mapping rules are data, not code

pub mod db;
pub mod error;
pub mod extract;
pub mod mapping;
pub mod models;
pub mod raw;
pub mod record;
pub mod state;
pub mod sync;
pub mod transform;
pub mod unified;
pub mod vendor;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
