//! Unified Camera Store
//!
//! Canonical, vendor-agnostic camera records keyed by (vendor_type,
//! channel_id). Writes are full replaces: a field dropped by an edited rule
//! set disappears from the stored record on the next transformation run.

mod repository;
mod types;

pub use repository::UnifiedCameraRepository;
pub use types::*;
