//! Raw Snapshot Store
//!
//! Persists the latest inventory fetched from each vendor: the response
//! payload exactly as received, plus the records extracted from it. Each
//! fetch replaces the vendor's previous snapshot wholesale.

mod repository;
mod types;

pub use repository::RawSnapshotRepository;
pub use types::RawSnapshot;
