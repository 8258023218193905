//! Mapping Rule Service
//!
//! Holds one ordered field-mapping rule set per vendor type, including the
//! channel-identity rule. A vendor with no stored rule set gets an empty
//! default synthesized on read, never an error.

mod repository;
mod service;
mod types;

pub use repository::MappingRuleRepository;
pub use service::MappingRuleService;
pub use types::*;
