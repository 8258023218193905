//! Mapping Rule Service
//!
//! Read/write surface for per-vendor mapping rule sets.

use super::repository::MappingRuleRepository;
use super::types::{MappingRuleSet, SaveMappingRequest};
use crate::error::{Error, Result};

/// Mapping rule set management
#[derive(Clone)]
pub struct MappingRuleService {
    repository: MappingRuleRepository,
}

impl MappingRuleService {
    pub fn new(repository: MappingRuleRepository) -> Self {
        Self { repository }
    }

    /// Get the rule set for a vendor, synthesizing an empty default when
    /// none is stored. Absence is never an error.
    pub async fn get_or_default(&self, vendor_type: &str) -> Result<MappingRuleSet> {
        match self.repository.find_by_vendor(vendor_type).await? {
            Some(rules) => Ok(rules),
            None => {
                tracing::debug!(
                    vendor_type = %vendor_type,
                    "No mapping rule set stored, using empty default"
                );
                Ok(MappingRuleSet::default_for(vendor_type))
            }
        }
    }

    /// List stored rule sets (vendors without one are not listed)
    pub async fn list(&self) -> Result<Vec<MappingRuleSet>> {
        self.repository.find_all().await
    }

    /// Save the rule set for a vendor, replacing any previous one
    pub async fn save(
        &self,
        vendor_type: &str,
        request: &SaveMappingRequest,
    ) -> Result<MappingRuleSet> {
        request.validate().map_err(Error::Validation)?;

        let saved = self
            .repository
            .upsert(
                vendor_type,
                &request.transformations,
                request
                    .channel_id_transformation
                    .as_ref()
                    .map(|c| c.source_field.as_str()),
            )
            .await?;

        tracing::info!(
            vendor_type = %vendor_type,
            transformation_count = saved.transformations.len(),
            "Mapping rule set saved"
        );

        Ok(saved)
    }

    /// Delete the rule set for a vendor
    pub async fn delete(&self, vendor_type: &str) -> Result<()> {
        if !self.repository.delete(vendor_type).await? {
            return Err(Error::NotFound(format!(
                "No mapping rule set for vendor {}",
                vendor_type
            )));
        }

        tracing::info!(vendor_type = %vendor_type, "Mapping rule set deleted");
        Ok(())
    }
}
