//! Mapping Rule Repository
//!
//! Database access layer for mapping rule sets. Transformations are stored
//! as a JSON column; the channel-identity source field is a plain column so
//! rule sets stay queryable.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool};

use super::types::{ChannelIdTransformation, FieldTransformation, MappingRuleSet};
use crate::error::{Error, Result};

/// Mapping rule set repository for database operations
#[derive(Clone)]
pub struct MappingRuleRepository {
    pool: MySqlPool,
}

impl MappingRuleRepository {
    /// Create new repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    const COLUMNS: &'static str = r#"
        vendor_type, transformations, channel_id_source, created_at, updated_at
    "#;

    /// Get all stored rule sets
    pub async fn find_all(&self) -> Result<Vec<MappingRuleSet>> {
        let query = format!(
            "SELECT {} FROM mapping_rule_sets ORDER BY vendor_type",
            Self::COLUMNS
        );
        let rows = sqlx::query_as::<_, MappingRuleSetRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(MappingRuleSet::try_from).collect()
    }

    /// Get the rule set for one vendor type
    pub async fn find_by_vendor(&self, vendor_type: &str) -> Result<Option<MappingRuleSet>> {
        let query = format!(
            "SELECT {} FROM mapping_rule_sets WHERE vendor_type = ?",
            Self::COLUMNS
        );
        let row = sqlx::query_as::<_, MappingRuleSetRow>(&query)
            .bind(vendor_type)
            .fetch_optional(&self.pool)
            .await?;

        row.map(MappingRuleSet::try_from).transpose()
    }

    /// Insert or replace the rule set for a vendor type
    pub async fn upsert(
        &self,
        vendor_type: &str,
        transformations: &[FieldTransformation],
        channel_id_source: Option<&str>,
    ) -> Result<MappingRuleSet> {
        let transformations_json = serde_json::to_value(transformations)?;

        sqlx::query(
            r#"
            INSERT INTO mapping_rule_sets
                (vendor_type, transformations, channel_id_source, created_at, updated_at)
            VALUES
                (?, ?, ?, NOW(3), NOW(3))
            ON DUPLICATE KEY UPDATE
                transformations = VALUES(transformations),
                channel_id_source = VALUES(channel_id_source),
                updated_at = NOW(3)
            "#,
        )
        .bind(vendor_type)
        .bind(&transformations_json)
        .bind(channel_id_source)
        .execute(&self.pool)
        .await?;

        self.find_by_vendor(vendor_type).await?.ok_or(Error::NotFound(
            "Mapping rule set not found after upsert".to_string(),
        ))
    }

    /// Delete the rule set for a vendor type. Returns false when none existed.
    pub async fn delete(&self, vendor_type: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM mapping_rule_sets WHERE vendor_type = ?")
            .bind(vendor_type)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ========================================
// Row types
// ========================================

#[derive(Debug, FromRow)]
struct MappingRuleSetRow {
    vendor_type: String,
    transformations: serde_json::Value,
    channel_id_source: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MappingRuleSetRow> for MappingRuleSet {
    type Error = Error;

    fn try_from(row: MappingRuleSetRow) -> Result<Self> {
        let transformations: Vec<FieldTransformation> =
            serde_json::from_value(row.transformations).map_err(|e| {
                Error::Database(format!(
                    "mapping rule set for {} has invalid transformations JSON: {}",
                    row.vendor_type, e
                ))
            })?;

        Ok(MappingRuleSet {
            vendor_type: row.vendor_type,
            transformations,
            channel_id_transformation: row
                .channel_id_source
                .map(|source_field| ChannelIdTransformation { source_field }),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
