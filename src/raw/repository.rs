//! Raw Snapshot Repository
//!
//! Database access layer for per-vendor raw inventory snapshots.

use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use super::types::RawSnapshot;
use crate::error::{Error, Result};
use crate::record::RawCameraRecord;

/// Raw snapshot repository for database operations
#[derive(Clone)]
pub struct RawSnapshotRepository {
    pool: MySqlPool,
}

impl RawSnapshotRepository {
    /// Create new repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    const COLUMNS: &'static str = r#"
        vendor_type, payload, records, record_count, fetched_at
    "#;

    /// Replace one vendor's stored snapshot with a freshly fetched one
    pub async fn replace_all(
        &self,
        vendor_type: &str,
        payload: &str,
        records: &[RawCameraRecord],
    ) -> Result<()> {
        let records_json = serde_json::to_string(records)?;

        sqlx::query(
            r#"
            INSERT INTO raw_snapshots
                (vendor_type, payload, records, record_count, fetched_at)
            VALUES
                (?, ?, ?, ?, NOW(3))
            ON DUPLICATE KEY UPDATE
                payload = VALUES(payload),
                records = VALUES(records),
                record_count = VALUES(record_count),
                fetched_at = NOW(3)
            "#,
        )
        .bind(vendor_type)
        .bind(payload)
        .bind(&records_json)
        .bind(records.len() as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get one vendor's stored snapshot
    pub async fn find_by_vendor(&self, vendor_type: &str) -> Result<Option<RawSnapshot>> {
        let query = format!(
            "SELECT {} FROM raw_snapshots WHERE vendor_type = ?",
            Self::COLUMNS
        );
        let row = sqlx::query_as::<_, RawSnapshotRow>(&query)
            .bind(vendor_type)
            .fetch_optional(&self.pool)
            .await?;

        row.map(RawSnapshot::try_from).transpose()
    }

    /// Get only the extracted records from one vendor's stored snapshot
    pub async fn read_records(&self, vendor_type: &str) -> Result<Option<Vec<RawCameraRecord>>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT records FROM raw_snapshots WHERE vendor_type = ?")
                .bind(vendor_type)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(records,)| parse_records(&records)).transpose()
    }
}

fn parse_records(json: &str) -> Result<Vec<RawCameraRecord>> {
    serde_json::from_str(json).map_err(|e| Error::Database(format!("Corrupt snapshot records: {}", e)))
}

// ========================================
// Database row
// ========================================

#[derive(sqlx::FromRow)]
struct RawSnapshotRow {
    vendor_type: String,
    payload: String,
    records: String,
    record_count: i64,
    fetched_at: DateTime<Utc>,
}

impl TryFrom<RawSnapshotRow> for RawSnapshot {
    type Error = Error;

    fn try_from(row: RawSnapshotRow) -> Result<Self> {
        Ok(Self {
            vendor_type: row.vendor_type,
            payload: row.payload,
            records: parse_records(&row.records)?,
            record_count: row.record_count,
            fetched_at: row.fetched_at,
        })
    }
}
