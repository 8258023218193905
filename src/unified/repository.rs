//! Unified Camera Repository
//!
//! Database access layer for the unified camera store.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool};

use super::types::{StoredUnifiedCamera, UnifiedCamera};
use crate::error::Result;

/// Unified camera repository for database operations
#[derive(Clone)]
pub struct UnifiedCameraRepository {
    pool: MySqlPool,
}

impl UnifiedCameraRepository {
    /// Create new repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    const COLUMNS: &'static str = r#"
        vendor_type, channel_id, name, channel_name, supports_ptz, is_enabled,
        rtsp_url, original_id, extra, created_at, updated_at
    "#;

    /// Insert or fully replace one camera, keyed by (vendor_type, channel_id)
    pub async fn upsert(&self, camera: &UnifiedCamera) -> Result<()> {
        let extra_json = serde_json::Value::Object(camera.extra.clone());

        sqlx::query(
            r#"
            INSERT INTO unified_cameras
                (vendor_type, channel_id, name, channel_name, supports_ptz,
                 is_enabled, rtsp_url, original_id, extra, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, NOW(3), NOW(3))
            ON DUPLICATE KEY UPDATE
                name = VALUES(name),
                channel_name = VALUES(channel_name),
                supports_ptz = VALUES(supports_ptz),
                is_enabled = VALUES(is_enabled),
                rtsp_url = VALUES(rtsp_url),
                original_id = VALUES(original_id),
                extra = VALUES(extra),
                updated_at = NOW(3)
            "#,
        )
        .bind(&camera.vendor_type)
        .bind(&camera.channel_id)
        .bind(&camera.name)
        .bind(&camera.channel_name)
        .bind(camera.supports_ptz)
        .bind(camera.is_enabled)
        .bind(&camera.rtsp_url)
        .bind(&camera.original_id)
        .bind(&extra_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replace a vendor's whole unified set.
    ///
    /// Cameras that disappeared from the new set are removed first, then the
    /// remainder is upserted. Callers serialize per-vendor so the two steps
    /// are not interleaved with another writer.
    pub async fn replace_vendor(
        &self,
        vendor_type: &str,
        cameras: &[UnifiedCamera],
    ) -> Result<()> {
        if cameras.is_empty() {
            sqlx::query("DELETE FROM unified_cameras WHERE vendor_type = ?")
                .bind(vendor_type)
                .execute(&self.pool)
                .await?;
            return Ok(());
        }

        let channel_ids: Vec<&str> = cameras.iter().map(|c| c.channel_id.as_str()).collect();
        let placeholders = vec!["?"; channel_ids.len()].join(", ");
        let query = format!(
            "DELETE FROM unified_cameras WHERE vendor_type = ? AND channel_id NOT IN ({})",
            placeholders
        );
        let mut delete = sqlx::query(&query).bind(vendor_type);
        for channel_id in &channel_ids {
            delete = delete.bind(channel_id);
        }
        delete.execute(&self.pool).await?;

        for camera in cameras {
            self.upsert(camera).await?;
        }

        Ok(())
    }

    /// List all unified cameras
    pub async fn find_all(&self) -> Result<Vec<StoredUnifiedCamera>> {
        let query = format!(
            "SELECT {} FROM unified_cameras ORDER BY vendor_type, channel_id",
            Self::COLUMNS
        );
        let rows = sqlx::query_as::<_, UnifiedCameraRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(StoredUnifiedCamera::from).collect())
    }

    /// List one vendor's unified cameras
    pub async fn find_by_vendor(&self, vendor_type: &str) -> Result<Vec<StoredUnifiedCamera>> {
        let query = format!(
            "SELECT {} FROM unified_cameras WHERE vendor_type = ? ORDER BY channel_id",
            Self::COLUMNS
        );
        let rows = sqlx::query_as::<_, UnifiedCameraRow>(&query)
            .bind(vendor_type)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(StoredUnifiedCamera::from).collect())
    }

    /// Delete one camera. Returns false when it did not exist.
    pub async fn delete(&self, vendor_type: &str, channel_id: &str) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM unified_cameras WHERE vendor_type = ? AND channel_id = ?")
                .bind(vendor_type)
                .bind(channel_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ========================================
// Row types
// ========================================

#[derive(Debug, FromRow)]
struct UnifiedCameraRow {
    vendor_type: String,
    channel_id: String,
    name: String,
    channel_name: String,
    supports_ptz: bool,
    is_enabled: bool,
    rtsp_url: String,
    original_id: String,
    extra: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UnifiedCameraRow> for StoredUnifiedCamera {
    fn from(row: UnifiedCameraRow) -> Self {
        let extra = match row.extra {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };

        StoredUnifiedCamera {
            vendor_type: row.vendor_type,
            channel_id: row.channel_id,
            name: row.name,
            channel_name: row.channel_name,
            supports_ptz: row.supports_ptz,
            is_enabled: row.is_enabled,
            rtsp_url: row.rtsp_url,
            original_id: row.original_id,
            extra,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
