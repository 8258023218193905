//! Database setup
//!
//! Pool creation and startup schema initialization. Tables are created in
//! code on boot so a fresh MySQL database is usable without a separate
//! migration step.

use std::time::Duration;

use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;

use crate::error::Result;

/// Create the MySQL connection pool
pub async fn create_pool(database_url: &str) -> Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Create every table the server uses, when not present yet.
///
/// Raw snapshot records are stored as JSON text in MEDIUMTEXT, not a JSON
/// column: MySQL JSON normalizes object key order, and record field order
/// is part of the extraction contract.
pub async fn init_schema(pool: &MySqlPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vendor_endpoints (
            vendor_type VARCHAR(32) NOT NULL PRIMARY KEY,
            host VARCHAR(255) NOT NULL,
            port INT NULL,
            username VARCHAR(255) NOT NULL DEFAULT '',
            password VARCHAR(255) NOT NULL DEFAULT '',
            enabled BOOLEAN NOT NULL DEFAULT TRUE,
            created_at DATETIME(3) NOT NULL,
            updated_at DATETIME(3) NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS raw_snapshots (
            vendor_type VARCHAR(32) NOT NULL PRIMARY KEY,
            payload MEDIUMTEXT NOT NULL,
            records MEDIUMTEXT NOT NULL,
            record_count BIGINT NOT NULL DEFAULT 0,
            fetched_at DATETIME(3) NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mapping_rule_sets (
            vendor_type VARCHAR(32) NOT NULL PRIMARY KEY,
            transformations JSON NOT NULL,
            channel_id_source VARCHAR(255) NULL,
            created_at DATETIME(3) NOT NULL,
            updated_at DATETIME(3) NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS unified_cameras (
            vendor_type VARCHAR(32) NOT NULL,
            channel_id VARCHAR(128) NOT NULL,
            name VARCHAR(255) NOT NULL DEFAULT '',
            channel_name VARCHAR(255) NOT NULL DEFAULT '',
            supports_ptz BOOLEAN NOT NULL DEFAULT FALSE,
            is_enabled BOOLEAN NOT NULL DEFAULT TRUE,
            rtsp_url VARCHAR(512) NOT NULL DEFAULT '',
            original_id VARCHAR(255) NOT NULL DEFAULT '',
            extra JSON NOT NULL,
            created_at DATETIME(3) NOT NULL,
            updated_at DATETIME(3) NOT NULL,
            PRIMARY KEY (vendor_type, channel_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database schema ensured");

    Ok(())
}
