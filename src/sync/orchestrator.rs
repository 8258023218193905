//! Sync Orchestrator
//!
//! ベンダー同期サイクルの実行本体。1サイクル = 取得→抽出→RAW保存→変換→
//! 正規化保存。サイクル単位の失敗（通信・ペイロード解析）はそのベンダーに
//! 閉じ、保存済みデータは前回値のまま残る。

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use super::gate::{SyncGate, SyncLease};
use super::status::SyncStatusTracker;
use super::types::{FullSyncResponse, SyncStatusResponse, TransformReport, VendorSyncDetail, VendorSyncReport};
use crate::error::{Error, Result};
use crate::mapping::MappingRuleService;
use crate::raw::RawSnapshotRepository;
use crate::transform;
use crate::unified::UnifiedCameraRepository;
use crate::vendor::{
    VendorAdapter, VendorEndpoint, VendorEndpointRepository, VendorHttpClient, VendorKind,
};

/// デフォルト同期間隔（秒）: 1時間
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 3600;

/// 最小同期間隔（秒）: 5分
const MIN_SYNC_INTERVAL_SECS: u64 = 300;

/// Sync Orchestrator
pub struct SyncOrchestrator {
    endpoints: VendorEndpointRepository,
    raw_snapshots: RawSnapshotRepository,
    mappings: MappingRuleService,
    unified: UnifiedCameraRepository,
    http_client: VendorHttpClient,
    gate: SyncGate,
    status: SyncStatusTracker,
}

impl SyncOrchestrator {
    /// 新しいSyncOrchestratorを作成
    pub fn new(
        endpoints: VendorEndpointRepository,
        raw_snapshots: RawSnapshotRepository,
        mappings: MappingRuleService,
        unified: UnifiedCameraRepository,
        http_client: VendorHttpClient,
    ) -> Self {
        Self {
            endpoints,
            raw_snapshots,
            mappings,
            unified,
            http_client,
            gate: SyncGate::new(),
            status: SyncStatusTracker::new(),
        }
    }

    // ========================================
    // 定期同期スケジューラ
    // ========================================

    /// 定期同期を開始（バックグラウンドタスク）
    ///
    /// # Arguments
    /// * `interval_secs` - 同期間隔（秒）。Noneの場合はデフォルト1時間
    pub async fn start_periodic_sync(self: Arc<Self>, interval_secs: Option<u64>) {
        let interval = interval_secs
            .map(|s| s.max(MIN_SYNC_INTERVAL_SECS))
            .unwrap_or(DEFAULT_SYNC_INTERVAL_SECS);

        info!(
            interval_secs = interval,
            "Starting periodic inventory sync scheduler"
        );

        // 初回同期までの待機時間（起動直後は少し待つ）
        tokio::time::sleep(Duration::from_secs(30)).await;

        let mut ticker = tokio::time::interval(Duration::from_secs(interval));
        // 最初のtickはすぐに発火するのでスキップ
        ticker.tick().await;

        loop {
            ticker.tick().await;

            self.status
                .set_next_sync_at(Utc::now() + chrono::Duration::seconds(interval as i64))
                .await;

            self.execute_periodic_sync().await;
        }
    }

    /// 定期同期を実行
    async fn execute_periodic_sync(&self) {
        if !self.status.begin_periodic().await {
            warn!("Periodic sync already running, skipping");
            return;
        }

        info!("Executing periodic inventory sync");

        match self.trigger_full_sync().await {
            Ok(response) => {
                self.status.complete_periodic().await;
                info!(
                    synced_count = response.synced_count,
                    failed_count = response.failed_count,
                    "Periodic inventory sync completed"
                );
            }
            Err(e) => {
                self.status.fail_periodic(&e.to_string()).await;
                warn!(error = %e, "Periodic inventory sync failed");
            }
        }
    }

    // ========================================
    // 同期トリガ
    // ========================================

    /// 1ベンダーのフルサイクルを実行（取得→RAW保存→変換→正規化保存）
    pub async fn sync_vendor_full(&self, vendor_type: &str) -> Result<VendorSyncReport> {
        let kind = Self::parse_vendor(vendor_type)?;
        let endpoint = self.require_endpoint(kind).await?;
        let _lease = self.acquire_lease(kind).await?;

        info!(vendor_type = %kind, "Starting inventory sync cycle");
        self.status.mark_started(kind.as_str()).await;

        match self.run_full_cycle(kind, &endpoint).await {
            Ok(report) => {
                self.status.complete(kind.as_str()).await;
                info!(
                    vendor_type = %kind,
                    record_count = report.record_count,
                    camera_count = report.camera_count,
                    excluded_count = report.excluded_count,
                    "Inventory sync cycle completed"
                );
                Ok(report)
            }
            Err(e) => {
                self.status.fail(kind.as_str(), &e.to_string()).await;
                error!(vendor_type = %kind, error = %e, "Inventory sync cycle failed");
                Err(e)
            }
        }
    }

    /// 取得フェーズのみ実行（RAWスナップショット更新、変換なし）
    pub async fn synchronize_vendor(&self, vendor_type: &str) -> Result<usize> {
        let kind = Self::parse_vendor(vendor_type)?;
        let endpoint = self.require_endpoint(kind).await?;
        let _lease = self.acquire_lease(kind).await?;

        self.status.mark_started(kind.as_str()).await;

        match self.fetch_and_persist(kind, &endpoint).await {
            Ok(record_count) => {
                self.status.complete_fetch(kind.as_str(), record_count).await;
                self.status.complete(kind.as_str()).await;
                info!(
                    vendor_type = %kind,
                    record_count = record_count,
                    "Raw inventory synchronized"
                );
                Ok(record_count)
            }
            Err(e) => {
                self.status.fail(kind.as_str(), &e.to_string()).await;
                error!(vendor_type = %kind, error = %e, "Raw inventory sync failed");
                Err(e)
            }
        }
    }

    /// 保存済みRAWスナップショットから変換のみ再実行
    pub async fn transform_vendor(&self, vendor_type: &str) -> Result<TransformReport> {
        let kind = Self::parse_vendor(vendor_type)?;
        let endpoint = self.require_endpoint(kind).await?;
        let _lease = self.acquire_lease(kind).await?;

        match self.transform_stored(kind, &endpoint).await {
            Ok((camera_count, excluded_count)) => {
                self.status
                    .complete_transform(kind.as_str(), camera_count, excluded_count)
                    .await;
                info!(
                    vendor_type = %kind,
                    camera_count = camera_count,
                    excluded_count = excluded_count,
                    "Stored snapshot re-transformed"
                );
                Ok(TransformReport {
                    vendor_type: kind.as_str().to_string(),
                    camera_count,
                    excluded_count,
                })
            }
            Err(e) => {
                error!(vendor_type = %kind, error = %e, "Snapshot transformation failed");
                Err(e)
            }
        }
    }

    /// 全有効ベンダーを並行同期（ベンダー間で障害を隔離）
    pub async fn trigger_full_sync(&self) -> Result<FullSyncResponse> {
        info!("Triggering full inventory sync");

        let endpoints = self.endpoints.find_enabled().await?;

        if endpoints.is_empty() {
            return Ok(FullSyncResponse {
                success: true,
                synced_count: 0,
                failed_count: 0,
                details: vec![],
            });
        }

        let tasks = endpoints
            .iter()
            .map(|endpoint| self.sync_endpoint_detail(endpoint));
        let details = join_all(tasks).await;

        let synced_count = details.iter().filter(|d| d.status == "synced").count();
        let failed_count = details.len() - synced_count;
        let success = failed_count == 0;

        if success {
            self.status.mark_full_sync().await;
        }

        info!(
            synced_count = synced_count,
            failed_count = failed_count,
            "Full inventory sync completed"
        );

        Ok(FullSyncResponse {
            success,
            synced_count,
            failed_count,
            details,
        })
    }

    // ========================================
    // 状態取得
    // ========================================

    /// 同期状態を取得
    pub async fn get_sync_status(&self) -> SyncStatusResponse {
        SyncStatusResponse {
            periodic: self.status.periodic_state().await,
            vendors: self.status.vendor_states().await,
        }
    }

    // ========================================
    // 内部ヘルパー
    // ========================================

    /// 1ベンダー分の同期を実行し、結果を集計用detailに畳む
    async fn sync_endpoint_detail(&self, endpoint: &VendorEndpoint) -> VendorSyncDetail {
        match self.sync_vendor_full(&endpoint.vendor_type).await {
            Ok(report) => VendorSyncDetail {
                vendor_type: report.vendor_type,
                status: "synced".to_string(),
                record_count: report.record_count,
                camera_count: report.camera_count,
                excluded_count: report.excluded_count,
                error: None,
            },
            Err(e) => VendorSyncDetail {
                vendor_type: endpoint.vendor_type.clone(),
                status: "failed".to_string(),
                record_count: 0,
                camera_count: 0,
                excluded_count: 0,
                error: Some(e.to_string()),
            },
        }
    }

    async fn run_full_cycle(
        &self,
        kind: VendorKind,
        endpoint: &VendorEndpoint,
    ) -> Result<VendorSyncReport> {
        let record_count = self.fetch_and_persist(kind, endpoint).await?;
        self.status.complete_fetch(kind.as_str(), record_count).await;

        let (camera_count, excluded_count) = self.transform_stored(kind, endpoint).await?;
        self.status
            .complete_transform(kind.as_str(), camera_count, excluded_count)
            .await;

        Ok(VendorSyncReport {
            vendor_type: kind.as_str().to_string(),
            record_count,
            camera_count,
            excluded_count,
        })
    }

    /// 取得フェーズ: ベンダーへ1回GET、抽出結果と生ペイロードをRAW保存
    async fn fetch_and_persist(
        &self,
        kind: VendorKind,
        endpoint: &VendorEndpoint,
    ) -> Result<usize> {
        let result = VendorAdapter::fetch_inventory(kind, endpoint, &self.http_client).await?;

        self.raw_snapshots
            .replace_all(kind.as_str(), &result.payload, &result.records)
            .await?;

        debug!(
            vendor_type = %kind,
            record_count = result.records.len(),
            "Raw snapshot replaced"
        );

        Ok(result.records.len())
    }

    /// 変換フェーズ: 保存済みRAW + 現在のルールセット → 正規化カメラ一式を置換
    async fn transform_stored(
        &self,
        kind: VendorKind,
        endpoint: &VendorEndpoint,
    ) -> Result<(usize, usize)> {
        let records = self
            .raw_snapshots
            .read_records(kind.as_str())
            .await?
            .ok_or(Error::NotFound(format!(
                "No raw snapshot stored for vendor '{}'",
                kind
            )))?;

        let rules = self.mappings.get_or_default(kind.as_str()).await?;
        let mut outcome = transform::apply_rule_set(&records, &rules);

        // ルールがrtsp_URLを書いた場合はそれが優先、未設定のみテンプレートで補完
        for camera in &mut outcome.cameras {
            if camera.rtsp_url.is_empty() {
                camera.rtsp_url = VendorAdapter::build_rtsp_url(kind, endpoint, &camera.channel_id);
            }
        }

        self.unified
            .replace_vendor(kind.as_str(), &outcome.cameras)
            .await?;

        Ok((outcome.cameras.len(), outcome.excluded))
    }

    async fn require_endpoint(&self, kind: VendorKind) -> Result<VendorEndpoint> {
        self.endpoints
            .find_by_vendor(kind.as_str())
            .await?
            .ok_or(Error::NotFound(format!(
                "No endpoint configured for vendor '{}'",
                kind
            )))
    }

    async fn acquire_lease(&self, kind: VendorKind) -> Result<SyncLease> {
        self.gate
            .try_acquire(kind.as_str())
            .await
            .ok_or(Error::Conflict(format!(
                "Synchronization already in progress for vendor '{}'",
                kind
            )))
    }

    fn parse_vendor(vendor_type: &str) -> Result<VendorKind> {
        VendorKind::parse(vendor_type).ok_or(Error::Validation(format!(
            "Unknown vendor type: '{}'",
            vendor_type
        )))
    }
}
