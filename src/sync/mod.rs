//! Synchronization Module
//!
//! ## 概要
//! ベンダーごとのカメラ台帳取得サイクル（取得→抽出→RAW保存→変換→正規化保存）を
//! 統括する。ベンダー間で障害を隔離し、同一ベンダーの同時実行は
//! シングルフライトで直列化する。
//!
//! ## 機能
//! - 手動同期トリガ（単一ベンダー / 全ベンダー）
//! - 保存済みRAWスナップショットからの再変換
//! - 定期同期スケジューラ
//! - ベンダー別同期状態の追跡
//!
//! ## モジュール構成
//! - `gate`: ベンダー単位のシングルフライトガード
//! - `orchestrator`: 同期サイクルの実行
//! - `status`: 同期状態トラッカー
//! - `types`: 同期結果の型定義

pub mod gate;
pub mod orchestrator;
pub mod status;
pub mod types;

// Re-exports
pub use gate::{SyncGate, SyncLease};
pub use orchestrator::SyncOrchestrator;
pub use status::{PeriodicSyncState, SyncStatusTracker, VendorSyncState};
pub use types::*;
