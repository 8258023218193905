//! SyncGate - ベンダーごとの同期直列化
//!
//! ## 目的
//!
//! - 同一ベンダーの同期サイクル多重実行を防止
//! - 実行中のベンダーへの追加トリガは即時拒否（シングルフライト）
//! - リースのDropで自動解放

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// SyncGate - ベンダータイプごとの同期アクセスを直列化
pub struct SyncGate {
    /// ベンダータイプごとのロック
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl SyncGate {
    /// 新規作成
    pub fn new() -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// ベンダーの同期実行権を試行取得（待機なし）
    ///
    /// - 他が実行中なら即None
    pub async fn try_acquire(&self, vendor_type: &str) -> Option<SyncLease> {
        let lock = self.get_or_create_lock(vendor_type).await;

        match lock.clone().try_lock_owned() {
            Ok(guard) => {
                tracing::debug!(vendor_type = %vendor_type, "Sync lease acquired");
                Some(SyncLease {
                    vendor_type: vendor_type.to_string(),
                    _guard: guard,
                })
            }
            Err(_) => {
                tracing::debug!(vendor_type = %vendor_type, "Sync lease denied - vendor busy");
                None
            }
        }
    }

    /// ベンダータイプに対応するロックを取得（なければ作成）
    async fn get_or_create_lock(&self, vendor_type: &str) -> Arc<Mutex<()>> {
        // 読み取りロックでまず確認
        {
            let locks = self.locks.read().await;
            if let Some(lock) = locks.get(vendor_type) {
                return lock.clone();
            }
        }

        // なければ書き込みロックで作成
        let mut locks = self.locks.write().await;
        locks
            .entry(vendor_type.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 登録済みベンダー数を取得（デバッグ用）
    pub async fn lock_count(&self) -> usize {
        self.locks.read().await.len()
    }
}

impl Default for SyncGate {
    fn default() -> Self {
        Self::new()
    }
}

/// 同期リース - Dropで自動解放
pub struct SyncLease {
    vendor_type: String,
    _guard: tokio::sync::OwnedMutexGuard<()>,
}

impl SyncLease {
    pub fn vendor_type(&self) -> &str {
        &self.vendor_type
    }
}

impl Drop for SyncLease {
    fn drop(&mut self) {
        tracing::debug!(vendor_type = %self.vendor_type, "Sync lease released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_release() {
        let gate = SyncGate::new();

        // 取得
        let lease = gate.try_acquire("dahua").await.unwrap();
        assert_eq!(lease.vendor_type(), "dahua");

        // Dropで解放
        drop(lease);

        // 再取得可能
        let _lease2 = gate.try_acquire("dahua").await.unwrap();
    }

    #[tokio::test]
    async fn test_try_acquire_busy() {
        let gate = SyncGate::new();

        // 1つ目取得
        let _lease1 = gate.try_acquire("dahua").await.unwrap();

        // 2つ目は即失敗
        let result = gate.try_acquire("dahua").await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_different_vendors() {
        let gate = SyncGate::new();

        // 異なるベンダーは同時取得可能
        let lease1 = gate.try_acquire("dahua").await.unwrap();
        let lease2 = gate.try_acquire("emstone").await.unwrap();

        assert_eq!(lease1.vendor_type(), "dahua");
        assert_eq!(lease2.vendor_type(), "emstone");
        assert_eq!(gate.lock_count().await, 2);
    }
}
