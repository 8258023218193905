//! E2E Test Tool for Unicam Server vendor synchronization
//!
//! ## 使用方法
//! ```bash
//! # 読み取り系テストのみ（デフォルト）
//! cargo run -- --server http://192.168.3.50:8080
//!
//! # 同期トリガーを含む全テスト実行
//! cargo run -- --server http://192.168.3.50:8080 --all
//!
//! # 個別テスト
//! cargo run -- --server http://192.168.3.50:8080 --test vendor_sync --vendor dahua
//! ```

use anyhow::Result;
use clap::Parser;
use colored::*;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "e2e-sync-test")]
#[command(about = "E2E Test Tool for Unicam Server vendor synchronization")]
struct Args {
    /// Unicam server URL (e.g., http://192.168.3.50:8080)
    #[arg(long, default_value = "http://localhost:8080")]
    server: String,

    /// Run all tests (includes sync triggers)
    #[arg(long)]
    all: bool,

    /// Run specific test (health, vendors, mappings, sync_status, full_sync,
    /// vendor_sync, raw_sync, transform, raw, cameras)
    #[arg(long)]
    test: Option<String>,

    /// Vendor to target for per-vendor tests
    #[arg(long, default_value = "dahua")]
    vendor: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// テスト結果
#[derive(Debug)]
struct TestResult {
    name: String,
    success: bool,
    duration_ms: u64,
    message: String,
    details: Option<String>,
}

impl TestResult {
    fn success(name: &str, duration_ms: u64, message: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            duration_ms,
            message: message.to_string(),
            details: None,
        }
    }

    fn failure(name: &str, duration_ms: u64, message: &str) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            duration_ms,
            message: message.to_string(),
            details: None,
        }
    }

    fn with_details(mut self, details: &str) -> Self {
        self.details = Some(details.to_string());
        self
    }

    fn print(&self) {
        let status = if self.success {
            "✅".green()
        } else {
            "❌".red()
        };
        let result = if self.success { "SUCCESS" } else { "FAILED" };
        println!(
            "{} {}: {} ({}ms)",
            status,
            self.name.bold(),
            result
                .to_string()
                .color(if self.success { Color::Green } else { Color::Red }),
            self.duration_ms
        );
        if !self.message.is_empty() {
            println!("   └─ {}", self.message);
        }
        if let Some(ref details) = self.details {
            for line in details.lines() {
                println!("      {}", line.dimmed());
            }
        }
    }
}

/// ヘルスチェックレスポンス
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
    db_connected: bool,
}

/// テストランナー
struct TestRunner {
    client: Client,
    server_url: String,
    vendor: String,
    verbose: bool,
}

impl TestRunner {
    fn new(server_url: &str, vendor: &str, verbose: bool) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("Failed to create HTTP client"),
            server_url: server_url.trim_end_matches('/').to_string(),
            vendor: vendor.to_string(),
            verbose,
        }
    }

    /// Test 1: health check
    async fn test_health(&self) -> TestResult {
        let start = Instant::now();
        let url = format!("{}/healthz", self.server_url);

        match self.client.get(&url).send().await {
            Ok(resp) => {
                let status = resp.status();
                let duration = start.elapsed().as_millis() as u64;
                match resp.json::<HealthResponse>().await {
                    Ok(health) => {
                        if health.status == "ok" && health.db_connected {
                            TestResult::success(
                                "Health",
                                duration,
                                &format!("v{}, db connected", health.version),
                            )
                        } else {
                            TestResult::failure(
                                "Health",
                                duration,
                                &format!("status={}, db_connected={}", health.status, health.db_connected),
                            )
                        }
                    }
                    Err(e) => TestResult::failure(
                        "Health",
                        duration,
                        &format!("HTTP {} / parse error: {}", status.as_u16(), e),
                    ),
                }
            }
            Err(e) => TestResult::failure(
                "Health",
                start.elapsed().as_millis() as u64,
                &format!("Request error: {}", e),
            ),
        }
    }

    /// Test 2: vendor endpoint list
    async fn test_vendors(&self) -> TestResult {
        let url = format!("{}/api/vendors", self.server_url);

        match self.fetch_json(&url).await {
            Ok((duration, body)) => {
                let count = body["data"].as_array().map(|a| a.len()).unwrap_or(0);
                let enabled = body["data"]
                    .as_array()
                    .map(|a| {
                        a.iter()
                            .filter(|e| e["enabled"].as_bool().unwrap_or(false))
                            .count()
                    })
                    .unwrap_or(0);
                TestResult::success(
                    "Vendor Endpoints",
                    duration,
                    &format!("{} configured, {} enabled", count, enabled),
                )
            }
            Err((duration, e)) => TestResult::failure("Vendor Endpoints", duration, &e),
        }
    }

    /// Test 3: mapping rule sets (stored list + default synthesis)
    async fn test_mappings(&self) -> TestResult {
        let start = Instant::now();
        let list_url = format!("{}/api/mappings", self.server_url);

        let stored = match self.fetch_json(&list_url).await {
            Ok((_, body)) => body["data"].as_array().map(|a| a.len()).unwrap_or(0),
            Err((duration, e)) => return TestResult::failure("Mapping Rules", duration, &e),
        };

        // 未設定ベンダーでもデフォルトルールが返ること
        let default_url = format!("{}/api/vendors/{}/mapping", self.server_url, self.vendor);
        match self.fetch_json(&default_url).await {
            Ok((_, body)) => {
                let duration = start.elapsed().as_millis() as u64;
                if body["data"]["vendor_type"].as_str() == Some(self.vendor.as_str()) {
                    TestResult::success(
                        "Mapping Rules",
                        duration,
                        &format!("{} stored, '{}' resolves", stored, self.vendor),
                    )
                } else {
                    TestResult::failure(
                        "Mapping Rules",
                        duration,
                        &format!("No rule set resolved for '{}'", self.vendor),
                    )
                }
            }
            Err((duration, e)) => TestResult::failure("Mapping Rules", duration, &e),
        }
    }

    /// Test 4: sync status
    async fn test_sync_status(&self) -> TestResult {
        let url = format!("{}/api/sync/status", self.server_url);

        match self.fetch_json(&url).await {
            Ok((duration, body)) => {
                let vendors = body["data"]["vendors"]
                    .as_object()
                    .map(|m| m.len())
                    .unwrap_or(0);
                let running = body["data"]["periodic"]["is_running"]
                    .as_bool()
                    .unwrap_or(false);
                TestResult::success(
                    "Sync Status",
                    duration,
                    &format!("{} vendor states, periodic running={}", vendors, running),
                )
                .with_details(&body["data"]["periodic"].to_string())
            }
            Err((duration, e)) => TestResult::failure("Sync Status", duration, &e),
        }
    }

    /// Test 5: full sync trigger (all enabled vendors)
    async fn test_full_sync(&self) -> TestResult {
        let start = Instant::now();
        let url = format!("{}/api/sync", self.server_url);

        match self.client.post(&url).send().await {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                let duration = start.elapsed().as_millis() as u64;

                if status.is_success() {
                    let json: serde_json::Value =
                        serde_json::from_str(&body).unwrap_or_default();
                    let synced = json["data"]["synced_count"].as_u64().unwrap_or(0);
                    let failed = json["data"]["failed_count"].as_u64().unwrap_or(0);
                    let result = TestResult::success(
                        "Full Sync",
                        duration,
                        &format!("{} synced, {} failed", synced, failed),
                    );
                    if self.verbose {
                        result.with_details(&body)
                    } else {
                        result
                    }
                } else {
                    TestResult::failure("Full Sync", duration, &format!("HTTP {}", status.as_u16()))
                        .with_details(&body)
                }
            }
            Err(e) => TestResult::failure(
                "Full Sync",
                start.elapsed().as_millis() as u64,
                &format!("Request error: {}", e),
            ),
        }
    }

    /// Test 6: per-vendor sync trigger
    async fn test_vendor_sync(&self) -> TestResult {
        let start = Instant::now();
        let url = format!("{}/api/vendors/{}/sync", self.server_url, self.vendor);

        match self.client.post(&url).send().await {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                let duration = start.elapsed().as_millis() as u64;

                if status.is_success() {
                    let json: serde_json::Value =
                        serde_json::from_str(&body).unwrap_or_default();
                    let records = json["data"]["record_count"].as_u64().unwrap_or(0);
                    let cameras = json["data"]["camera_count"].as_u64().unwrap_or(0);
                    let excluded = json["data"]["excluded_count"].as_u64().unwrap_or(0);
                    TestResult::success(
                        "Vendor Sync",
                        duration,
                        &format!(
                            "'{}': {} records -> {} cameras ({} excluded)",
                            self.vendor, records, cameras, excluded
                        ),
                    )
                } else {
                    TestResult::failure(
                        "Vendor Sync",
                        duration,
                        &format!("HTTP {}", status.as_u16()),
                    )
                    .with_details(&body)
                }
            }
            Err(e) => TestResult::failure(
                "Vendor Sync",
                start.elapsed().as_millis() as u64,
                &format!("Request error: {}", e),
            ),
        }
    }

    /// Test 7: raw snapshot refresh (fetch only, no transformation)
    async fn test_raw_sync(&self) -> TestResult {
        let start = Instant::now();
        let url = format!("{}/api/vendors/{}/raw/sync", self.server_url, self.vendor);

        match self.client.post(&url).send().await {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                let duration = start.elapsed().as_millis() as u64;

                if status.is_success() {
                    let json: serde_json::Value =
                        serde_json::from_str(&body).unwrap_or_default();
                    let records = json["data"]["record_count"].as_u64().unwrap_or(0);
                    TestResult::success(
                        "Raw Sync",
                        duration,
                        &format!("'{}': {} records fetched", self.vendor, records),
                    )
                } else {
                    TestResult::failure("Raw Sync", duration, &format!("HTTP {}", status.as_u16()))
                        .with_details(&body)
                }
            }
            Err(e) => TestResult::failure(
                "Raw Sync",
                start.elapsed().as_millis() as u64,
                &format!("Request error: {}", e),
            ),
        }
    }

    /// Test 8: re-transform from stored snapshot (no vendor fetch)
    async fn test_transform(&self) -> TestResult {
        let start = Instant::now();
        let url = format!("{}/api/vendors/{}/transform", self.server_url, self.vendor);

        match self.client.post(&url).send().await {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                let duration = start.elapsed().as_millis() as u64;

                if status.is_success() {
                    let json: serde_json::Value =
                        serde_json::from_str(&body).unwrap_or_default();
                    let cameras = json["data"]["camera_count"].as_u64().unwrap_or(0);
                    TestResult::success(
                        "Transform",
                        duration,
                        &format!("'{}': {} cameras from stored snapshot", self.vendor, cameras),
                    )
                } else {
                    TestResult::failure("Transform", duration, &format!("HTTP {}", status.as_u16()))
                        .with_details(&body)
                }
            }
            Err(e) => TestResult::failure(
                "Transform",
                start.elapsed().as_millis() as u64,
                &format!("Request error: {}", e),
            ),
        }
    }

    /// Test 9: raw snapshot readback
    async fn test_raw(&self) -> TestResult {
        let url = format!("{}/api/vendors/{}/raw", self.server_url, self.vendor);

        match self.fetch_json(&url).await {
            Ok((duration, body)) => {
                let records = body["data"]["record_count"].as_i64().unwrap_or(0);
                let fetched = body["data"]["fetched_at"].as_str().unwrap_or("-");
                TestResult::success(
                    "Raw Snapshot",
                    duration,
                    &format!("'{}': {} records, fetched {}", self.vendor, records, fetched),
                )
            }
            Err((duration, e)) => TestResult::failure("Raw Snapshot", duration, &e),
        }
    }

    /// Test 10: unified camera list (all + vendor filter)
    async fn test_cameras(&self) -> TestResult {
        let start = Instant::now();
        let all_url = format!("{}/api/cameras", self.server_url);

        let total = match self.fetch_json(&all_url).await {
            Ok((_, body)) => body["data"].as_array().map(|a| a.len()).unwrap_or(0),
            Err((duration, e)) => return TestResult::failure("Unified Cameras", duration, &e),
        };

        let filtered_url = format!(
            "{}/api/cameras?vendor_type={}",
            self.server_url, self.vendor
        );
        match self.fetch_json(&filtered_url).await {
            Ok((_, body)) => {
                let duration = start.elapsed().as_millis() as u64;
                let vendor_count = body["data"].as_array().map(|a| a.len()).unwrap_or(0);
                TestResult::success(
                    "Unified Cameras",
                    duration,
                    &format!("{} total, {} for '{}'", total, vendor_count, self.vendor),
                )
            }
            Err((duration, e)) => TestResult::failure("Unified Cameras", duration, &e),
        }
    }

    /// GETしてJSONを返す（非成功ステータスはエラー文字列）
    async fn fetch_json(&self, url: &str) -> Result<(u64, serde_json::Value), (u64, String)> {
        let start = Instant::now();
        match self.client.get(url).send().await {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                let duration = start.elapsed().as_millis() as u64;

                if status.is_success() {
                    match serde_json::from_str(&body) {
                        Ok(json) => Ok((duration, json)),
                        Err(e) => Err((duration, format!("Parse error: {}", e))),
                    }
                } else {
                    Err((duration, format!("HTTP {}: {}", status.as_u16(), body)))
                }
            }
            Err(e) => Err((
                start.elapsed().as_millis() as u64,
                format!("Request error: {}", e),
            )),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    println!("{}", "═".repeat(60).blue());
    println!("{}", "  Unicam Server Sync E2E Test Tool".bold());
    println!("{}", "═".repeat(60).blue());
    println!();
    println!("Server: {}", args.server.cyan());
    println!("Vendor: {}", args.vendor.cyan());
    println!();

    let runner = TestRunner::new(&args.server, &args.vendor, args.verbose);

    let mut results: Vec<TestResult> = Vec::new();

    let tests_to_run: Vec<&str> = if args.all {
        vec![
            "health",
            "vendors",
            "mappings",
            "sync_status",
            "full_sync",
            "vendor_sync",
            "raw_sync",
            "transform",
            "raw",
            "cameras",
        ]
    } else if let Some(ref test) = args.test {
        vec![test.as_str()]
    } else {
        vec!["health", "vendors", "mappings", "sync_status"]
    };

    println!("{}", "Running tests...".yellow());
    println!("{}", "─".repeat(60));

    for test in &tests_to_run {
        let result = match *test {
            "health" => runner.test_health().await,
            "vendors" => runner.test_vendors().await,
            "mappings" => runner.test_mappings().await,
            "sync_status" => runner.test_sync_status().await,
            "full_sync" => runner.test_full_sync().await,
            "vendor_sync" => runner.test_vendor_sync().await,
            "raw_sync" => runner.test_raw_sync().await,
            "transform" => runner.test_transform().await,
            "raw" => runner.test_raw().await,
            "cameras" => runner.test_cameras().await,
            _ => TestResult::failure(test, 0, "Unknown test"),
        };
        result.print();
        results.push(result);
    }

    println!("{}", "─".repeat(60));

    // サマリー
    let passed = results.iter().filter(|r| r.success).count();
    let failed = results.iter().filter(|r| !r.success).count();
    let total = results.len();

    println!();
    if failed == 0 {
        println!("{} All {} tests passed!", "✅".green(), total);
    } else {
        println!("{} {} passed, {} failed", "⚠️".yellow(), passed, failed);
    }

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
