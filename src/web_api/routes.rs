//! API Routes

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::Error;
use crate::mapping::SaveMappingRequest;
use crate::models::ApiResponse;
use crate::state::AppState;
use crate::vendor::{SaveVendorEndpointRequest, VendorKind};

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health & Status
        .route("/healthz", get(super::health_check))
        .route("/api/status", get(super::service_status))
        // Vendor endpoints
        .route("/api/vendors", get(list_vendors))
        .route("/api/vendors/:vendor_type/endpoint", get(get_endpoint))
        .route("/api/vendors/:vendor_type/endpoint", put(save_endpoint))
        .route("/api/vendors/:vendor_type/endpoint", delete(delete_endpoint))
        // Mapping rule sets
        .route("/api/mappings", get(list_mappings))
        .route("/api/vendors/:vendor_type/mapping", get(get_mapping))
        .route("/api/vendors/:vendor_type/mapping", put(save_mapping))
        .route("/api/vendors/:vendor_type/mapping", delete(delete_mapping))
        // Synchronization
        .route("/api/sync", post(trigger_full_sync))
        .route("/api/sync/status", get(sync_status))
        .route("/api/vendors/:vendor_type/sync", post(sync_vendor))
        .route("/api/vendors/:vendor_type/transform", post(transform_vendor))
        // Raw snapshots
        .route("/api/vendors/:vendor_type/raw", get(get_raw_snapshot))
        .route("/api/vendors/:vendor_type/raw/sync", post(sync_vendor_raw))
        // Unified cameras
        .route("/api/cameras", get(list_cameras))
        .route("/api/cameras/:vendor_type/:channel_id", delete(delete_camera))
        .with_state(state)
}

fn parse_vendor(vendor_type: &str) -> Result<VendorKind, Error> {
    VendorKind::parse(vendor_type)
        .ok_or_else(|| Error::Validation(format!("Unknown vendor type: '{}'", vendor_type)))
}

// ========================================
// Vendor Endpoint Handlers
// ========================================

async fn list_vendors(State(state): State<AppState>) -> impl IntoResponse {
    match state.vendor_endpoints.list().await {
        Ok(endpoints) => Json(ApiResponse::success(endpoints)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn get_endpoint(
    State(state): State<AppState>,
    Path(vendor_type): Path<String>,
) -> impl IntoResponse {
    match state.vendor_endpoints.get(&vendor_type).await {
        Ok(endpoint) => Json(ApiResponse::success(endpoint)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn save_endpoint(
    State(state): State<AppState>,
    Path(vendor_type): Path<String>,
    Json(req): Json<SaveVendorEndpointRequest>,
) -> impl IntoResponse {
    match state.vendor_endpoints.save(&vendor_type, req).await {
        Ok(endpoint) => Json(ApiResponse::success(endpoint)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn delete_endpoint(
    State(state): State<AppState>,
    Path(vendor_type): Path<String>,
) -> impl IntoResponse {
    match state.vendor_endpoints.delete(&vendor_type).await {
        Ok(()) => Json(json!({"ok": true})).into_response(),
        Err(e) => e.into_response(),
    }
}

// ========================================
// Mapping Rule Handlers
// ========================================

async fn list_mappings(State(state): State<AppState>) -> impl IntoResponse {
    match state.mappings.list().await {
        Ok(rule_sets) => Json(ApiResponse::success(rule_sets)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn get_mapping(
    State(state): State<AppState>,
    Path(vendor_type): Path<String>,
) -> impl IntoResponse {
    let kind = match parse_vendor(&vendor_type) {
        Ok(kind) => kind,
        Err(e) => return e.into_response(),
    };

    match state.mappings.get_or_default(kind.as_str()).await {
        Ok(rules) => Json(ApiResponse::success(rules)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn save_mapping(
    State(state): State<AppState>,
    Path(vendor_type): Path<String>,
    Json(req): Json<SaveMappingRequest>,
) -> impl IntoResponse {
    let kind = match parse_vendor(&vendor_type) {
        Ok(kind) => kind,
        Err(e) => return e.into_response(),
    };

    match state.mappings.save(kind.as_str(), &req).await {
        Ok(rules) => Json(ApiResponse::success(rules)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn delete_mapping(
    State(state): State<AppState>,
    Path(vendor_type): Path<String>,
) -> impl IntoResponse {
    let kind = match parse_vendor(&vendor_type) {
        Ok(kind) => kind,
        Err(e) => return e.into_response(),
    };

    match state.mappings.delete(kind.as_str()).await {
        Ok(()) => Json(json!({"ok": true})).into_response(),
        Err(e) => e.into_response(),
    }
}

// ========================================
// Synchronization Handlers
// ========================================

async fn trigger_full_sync(State(state): State<AppState>) -> impl IntoResponse {
    match state.orchestrator.trigger_full_sync().await {
        Ok(result) => Json(ApiResponse::success(result)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn sync_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.orchestrator.get_sync_status().await;
    Json(ApiResponse::success(status))
}

async fn sync_vendor(
    State(state): State<AppState>,
    Path(vendor_type): Path<String>,
) -> impl IntoResponse {
    match state.orchestrator.sync_vendor_full(&vendor_type).await {
        Ok(report) => Json(ApiResponse::success(report)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn transform_vendor(
    State(state): State<AppState>,
    Path(vendor_type): Path<String>,
) -> impl IntoResponse {
    match state.orchestrator.transform_vendor(&vendor_type).await {
        Ok(report) => Json(ApiResponse::success(report)).into_response(),
        Err(e) => e.into_response(),
    }
}

// ========================================
// Raw Snapshot Handlers
// ========================================

async fn get_raw_snapshot(
    State(state): State<AppState>,
    Path(vendor_type): Path<String>,
) -> impl IntoResponse {
    let kind = match parse_vendor(&vendor_type) {
        Ok(kind) => kind,
        Err(e) => return e.into_response(),
    };

    match state.raw_snapshots.find_by_vendor(kind.as_str()).await {
        Ok(Some(snapshot)) => Json(ApiResponse::success(snapshot)).into_response(),
        Ok(None) => Error::NotFound(format!(
            "No raw snapshot stored for vendor '{}'",
            kind
        ))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn sync_vendor_raw(
    State(state): State<AppState>,
    Path(vendor_type): Path<String>,
) -> impl IntoResponse {
    let kind = match parse_vendor(&vendor_type) {
        Ok(kind) => kind,
        Err(e) => return e.into_response(),
    };

    match state.orchestrator.synchronize_vendor(kind.as_str()).await {
        Ok(record_count) => Json(ApiResponse::success(json!({
            "vendor_type": kind.as_str(),
            "record_count": record_count,
        })))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

// ========================================
// Unified Camera Handlers
// ========================================

#[derive(Debug, Deserialize)]
struct CameraQuery {
    vendor_type: Option<String>,
}

async fn list_cameras(
    State(state): State<AppState>,
    Query(query): Query<CameraQuery>,
) -> impl IntoResponse {
    let result = match query.vendor_type.as_deref() {
        Some(vendor_type) => {
            let kind = match parse_vendor(vendor_type) {
                Ok(kind) => kind,
                Err(e) => return e.into_response(),
            };
            state.unified_cameras.find_by_vendor(kind.as_str()).await
        }
        None => state.unified_cameras.find_all().await,
    };

    match result {
        Ok(cameras) => Json(ApiResponse::success(cameras)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn delete_camera(
    State(state): State<AppState>,
    Path((vendor_type, channel_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let kind = match parse_vendor(&vendor_type) {
        Ok(kind) => kind,
        Err(e) => return e.into_response(),
    };

    match state.unified_cameras.delete(kind.as_str(), &channel_id).await {
        Ok(true) => Json(json!({"ok": true})).into_response(),
        Ok(false) => Error::NotFound(format!(
            "No camera '{}' for vendor '{}'",
            channel_id, kind
        ))
        .into_response(),
        Err(e) => e.into_response(),
    }
}
