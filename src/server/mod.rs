//! HTTP surface for the reader and the warm trigger

pub mod error;

use crate::core::RateLookup;
use crate::reader::{RateReader, RateRequest};
use crate::warmer::CacheWarmer;
use anyhow::{Context, Result};
use axum::{Json, Router, extract::State, extract::rejection::JsonRejection, routing::post};
use error::{ApiError, ApiResult};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct AppState {
    pub reader: RateReader,
    pub warmer: CacheWarmer,
    pub request_timeout: Duration,
}

#[derive(Debug, Serialize)]
pub struct WarmResponse {
    pub success: bool,
    pub warmed: usize,
    pub failed: usize,
}

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/get_best_rate", post(get_best_rate))
        .route("/refresh_rates_cache", post(refresh_rates_cache))
        .with_state(state)
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(state: Arc<AppState>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app_router(state))
        .await
        .context("Server error")
}

async fn with_timeout<T, F>(limit: Duration, fut: F) -> ApiResult<T>
where
    F: Future<Output = Result<T, crate::core::RateError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(ApiError::Timeout(limit.as_secs())),
    }
}

async fn get_best_rate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RateRequest>, JsonRejection>,
) -> ApiResult<Json<RateLookup>> {
    let Json(request) = payload?;
    let lookup = with_timeout(state.request_timeout, state.reader.get_rate(&request)).await?;
    Ok(Json(lookup))
}

/// Runs a full warm cycle. `request_timeout` does not apply here; each pair
/// fetch is bounded by the upstream client timeout instead.
async fn refresh_rates_cache(State(state): State<Arc<AppState>>) -> ApiResult<Json<WarmResponse>> {
    let report = state.warmer.warm_all().await?;
    Ok(Json(WarmResponse {
        success: true,
        warmed: report.warmed,
        failed: report.failed.len(),
    }))
}
