use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::debug_handler;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use framework::web::error::HttpError;
use framework::web::error::HttpResult;
use serde_json::Value;
use serde_json::json;
use tracing::error;
use tracing::info;

use super::analyzer::Analyzer;
use super::cache::CacheStats;
use super::model::AnalyzeRequest;
use super::model::AnalyzeResponse;
use super::model::PullRequest;
use crate::ApiState;
use crate::web::rate_limit::rate_limit;

const NOT_CONFIGURED: &str = "GROQ_API_KEY not configured. Get your free API key from https://console.groq.com";

pub fn routes(state: &ApiState) -> Router<ApiState> {
    let limited = Router::new()
        .route("/api/v1/analyze", post(analyze))
        .route("/api/v1/analyze/quick", post(quick_analyze))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .merge(limited)
        .route("/api/v1/cache/stats", get(cache_stats))
        .route("/api/v1/cache", delete(clear_cache))
}

#[debug_handler]
async fn analyze(
    State(state): State<ApiState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> HttpResult<Json<AnalyzeResponse>> {
    let started = Instant::now();
    let pr = pull_request(payload)?;
    info!(
        "analyze request, title={}, files={}, commits={}",
        pr.title,
        pr.files.len(),
        pr.commits.len()
    );

    if let Some(context) = state.cache.get(&pr) {
        info!("return cached analysis, elapsed={:.2}s", started.elapsed().as_secs_f64());
        return Ok(Json(AnalyzeResponse::success(
            context,
            metadata(&state, &pr, started, true),
        )));
    }

    let analyzer = analyzer(&state)?;
    let context = analyzer.analyze(&pr).await.map_err(|err| {
        error!("analysis failed, error={err}");
        HttpError::Unprocessable(format!("Analysis failed: {err}"))
    })?;

    state.cache.set(&pr, context.clone());
    info!("analysis completed, elapsed={:.2}s", started.elapsed().as_secs_f64());

    Ok(Json(AnalyzeResponse::success(
        context,
        metadata(&state, &pr, started, false),
    )))
}

#[debug_handler]
async fn quick_analyze(
    State(state): State<ApiState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> HttpResult<Json<AnalyzeResponse>> {
    let started = Instant::now();
    let pr = pull_request(payload)?;
    let quick = pr.quick();

    let analyzer = analyzer(&state)?;
    let context = analyzer.analyze(&quick).await.map_err(|err| {
        error!("quick analysis failed, error={err}");
        HttpError::ServerError(format!("Quick analysis failed: {err}"))
    })?;

    Ok(Json(AnalyzeResponse::success(
        context,
        json!({
            "processing_time": processing_time(started),
            "mode": "quick",
            "files_analyzed": quick.files.len(),
            "total_files": pr.files.len(),
        }),
    )))
}

#[debug_handler]
async fn cache_stats(State(state): State<ApiState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

#[debug_handler]
async fn clear_cache(State(state): State<ApiState>) -> Json<Value> {
    let cleared = state.cache.clear();
    Json(json!({ "cleared": cleared }))
}

// wrong shape is 422, anything else the extractor rejects (syntax, missing content type) is 400
fn pull_request(payload: Result<Json<AnalyzeRequest>, JsonRejection>) -> HttpResult<PullRequest> {
    let Json(request) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY {
            HttpError::Unprocessable(rejection.body_text())
        } else {
            HttpError::BadRequest(rejection.body_text())
        }
    })?;
    PullRequest::try_from(request).map_err(HttpError::Unprocessable)
}

fn analyzer(state: &ApiState) -> HttpResult<&Analyzer> {
    state.analyzer.as_deref().ok_or_else(|| {
        error!("analyzer unavailable, groq api key is not configured");
        HttpError::ServiceUnavailable(NOT_CONFIGURED.to_string())
    })
}

fn metadata(state: &ApiState, pr: &PullRequest, started: Instant, cached: bool) -> Value {
    json!({
        "processing_time": processing_time(started),
        "files_analyzed": pr.files.len(),
        "commits_analyzed": pr.commits.len(),
        "model": state.settings.groq_model,
        "cached": cached,
    })
}

fn processing_time(started: Instant) -> String {
    format!("{:.2}s", started.elapsed().as_secs_f64())
}
