use crate::app::dto::{
    CountryResponse, HealthResponse, MessageResponse, RefreshResponse, StatusResponse,
};
use crate::app::error::ApiError;
use crate::app::query::CountryQuery;
use crate::app::state::AppState;
use crate::domain::model::RefreshOutcome;
use crate::utils::error::SyncError;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// `POST /countries/refresh`
pub async fn refresh_handler(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, ApiError> {
    // 週期在獨立任務中執行，客戶端斷線也會跑完
    let outcome = state
        .pipeline
        .spawn()
        .await
        .map_err(|e| ApiError::internal(format!("refresh task failed: {}", e)))?;

    match outcome {
        RefreshOutcome::Completed(report) => Ok(Json(RefreshResponse::from(&report))),
        RefreshOutcome::Aborted(reason) => Err(ApiError::unavailable(
            "External data source unavailable",
            reason.to_string(),
        )),
    }
}

/// `GET /countries?region=&currency=&sort=gdp_desc|gdp_asc`
pub async fn list_countries_handler(
    State(state): State<AppState>,
    Query(query): Query<CountryQuery>,
) -> Result<Json<Vec<CountryResponse>>, ApiError> {
    let rows = state.store.list_all().await?;
    let countries = query
        .apply(rows)
        .into_iter()
        .map(CountryResponse::from)
        .collect();
    Ok(Json(countries))
}

pub async fn get_country_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CountryResponse>, ApiError> {
    let row = state
        .store
        .find_by_name(&name)
        .await?
        .ok_or_else(|| SyncError::not_found(&name))?;
    Ok(Json(row.into()))
}

pub async fn delete_country_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.delete_by_name(&name).await?;
    Ok(Json(MessageResponse::new("Country successfully deleted")))
}

pub async fn status_handler(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    let total = state.store.count().await?;
    let last = state.store.last_refreshed_at().await?;
    Ok(Json(StatusResponse::new(total, last)))
}

/// `GET /countries/image`：回傳最近一次產生的摘要圖
pub async fn image_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    match tokio::fs::read(&state.summary_path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ApiError::not_found("Summary image not found"))
        }
        Err(e) => Err(SyncError::from(e).into()),
    }
}

pub async fn ping_handler() -> Json<MessageResponse> {
    Json(MessageResponse::new("pong"))
}

pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let (healthy, database) = match state.store.count().await {
        Ok(count) => (true, format!("ok ({} countries)", count)),
        Err(e) => (false, format!("error: {}", e)),
    };

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
