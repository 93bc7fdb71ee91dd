//! HTTP - REST の入り口
//!
//! リクエストを service の 1 操作に変換して、結果を JSON で返すだけの層です。
//! ロジックは持ちません。
//!
//! | Method | Path                       | 結果                             |
//! |--------|----------------------------|----------------------------------|
//! | GET    | /api/items                 | 全件                             |
//! | POST   | /api/items                 | 作成したレコード                 |
//! | GET    | /api/items/search?name=... | name 完全一致（`code=` も可）    |
//! | GET    | /api/items/{id}            | 1 件 / 404                       |
//! | PUT    | /api/items/{id}            | 更新後のレコード / 404           |
//! | DELETE | /api/items/{id}            | 204                              |

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use roster_core::app::RecordService;
use roster_core::domain::{Lookup, Record, RecordId};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, Result};

#[derive(Clone)]
struct AppState {
    service: RecordService,
}

pub fn router(service: RecordService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/items", get(list_items).post(create_item))
        .route("/api/items/search", get(search_items))
        .route(
            "/api/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .with_state(AppState { service })
        .layer(TraceLayer::new_for_http())
}

#[derive(Serialize)]
struct HealthResponse<'a> {
    status: &'a str,
}

async fn health() -> Json<HealthResponse<'static>> {
    Json(HealthResponse { status: "ok" })
}

async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Record>>> {
    Ok(Json(state.service.get_all().await?))
}

async fn create_item(
    State(state): State<AppState>,
    Json(item): Json<Record>,
) -> Result<Json<Record>> {
    Ok(Json(state.service.create(item).await?))
}

#[derive(Debug, Deserialize, Default)]
struct SearchQuery {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

async fn search_items(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<Record>>> {
    let found = match (params.name, params.code) {
        (Some(name), _) => state.service.find_by_name(&name).await?,
        (None, Some(code)) => state.service.find_by_code(&code).await?,
        (None, None) => {
            return Err(ApiError::BadRequest(
                "search requires a `name` or `code` parameter".to_string(),
            ));
        }
    };
    Ok(Json(found))
}

async fn get_item(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Record>> {
    // 形式として不正な id は、どのレコードも指さない
    let Ok(record_id) = id.parse::<RecordId>() else {
        return Err(ApiError::NotFound(id));
    };
    match state.service.get_by_id(&record_id).await? {
        Lookup::Found(record) => Ok(Json(record)),
        Lookup::NotFound => Err(ApiError::NotFound(id)),
    }
}

/// The path id wins over any id in the body.
async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut item): Json<Record>,
) -> Result<Json<Record>> {
    let Ok(record_id) = id.parse::<RecordId>() else {
        return Err(ApiError::NotFound(id));
    };
    item.id = Some(record_id);
    match state.service.update(item).await? {
        Lookup::Found(record) => Ok(Json(record)),
        Lookup::NotFound => Err(ApiError::NotFound(id)),
    }
}

async fn delete_item(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    if let Ok(record_id) = id.parse::<RecordId>() {
        state.service.delete(&record_id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
