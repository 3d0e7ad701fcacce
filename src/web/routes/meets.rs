use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::warn;

use crate::database::meets_repo;
use crate::models::MeetRow;
use crate::services::meets_service::{self, MeetSearchQuery, MeetSubmission, UpdateOutcome};
use crate::web::middleware::auth::{optional_user, AuthenticatedUser};

type ApiError = (StatusCode, Json<Value>);

fn db_error(context: &str, e: sqlx::Error) -> ApiError {
    warn!("{} failed: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "database_error" })),
    )
}

/// The raw approved snapshot the frontend filters against.
pub async fn meets_index(State(pool): State<SqlitePool>) -> Result<Json<Vec<MeetRow>>, ApiError> {
    meets_repo::list_approved(&pool)
        .await
        .map(Json)
        .map_err(|e| db_error("meets_index", e))
}

/// Server-side pipeline: geocode -> filter -> paginate.
pub async fn meets_search(
    State(pool): State<SqlitePool>,
    Query(query): Query<MeetSearchQuery>,
) -> Result<Json<meets_service::MeetSearchPage>, ApiError> {
    meets_service::search_meets(&pool, &query)
        .await
        .map(Json)
        .map_err(|e| db_error("meets_search", e))
}

pub async fn meet_detail(
    State(pool): State<SqlitePool>,
    Path(meet_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<MeetRow>, ApiError> {
    let meet = meets_repo::load_meet(&pool, meet_id)
        .await
        .map_err(|e| db_error("meet_detail", e))?;

    let viewer = optional_user(&headers);
    match meet {
        Some(m) if meets_service::visible_to(&m, viewer.as_ref().map(|u| u.id.as_str())) => {
            Ok(Json(m))
        }
        _ => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found" })),
        )),
    }
}

pub async fn submit_meet(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(body): Json<MeetSubmission>,
) -> Result<(StatusCode, Json<MeetRow>), ApiError> {
    if let Err(reason) = meets_service::validate_submission(&body) {
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "error": reason }))));
    }

    let meet = meets_service::submit_meet(&pool, &auth_user.id, &body)
        .await
        .map_err(|e| db_error("submit_meet", e))?;

    match meet {
        Some(m) => Ok((StatusCode::CREATED, Json(m))),
        None => Err(db_error("submit_meet", sqlx::Error::RowNotFound)),
    }
}

pub async fn my_meets(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<MeetRow>>, ApiError> {
    meets_repo::list_by_creator(&pool, &auth_user.id)
        .await
        .map(Json)
        .map_err(|e| db_error("my_meets", e))
}

pub async fn update_meet(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(meet_id): Path<i64>,
    Json(body): Json<MeetSubmission>,
) -> Result<Json<MeetRow>, ApiError> {
    if let Err(reason) = meets_service::validate_submission(&body) {
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "error": reason }))));
    }

    match meets_service::update_submission(&pool, &auth_user.id, meet_id, &body)
        .await
        .map_err(|e| db_error("update_meet", e))?
    {
        UpdateOutcome::Updated(m) => Ok(Json(m)),
        UpdateOutcome::NotFound => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found" })),
        )),
        UpdateOutcome::NotEditable => Err((
            StatusCode::CONFLICT,
            Json(json!({ "error": "not_editable" })),
        )),
    }
}

pub async fn delete_meet(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(meet_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let deleted = meets_repo::delete_own_meet(&pool, meet_id, &auth_user.id)
        .await
        .map_err(|e| db_error("delete_meet", e))?;

    if deleted == 0 {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found" })),
        ));
    }
    Ok(Json(json!({ "deleted": true })))
}
