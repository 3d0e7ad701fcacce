use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::warn;

use crate::database::favorites_repo;
use crate::models::MeetRow;
use crate::web::middleware::auth::AuthenticatedUser;

type ApiError = (StatusCode, Json<Value>);

fn db_error(context: &str, e: sqlx::Error) -> ApiError {
    warn!("{} failed: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "database_error" })),
    )
}

/// Flips the bookmark for this user+meet pair and reports the new state.
pub async fn toggle_favorite(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(meet_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let already = favorites_repo::is_favorited(&pool, &auth_user.id, meet_id)
        .await
        .map_err(|e| db_error("toggle_favorite", e))?;

    if already {
        favorites_repo::delete_favorite(&pool, &auth_user.id, meet_id)
            .await
            .map_err(|e| db_error("toggle_favorite", e))?;
    } else {
        favorites_repo::insert_favorite(&pool, &auth_user.id, meet_id)
            .await
            .map_err(|e| db_error("toggle_favorite", e))?;
    }

    Ok(Json(json!({ "favorited": !already })))
}

pub async fn favorite_ids(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<i64>>, ApiError> {
    favorites_repo::list_meet_ids(&pool, &auth_user.id)
        .await
        .map(Json)
        .map_err(|e| db_error("favorite_ids", e))
}

pub async fn favorite_meets(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<MeetRow>>, ApiError> {
    favorites_repo::list_favorited_meets(&pool, &auth_user.id)
        .await
        .map(Json)
        .map_err(|e| db_error("favorite_meets", e))
}
