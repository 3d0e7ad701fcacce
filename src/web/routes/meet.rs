use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::warn;

use crate::database::comments_repo;
use crate::models::{CommentRow, RsvpCounts};
use crate::services::{profile_service, rsvp_service};
use crate::web::middleware::auth::AuthenticatedUser;

type ApiError = (StatusCode, Json<Value>);

fn db_error(context: &str, e: sqlx::Error) -> ApiError {
    warn!("{} failed: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "database_error" })),
    )
}

pub async fn meet_rsvps(
    State(pool): State<SqlitePool>,
    Path(meet_id): Path<i64>,
) -> Result<Json<rsvp_service::MeetRsvps>, ApiError> {
    rsvp_service::load_meet_rsvps(&pool, meet_id)
        .await
        .map(Json)
        .map_err(|e| db_error("meet_rsvps", e))
}

#[derive(Deserialize)]
pub struct RsvpBody {
    pub status: String,
}

pub async fn set_rsvp(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(meet_id): Path<i64>,
    Json(body): Json<RsvpBody>,
) -> Result<Json<RsvpCounts>, ApiError> {
    if !rsvp_service::is_valid_status(&body.status) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_status" })),
        ));
    }

    rsvp_service::set_rsvp(&pool, &auth_user.id, meet_id, &body.status)
        .await
        .map(Json)
        .map_err(|e| db_error("set_rsvp", e))
}

pub async fn clear_rsvp(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(meet_id): Path<i64>,
) -> Result<Json<RsvpCounts>, ApiError> {
    rsvp_service::clear_rsvp(&pool, &auth_user.id, meet_id)
        .await
        .map(Json)
        .map_err(|e| db_error("clear_rsvp", e))
}

pub async fn meet_comments(
    State(pool): State<SqlitePool>,
    Path(meet_id): Path<i64>,
) -> Result<Json<Vec<CommentRow>>, ApiError> {
    comments_repo::list_for_meet(&pool, meet_id)
        .await
        .map(Json)
        .map_err(|e| db_error("meet_comments", e))
}

#[derive(Deserialize)]
pub struct CommentBody {
    pub body: String,
}

pub async fn post_comment(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(meet_id): Path<i64>,
    Json(body): Json<CommentBody>,
) -> Result<(StatusCode, Json<CommentRow>), ApiError> {
    let text = body.body.trim();
    if text.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "body_required" })),
        ));
    }

    let username = profile_service::display_handle(&pool, &auth_user.id)
        .await
        .map_err(|e| db_error("post_comment", e))?;

    let comment = comments_repo::insert_comment(&pool, meet_id, &auth_user.id, &username, text)
        .await
        .map_err(|e| db_error("post_comment", e))?;

    match comment {
        Some(c) => Ok((StatusCode::CREATED, Json(c))),
        None => Err(db_error("post_comment", sqlx::Error::RowNotFound)),
    }
}

pub async fn delete_comment(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(comment_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let deleted = comments_repo::delete_own_comment(&pool, comment_id, &auth_user.id)
        .await
        .map_err(|e| db_error("delete_comment", e))?;

    if deleted == 0 {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found" })),
        ));
    }
    Ok(Json(json!({ "deleted": true })))
}
