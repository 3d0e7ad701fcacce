use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::warn;

use crate::database::{mods_repo, posts_repo, profiles_repo};
use crate::models::{ModRow, PostRow, ProfileRow};
use crate::services::profile_service::{self, ProfileUpdate, SaveProfileOutcome};
use crate::web::middleware::auth::AuthenticatedUser;

type ApiError = (StatusCode, Json<Value>);

fn db_error(context: &str, e: sqlx::Error) -> ApiError {
    warn!("{} failed: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "database_error" })),
    )
}

fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not_found" })),
    )
}

/// Public profile page lookup by handle.
pub async fn profile_by_username(
    State(pool): State<SqlitePool>,
    Path(username): Path<String>,
) -> Result<Json<ProfileRow>, ApiError> {
    profiles_repo::load_by_username(&pool, &username)
        .await
        .map_err(|e| db_error("profile_by_username", e))?
        .map(Json)
        .ok_or_else(not_found)
}

/// The garage and feed are public once the profile exists.
pub async fn profile_mods(
    State(pool): State<SqlitePool>,
    Path(username): Path<String>,
) -> Result<Json<Vec<ModRow>>, ApiError> {
    let profile = profiles_repo::load_by_username(&pool, &username)
        .await
        .map_err(|e| db_error("profile_mods", e))?
        .ok_or_else(not_found)?;

    mods_repo::list_for_user(&pool, &profile.user_id)
        .await
        .map(Json)
        .map_err(|e| db_error("profile_mods", e))
}

pub async fn profile_posts(
    State(pool): State<SqlitePool>,
    Path(username): Path<String>,
) -> Result<Json<Vec<PostRow>>, ApiError> {
    let profile = profiles_repo::load_by_username(&pool, &username)
        .await
        .map_err(|e| db_error("profile_posts", e))?
        .ok_or_else(not_found)?;

    posts_repo::list_for_user(&pool, &profile.user_id)
        .await
        .map(Json)
        .map_err(|e| db_error("profile_posts", e))
}

pub async fn my_profile(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
) -> Result<Json<Value>, ApiError> {
    let profile = profiles_repo::load_by_user_id(&pool, &auth_user.id)
        .await
        .map_err(|e| db_error("my_profile", e))?;

    Ok(Json(match profile {
        Some(p) => json!({ "exists": true, "profile": p }),
        None => json!({ "exists": false }),
    }))
}

pub async fn save_profile(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<ProfileRow>, ApiError> {
    match profile_service::save_profile(&pool, &auth_user.id, &body)
        .await
        .map_err(|e| db_error("save_profile", e))?
    {
        SaveProfileOutcome::Saved(profile) => Ok(Json(profile)),
        SaveProfileOutcome::InvalidUsername => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_username" })),
        )),
        SaveProfileOutcome::UsernameTaken => Err((
            StatusCode::CONFLICT,
            Json(json!({ "error": "username_taken" })),
        )),
    }
}

#[derive(Deserialize)]
pub struct ModBody {
    pub category: String,
    pub mod_name: String,
    pub brand: Option<String>,
    pub install_date: Option<String>,
    pub notes: Option<String>,
}

pub async fn add_mod(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(body): Json<ModBody>,
) -> Result<(StatusCode, Json<ModRow>), ApiError> {
    if body.mod_name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "mod_name_required" })),
        ));
    }
    if !profile_service::is_known_category(body.category.trim()) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unknown_category" })),
        ));
    }

    let inserted = mods_repo::insert_mod(
        &pool,
        &auth_user.id,
        body.category.trim(),
        body.mod_name.trim(),
        body.brand.as_deref().unwrap_or("").trim(),
        body.install_date.as_deref().unwrap_or("").trim(),
        body.notes.as_deref().unwrap_or("").trim(),
    )
    .await
    .map_err(|e| db_error("add_mod", e))?;

    match inserted {
        Some(m) => Ok((StatusCode::CREATED, Json(m))),
        None => Err(db_error("add_mod", sqlx::Error::RowNotFound)),
    }
}

pub async fn delete_mod(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(mod_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let deleted = mods_repo::delete_own_mod(&pool, mod_id, &auth_user.id)
        .await
        .map_err(|e| db_error("delete_mod", e))?;
    if deleted == 0 {
        return Err(not_found());
    }
    Ok(Json(json!({ "deleted": true })))
}

#[derive(Deserialize)]
pub struct PostBody {
    pub media_url: String,
    pub media_type: Option<String>,
    pub caption: Option<String>,
}

pub async fn add_post(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(body): Json<PostBody>,
) -> Result<(StatusCode, Json<PostRow>), ApiError> {
    if body.media_url.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "media_url_required" })),
        ));
    }
    let media_type = body.media_type.as_deref().unwrap_or("photo").trim();
    if !profile_service::is_known_media_type(media_type) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unknown_media_type" })),
        ));
    }

    let inserted = posts_repo::insert_post(
        &pool,
        &auth_user.id,
        body.media_url.trim(),
        media_type,
        body.caption.as_deref().unwrap_or("").trim(),
    )
    .await
    .map_err(|e| db_error("add_post", e))?;

    match inserted {
        Some(p) => Ok((StatusCode::CREATED, Json(p))),
        None => Err(db_error("add_post", sqlx::Error::RowNotFound)),
    }
}

pub async fn delete_post(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(post_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let deleted = posts_repo::delete_own_post(&pool, post_id, &auth_user.id)
        .await
        .map_err(|e| db_error("delete_post", e))?;
    if deleted == 0 {
        return Err(not_found());
    }
    Ok(Json(json!({ "deleted": true })))
}
