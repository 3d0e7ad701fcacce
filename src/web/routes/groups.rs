use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::warn;

use crate::database::{group_members_repo, groups_repo};
use crate::models::{GroupMemberRow, GroupRow, MeetRow};
use crate::services::groups_service::{
    self, CreateGroupOutcome, GroupsQuery, JoinOutcome, LeaveOutcome, NewGroupRequest,
};
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

fn forbidden() -> ApiError {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "forbidden" })),
    )
}

async fn load_group(pool: &SqlitePool, slug: &str) -> Result<GroupRow, ApiError> {
    groups_repo::load_by_slug(pool, slug)
        .await
        .map_err(|e| db_error("load_group", e))?
        .ok_or_else(not_found)
}

pub async fn groups_index(
    State(pool): State<SqlitePool>,
    Query(query): Query<GroupsQuery>,
) -> Result<Json<Vec<GroupRow>>, ApiError> {
    groups_service::list_groups(&pool, &query)
        .await
        .map(Json)
        .map_err(|e| db_error("groups_index", e))
}

pub async fn create_group(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Json(body): Json<NewGroupRequest>,
) -> Result<(StatusCode, Json<GroupRow>), ApiError> {
    match groups_service::create_group(&pool, &auth_user.id, &body)
        .await
        .map_err(|e| db_error("create_group", e))?
    {
        CreateGroupOutcome::Created(group) => Ok((StatusCode::CREATED, Json(group))),
        CreateGroupOutcome::InvalidName => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "name_required" })),
        )),
    }
}

pub async fn group_detail(
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
) -> Result<Json<GroupRow>, ApiError> {
    load_group(&pool, &slug).await.map(Json)
}

pub async fn group_members(
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<GroupMemberRow>>, ApiError> {
    let group = load_group(&pool, &slug).await?;
    group_members_repo::list_active(&pool, group.id)
        .await
        .map(Json)
        .map_err(|e| db_error("group_members", e))
}

pub async fn group_meets(
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<MeetRow>>, ApiError> {
    let group = load_group(&pool, &slug).await?;
    groups_service::list_group_meets(&pool, group.id)
        .await
        .map(Json)
        .map_err(|e| db_error("group_meets", e))
}

/// The caller's own standing in the group, for the join/leave button state.
pub async fn my_membership(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let group = load_group(&pool, &slug).await?;
    let membership = group_members_repo::load_membership(&pool, group.id, &auth_user.id)
        .await
        .map_err(|e| db_error("my_membership", e))?;

    Ok(Json(match membership {
        Some(m) => json!({ "member": true, "role": m.role, "status": m.status }),
        None => json!({ "member": false }),
    }))
}

pub async fn join_group(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let group = load_group(&pool, &slug).await?;
    let outcome = groups_service::join_group(&pool, &group, &auth_user.id)
        .await
        .map_err(|e| db_error("join_group", e))?;

    Ok(Json(match outcome {
        JoinOutcome::Joined => json!({ "status": "active" }),
        JoinOutcome::Pending => json!({ "status": "pending" }),
        JoinOutcome::AlreadyMember => json!({ "status": "already_member" }),
    }))
}

pub async fn leave_group(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let group = load_group(&pool, &slug).await?;
    match groups_service::leave_group(&pool, group.id, &auth_user.id)
        .await
        .map_err(|e| db_error("leave_group", e))?
    {
        LeaveOutcome::Left => Ok(Json(json!({ "left": true }))),
        LeaveOutcome::OwnerCannotLeave => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "owner_cannot_leave" })),
        )),
        LeaveOutcome::NotAMember => Err(not_found()),
    }
}

async fn require_moderator(
    pool: &SqlitePool,
    group_id: i64,
    user_id: &str,
) -> Result<(), ApiError> {
    let membership = group_members_repo::load_membership(pool, group_id, user_id)
        .await
        .map_err(|e| db_error("require_moderator", e))?;
    if groups_service::can_moderate(membership.as_ref()) {
        Ok(())
    } else {
        Err(forbidden())
    }
}

pub async fn pending_requests(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<GroupMemberRow>>, ApiError> {
    let group = load_group(&pool, &slug).await?;
    require_moderator(&pool, group.id, &auth_user.id).await?;
    group_members_repo::list_pending(&pool, group.id)
        .await
        .map(Json)
        .map_err(|e| db_error("pending_requests", e))
}

#[derive(Deserialize)]
pub struct DecideRequestBody {
    pub user_id: String,
    pub approve: bool,
}

pub async fn decide_request(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
    Json(body): Json<DecideRequestBody>,
) -> Result<Json<Value>, ApiError> {
    let group = load_group(&pool, &slug).await?;
    require_moderator(&pool, group.id, &auth_user.id).await?;

    let changed = if body.approve {
        group_members_repo::set_status(&pool, group.id, &body.user_id, "active")
            .await
            .map_err(|e| db_error("decide_request", e))?
    } else {
        group_members_repo::delete_member(&pool, group.id, &body.user_id)
            .await
            .map_err(|e| db_error("decide_request", e))?
    };

    if changed == 0 {
        return Err(not_found());
    }
    Ok(Json(json!({ "approved": body.approve })))
}

#[derive(Deserialize)]
pub struct MemberRoleBody {
    pub role: String,
}

pub async fn set_member_role(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path((slug, member_id)): Path<(String, String)>,
    Json(body): Json<MemberRoleBody>,
) -> Result<Json<Value>, ApiError> {
    if body.role != "member" && body.role != "moderator" {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_role" })),
        ));
    }

    let group = load_group(&pool, &slug).await?;
    let membership = group_members_repo::load_membership(&pool, group.id, &auth_user.id)
        .await
        .map_err(|e| db_error("set_member_role", e))?;
    if !groups_service::is_owner(membership.as_ref()) {
        return Err(forbidden());
    }

    let changed = group_members_repo::set_role(&pool, group.id, &member_id, &body.role)
        .await
        .map_err(|e| db_error("set_member_role", e))?;
    if changed == 0 {
        return Err(not_found());
    }
    Ok(Json(json!({ "role": body.role })))
}

pub async fn remove_member(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path((slug, member_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let group = load_group(&pool, &slug).await?;
    require_moderator(&pool, group.id, &auth_user.id).await?;

    let deleted = group_members_repo::delete_member(&pool, group.id, &member_id)
        .await
        .map_err(|e| db_error("remove_member", e))?;
    if deleted == 0 {
        return Err(not_found());
    }
    Ok(Json(json!({ "removed": true })))
}

#[derive(Deserialize)]
pub struct GroupUpdateBody {
    pub name: String,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
}

pub async fn update_group(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Path(slug): Path<String>,
    Json(body): Json<GroupUpdateBody>,
) -> Result<Json<GroupRow>, ApiError> {
    let group = load_group(&pool, &slug).await?;
    require_moderator(&pool, group.id, &auth_user.id).await?;

    let name = body.name.trim();
    if name.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "name_required" })),
        ));
    }

    groups_repo::update_group(
        &pool,
        group.id,
        name,
        body.description.as_deref().unwrap_or("").trim(),
        body.avatar_url.as_deref(),
        body.banner_url.as_deref(),
    )
    .await
    .map_err(|e| db_error("update_group", e))?;

    load_group(&pool, &slug).await.map(Json)
}
