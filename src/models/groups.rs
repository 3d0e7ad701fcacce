use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GroupRow {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub group_type: String,
    pub privacy: String,
    pub location: String,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub member_count: i64,
}

/// Active member joined with the public profile bits the member list shows.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GroupMemberRow {
    pub group_id: i64,
    pub user_id: String,
    pub role: String,
    pub status: String,
    pub joined_at: String,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub profile_photo_url: Option<String>,
}
