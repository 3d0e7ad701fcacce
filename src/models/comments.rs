use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub meet_id: i64,
    pub user_id: String,
    pub username: String,
    pub body: String,
    pub created_at: String,
}
