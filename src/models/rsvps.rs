use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RsvpRow {
    pub meet_id: i64,
    pub user_id: String,
    pub status: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RsvpCounts {
    pub going: i64,
    pub maybe: i64,
}
