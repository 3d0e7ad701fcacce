use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProfileRow {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub city: String,
    pub state: String,
    pub profile_photo_url: Option<String>,
    pub banner_image_url: Option<String>,
    /// JSON array of `{ platform, url }` objects, stored verbatim.
    pub social_links: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ModRow {
    pub id: i64,
    pub user_id: String,
    pub category: String,
    pub mod_name: String,
    pub brand: String,
    pub install_date: String,
    pub notes: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub user_id: String,
    pub media_url: String,
    pub media_type: String,
    pub caption: String,
    pub created_at: String,
}
