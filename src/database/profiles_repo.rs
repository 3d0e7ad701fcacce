use sqlx::SqlitePool;

use crate::models::ProfileRow;

const PROFILE_COLUMNS: &str = r#"
  user_id, username, display_name, bio, city, state,
  profile_photo_url, banner_image_url, social_links, created_at
"#;

pub async fn load_by_username(
    pool: &SqlitePool,
    username: &str,
) -> sqlx::Result<Option<ProfileRow>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE username = ? COLLATE NOCASE");
    sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn load_by_user_id(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Option<ProfileRow>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?");
    sqlx::query_as::<_, ProfileRow>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// True when another user already holds the username (case-insensitive).
pub async fn username_taken(
    pool: &SqlitePool,
    username: &str,
    excluding_user_id: &str,
) -> sqlx::Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT 1 FROM profiles WHERE username = ? COLLATE NOCASE AND user_id != ?",
    )
    .bind(username)
    .bind(excluding_user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

pub struct UpsertProfile<'a> {
    pub user_id: &'a str,
    pub username: &'a str,
    pub display_name: &'a str,
    pub bio: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub profile_photo_url: Option<&'a str>,
    pub banner_image_url: Option<&'a str>,
    pub social_links: &'a str,
}

const SQL_UPSERT_PROFILE: &str = r#"
INSERT INTO profiles (
  user_id, username, display_name, bio, city, state,
  profile_photo_url, banner_image_url, social_links
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
ON CONFLICT (user_id) DO UPDATE SET
  username = excluded.username,
  display_name = excluded.display_name,
  bio = excluded.bio,
  city = excluded.city,
  state = excluded.state,
  profile_photo_url = COALESCE(excluded.profile_photo_url, profiles.profile_photo_url),
  banner_image_url = COALESCE(excluded.banner_image_url, profiles.banner_image_url),
  social_links = excluded.social_links
"#;

pub async fn upsert_profile(pool: &SqlitePool, profile: UpsertProfile<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT_PROFILE)
        .bind(profile.user_id)
        .bind(profile.username)
        .bind(profile.display_name)
        .bind(profile.bio)
        .bind(profile.city)
        .bind(profile.state)
        .bind(profile.profile_photo_url)
        .bind(profile.banner_image_url)
        .bind(profile.social_links)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
