use serde::Deserialize;
use sqlx::SqlitePool;

use crate::database::profiles_repo;
use crate::models::ProfileRow;

pub const MOD_CATEGORIES: [&str; 9] = [
    "Engine / Performance",
    "Exhaust",
    "Suspension",
    "Wheels & Tires",
    "Exterior / Cosmetic",
    "Interior",
    "Audio",
    "Tune / ECU",
    "Wrap / Paint",
];

pub fn is_known_category(category: &str) -> bool {
    MOD_CATEGORIES.iter().any(|c| *c == category)
}

pub const POST_MEDIA_TYPES: [&str; 2] = ["photo", "video"];

pub fn is_known_media_type(media_type: &str) -> bool {
    POST_MEDIA_TYPES.iter().any(|t| *t == media_type)
}

/// Usernames are lowercase handles: 3-24 chars of a-z, 0-9 and underscore.
pub fn is_valid_username(username: &str) -> bool {
    let len = username.chars().count();
    (3..=24).contains(&len)
        && username
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub profile_photo_url: Option<String>,
    pub banner_image_url: Option<String>,
    pub social_links: Option<serde_json::Value>,
}

pub enum SaveProfileOutcome {
    Saved(ProfileRow),
    InvalidUsername,
    UsernameTaken,
}

pub async fn save_profile(
    pool: &SqlitePool,
    user_id: &str,
    update: &ProfileUpdate,
) -> sqlx::Result<SaveProfileOutcome> {
    let username = update.username.trim().to_lowercase();
    if !is_valid_username(&username) {
        return Ok(SaveProfileOutcome::InvalidUsername);
    }
    if profiles_repo::username_taken(pool, &username, user_id).await? {
        return Ok(SaveProfileOutcome::UsernameTaken);
    }

    let social_links = update
        .social_links
        .as_ref()
        .filter(|v| v.is_array())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "[]".to_string());

    profiles_repo::upsert_profile(
        pool,
        profiles_repo::UpsertProfile {
            user_id,
            username: &username,
            display_name: update.display_name.as_deref().unwrap_or("").trim(),
            bio: update.bio.as_deref().unwrap_or("").trim(),
            city: update.city.as_deref().unwrap_or("").trim(),
            state: update.state.as_deref().unwrap_or("").trim(),
            profile_photo_url: update
                .profile_photo_url
                .as_deref()
                .filter(|s| !s.trim().is_empty()),
            banner_image_url: update
                .banner_image_url
                .as_deref()
                .filter(|s| !s.trim().is_empty()),
            social_links: &social_links,
        },
    )
    .await?;

    let saved = profiles_repo::load_by_user_id(pool, user_id).await?;
    Ok(match saved {
        Some(p) => SaveProfileOutcome::Saved(p),
        None => SaveProfileOutcome::InvalidUsername,
    })
}

/// Comment authorship needs a display handle even before profile setup.
pub async fn display_handle(pool: &SqlitePool, user_id: &str) -> sqlx::Result<String> {
    let profile = profiles_repo::load_by_user_id(pool, user_id).await?;
    Ok(profile
        .map(|p| {
            if p.display_name.trim().is_empty() {
                p.username
            } else {
                p.display_name
            }
        })
        .unwrap_or_else(|| "Anonymous".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(is_valid_username("jess_757"));
        assert!(is_valid_username("abc"));
        assert!(is_valid_username("a_very_long_name_24ch_ok"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("Uppercase"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("dash-ed"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("this_handle_is_way_too_long_now"));
    }

    #[test]
    fn category_whitelist() {
        assert!(is_known_category("Exhaust"));
        assert!(is_known_category("Wheels & Tires"));
        assert!(!is_known_category("exhaust"));
        assert!(!is_known_category("Nitrous"));
    }

    #[test]
    fn post_media_type_whitelist() {
        assert!(is_known_media_type("photo"));
        assert!(is_known_media_type("video"));
        assert!(!is_known_media_type("gif"));
        assert!(!is_known_media_type("Photo"));
        assert!(!is_known_media_type(""));
    }
}
