use sqlx::SqlitePool;

use crate::models::MeetRow;

pub async fn is_favorited(
    pool: &SqlitePool,
    user_id: &str,
    meet_id: i64,
) -> sqlx::Result<bool> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM favorites WHERE user_id = ? AND meet_id = ?")
            .bind(user_id)
            .bind(meet_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

pub async fn insert_favorite(
    pool: &SqlitePool,
    user_id: &str,
    meet_id: i64,
) -> sqlx::Result<u64> {
    let res = sqlx::query("INSERT OR IGNORE INTO favorites (user_id, meet_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(meet_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_favorite(
    pool: &SqlitePool,
    user_id: &str,
    meet_id: i64,
) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND meet_id = ?")
        .bind(user_id)
        .bind(meet_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn list_meet_ids(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<i64>> {
    let rows: Vec<(i64,)> =
        sqlx::query_as("SELECT meet_id FROM favorites WHERE user_id = ? ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

const SQL_LIST_FAVORITED_MEETS: &str = r#"
SELECT
  m.id, m.title, m.description, m.city, m.state, m.location,
  m.host_name, m.host_contact, m.date, m.time, m.event_type,
  m.photo_url, m.lat, m.lng, m.is_free, m.ticket_link, m.parking_info,
  m.status, m.rejection_reason, m.group_id, m.created_by, m.created_at
FROM favorites f
JOIN meets m ON m.id = f.meet_id
WHERE f.user_id = ? AND m.status = 'approved'
ORDER BY f.created_at DESC
"#;

pub async fn list_favorited_meets(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Vec<MeetRow>> {
    sqlx::query_as::<_, MeetRow>(SQL_LIST_FAVORITED_MEETS)
        .bind(user_id)
        .fetch_all(pool)
        .await
}
