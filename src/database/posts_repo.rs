use sqlx::SqlitePool;

use crate::models::PostRow;

const SQL_LIST_FOR_USER: &str = r#"
SELECT id, user_id, media_url, media_type, caption, created_at
FROM posts
WHERE user_id = ?
ORDER BY created_at DESC, id DESC
"#;

pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<PostRow>> {
    sqlx::query_as::<_, PostRow>(SQL_LIST_FOR_USER)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

const SQL_INSERT: &str = r#"
INSERT INTO posts (user_id, media_url, media_type, caption)
VALUES (?, ?, ?, ?)
"#;

pub async fn insert_post(
    pool: &SqlitePool,
    user_id: &str,
    media_url: &str,
    media_type: &str,
    caption: &str,
) -> sqlx::Result<Option<PostRow>> {
    let res = sqlx::query(SQL_INSERT)
        .bind(user_id)
        .bind(media_url)
        .bind(media_type)
        .bind(caption)
        .execute(pool)
        .await?;

    let id = res.last_insert_rowid();
    sqlx::query_as::<_, PostRow>(
        "SELECT id, user_id, media_url, media_type, caption, created_at FROM posts WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_own_post(pool: &SqlitePool, post_id: i64, user_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM posts WHERE id = ? AND user_id = ?")
        .bind(post_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
