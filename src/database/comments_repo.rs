use sqlx::SqlitePool;

use crate::models::CommentRow;

const SQL_LIST_FOR_MEET: &str = r#"
SELECT id, meet_id, user_id, username, body, created_at
FROM comments
WHERE meet_id = ?
ORDER BY created_at DESC, id DESC
"#;

pub async fn list_for_meet(pool: &SqlitePool, meet_id: i64) -> sqlx::Result<Vec<CommentRow>> {
    sqlx::query_as::<_, CommentRow>(SQL_LIST_FOR_MEET)
        .bind(meet_id)
        .fetch_all(pool)
        .await
}

const SQL_INSERT: &str = r#"
INSERT INTO comments (meet_id, user_id, username, body)
VALUES (?, ?, ?, ?)
"#;

pub async fn insert_comment(
    pool: &SqlitePool,
    meet_id: i64,
    user_id: &str,
    username: &str,
    body: &str,
) -> sqlx::Result<Option<CommentRow>> {
    let res = sqlx::query(SQL_INSERT)
        .bind(meet_id)
        .bind(user_id)
        .bind(username)
        .bind(body)
        .execute(pool)
        .await?;

    let id = res.last_insert_rowid();
    sqlx::query_as::<_, CommentRow>(
        "SELECT id, meet_id, user_id, username, body, created_at FROM comments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_own_comment(
    pool: &SqlitePool,
    comment_id: i64,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM comments WHERE id = ? AND user_id = ?")
        .bind(comment_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
