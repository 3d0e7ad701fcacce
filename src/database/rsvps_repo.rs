use sqlx::{SqliteConnection, SqlitePool};

use crate::models::{RsvpCounts, RsvpRow};

const SQL_LIST_FOR_MEET: &str = r#"
SELECT meet_id, user_id, status, updated_at
FROM rsvps
WHERE meet_id = ?
ORDER BY updated_at ASC
"#;

pub async fn list_for_meet(pool: &SqlitePool, meet_id: i64) -> sqlx::Result<Vec<RsvpRow>> {
    sqlx::query_as::<_, RsvpRow>(SQL_LIST_FOR_MEET)
        .bind(meet_id)
        .fetch_all(pool)
        .await
}

#[derive(sqlx::FromRow)]
struct CountRow {
    going: i64,
    maybe: i64,
}

const SQL_COUNTS: &str = r#"
SELECT
  COALESCE(SUM(CASE WHEN status = 'going' THEN 1 ELSE 0 END), 0) AS going,
  COALESCE(SUM(CASE WHEN status = 'maybe' THEN 1 ELSE 0 END), 0) AS maybe
FROM rsvps
WHERE meet_id = ?
"#;

pub async fn load_counts(pool: &SqlitePool, meet_id: i64) -> sqlx::Result<RsvpCounts> {
    let row = sqlx::query_as::<_, CountRow>(SQL_COUNTS)
        .bind(meet_id)
        .fetch_one(pool)
        .await?;
    Ok(RsvpCounts {
        going: row.going,
        maybe: row.maybe,
    })
}

const SQL_UPSERT: &str = r#"
INSERT INTO rsvps (meet_id, user_id, status, updated_at)
VALUES (?, ?, ?, datetime('now'))
ON CONFLICT (meet_id, user_id)
DO UPDATE SET status = excluded.status, updated_at = excluded.updated_at
"#;

/// Takes a connection instead of a pool so the caller can wrap the write and
/// its command audit row in one transaction.
pub async fn upsert_on(
    conn: &mut SqliteConnection,
    meet_id: i64,
    user_id: &str,
    status: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT)
        .bind(meet_id)
        .bind(user_id)
        .bind(status)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_on(
    conn: &mut SqliteConnection,
    meet_id: i64,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM rsvps WHERE meet_id = ? AND user_id = ?")
        .bind(meet_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}
