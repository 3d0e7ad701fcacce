use sqlx::SqlitePool;

use crate::models::GroupMemberRow;

const MEMBER_SELECT: &str = r#"
SELECT
  gm.group_id, gm.user_id, gm.role, gm.status, gm.joined_at,
  p.username, p.display_name, p.profile_photo_url
FROM group_members gm
LEFT JOIN profiles p ON p.user_id = gm.user_id
"#;

pub async fn list_active(pool: &SqlitePool, group_id: i64) -> sqlx::Result<Vec<GroupMemberRow>> {
    let sql = format!(
        r#"{MEMBER_SELECT}
WHERE gm.group_id = ? AND gm.status = 'active'
ORDER BY
  CASE gm.role WHEN 'owner' THEN 0 WHEN 'moderator' THEN 1 ELSE 2 END,
  gm.joined_at ASC"#
    );
    sqlx::query_as::<_, GroupMemberRow>(&sql)
        .bind(group_id)
        .fetch_all(pool)
        .await
}

pub async fn list_pending(pool: &SqlitePool, group_id: i64) -> sqlx::Result<Vec<GroupMemberRow>> {
    let sql = format!(
        "{MEMBER_SELECT} WHERE gm.group_id = ? AND gm.status = 'pending' ORDER BY gm.joined_at ASC"
    );
    sqlx::query_as::<_, GroupMemberRow>(&sql)
        .bind(group_id)
        .fetch_all(pool)
        .await
}

pub async fn load_membership(
    pool: &SqlitePool,
    group_id: i64,
    user_id: &str,
) -> sqlx::Result<Option<GroupMemberRow>> {
    let sql = format!("{MEMBER_SELECT} WHERE gm.group_id = ? AND gm.user_id = ?");
    sqlx::query_as::<_, GroupMemberRow>(&sql)
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

const SQL_INSERT_MEMBER: &str = r#"
INSERT INTO group_members (group_id, user_id, role, status)
VALUES (?, ?, ?, ?)
ON CONFLICT (group_id, user_id) DO NOTHING
"#;

pub async fn insert_member(
    pool: &SqlitePool,
    group_id: i64,
    user_id: &str,
    role: &str,
    status: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_MEMBER)
        .bind(group_id)
        .bind(user_id)
        .bind(role)
        .bind(status)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn set_status(
    pool: &SqlitePool,
    group_id: i64,
    user_id: &str,
    status: &str,
) -> sqlx::Result<u64> {
    let res =
        sqlx::query("UPDATE group_members SET status = ? WHERE group_id = ? AND user_id = ?")
            .bind(status)
            .bind(group_id)
            .bind(user_id)
            .execute(pool)
            .await?;
    Ok(res.rows_affected())
}

/// Never touches the owner row; promoting to owner goes through a transfer
/// flow that doesn't exist yet.
pub async fn set_role(
    pool: &SqlitePool,
    group_id: i64,
    user_id: &str,
    role: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(
        "UPDATE group_members SET role = ? WHERE group_id = ? AND user_id = ? AND role != 'owner'",
    )
    .bind(role)
    .bind(group_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(res.rows_affected())
}

pub async fn delete_member(
    pool: &SqlitePool,
    group_id: i64,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(
        "DELETE FROM group_members WHERE group_id = ? AND user_id = ? AND role != 'owner'",
    )
    .bind(group_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(res.rows_affected())
}
