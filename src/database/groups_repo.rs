use sqlx::SqlitePool;

use crate::models::GroupRow;

const GROUP_SELECT: &str = r#"
SELECT
  g.id, g.slug, g.name, g.description, g.group_type, g.privacy,
  g.location, g.avatar_url, g.banner_url, g.created_by, g.created_at,
  (
    SELECT COUNT(*)
    FROM group_members gm
    WHERE gm.group_id = g.id AND gm.status = 'active'
  ) AS member_count
FROM groups g
"#;

pub async fn list_groups(
    pool: &SqlitePool,
    group_type: &str,
    q_like: &str,
    limit: i64,
) -> sqlx::Result<Vec<GroupRow>> {
    let sql = format!(
        r#"{GROUP_SELECT}
WHERE (? = '' OR g.group_type = ?)
  AND (
    ? = ''
    OR lower(g.name) LIKE ?
    OR lower(g.description) LIKE ?
    OR lower(g.location) LIKE ?
  )
ORDER BY member_count DESC, g.created_at DESC
LIMIT ?"#
    );
    sqlx::query_as::<_, GroupRow>(&sql)
        .bind(group_type)
        .bind(group_type)
        .bind(q_like)
        .bind(q_like)
        .bind(q_like)
        .bind(q_like)
        .bind(limit)
        .fetch_all(pool)
        .await
}

pub async fn load_by_slug(pool: &SqlitePool, slug: &str) -> sqlx::Result<Option<GroupRow>> {
    let sql = format!("{GROUP_SELECT} WHERE g.slug = ?");
    sqlx::query_as::<_, GroupRow>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn slug_exists(pool: &SqlitePool, slug: &str) -> sqlx::Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM groups WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub struct NewGroup<'a> {
    pub slug: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub group_type: &'a str,
    pub privacy: &'a str,
    pub location: &'a str,
    pub avatar_url: Option<&'a str>,
    pub banner_url: Option<&'a str>,
    pub created_by: &'a str,
}

const SQL_INSERT_GROUP: &str = r#"
INSERT INTO groups (
  slug, name, description, group_type, privacy,
  location, avatar_url, banner_url, created_by
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub async fn insert_group(pool: &SqlitePool, group: NewGroup<'_>) -> sqlx::Result<i64> {
    let res = sqlx::query(SQL_INSERT_GROUP)
        .bind(group.slug)
        .bind(group.name)
        .bind(group.description)
        .bind(group.group_type)
        .bind(group.privacy)
        .bind(group.location)
        .bind(group.avatar_url)
        .bind(group.banner_url)
        .bind(group.created_by)
        .execute(pool)
        .await?;
    Ok(res.last_insert_rowid())
}

const SQL_UPDATE_GROUP: &str = r#"
UPDATE groups SET
  name = ?,
  description = ?,
  avatar_url = COALESCE(?, avatar_url),
  banner_url = COALESCE(?, banner_url)
WHERE id = ?
"#;

pub async fn update_group(
    pool: &SqlitePool,
    group_id: i64,
    name: &str,
    description: &str,
    avatar_url: Option<&str>,
    banner_url: Option<&str>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_GROUP)
        .bind(name)
        .bind(description)
        .bind(avatar_url)
        .bind(banner_url)
        .bind(group_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
