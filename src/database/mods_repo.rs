use sqlx::SqlitePool;

use crate::models::ModRow;

const SQL_LIST_FOR_USER: &str = r#"
SELECT id, user_id, category, mod_name, brand, install_date, notes, created_at
FROM mods
WHERE user_id = ?
ORDER BY category ASC, created_at ASC
"#;

pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<ModRow>> {
    sqlx::query_as::<_, ModRow>(SQL_LIST_FOR_USER)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

const SQL_INSERT: &str = r#"
INSERT INTO mods (user_id, category, mod_name, brand, install_date, notes)
VALUES (?, ?, ?, ?, ?, ?)
"#;

pub async fn insert_mod(
    pool: &SqlitePool,
    user_id: &str,
    category: &str,
    mod_name: &str,
    brand: &str,
    install_date: &str,
    notes: &str,
) -> sqlx::Result<Option<ModRow>> {
    let res = sqlx::query(SQL_INSERT)
        .bind(user_id)
        .bind(category)
        .bind(mod_name)
        .bind(brand)
        .bind(install_date)
        .bind(notes)
        .execute(pool)
        .await?;

    let id = res.last_insert_rowid();
    sqlx::query_as::<_, ModRow>(
        "SELECT id, user_id, category, mod_name, brand, install_date, notes, created_at FROM mods WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_own_mod(pool: &SqlitePool, mod_id: i64, user_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM mods WHERE id = ? AND user_id = ?")
        .bind(mod_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
