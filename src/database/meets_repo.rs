use sqlx::SqlitePool;

use crate::models::MeetRow;

const MEET_COLUMNS: &str = r#"
  id, title, description, city, state, location,
  host_name, host_contact, date, time, event_type,
  photo_url, lat, lng, is_free, ticket_link, parking_info,
  status, rejection_reason, group_id, created_by, created_at
"#;

pub async fn list_approved(pool: &SqlitePool) -> sqlx::Result<Vec<MeetRow>> {
    let sql = format!(
        "SELECT {MEET_COLUMNS} FROM meets WHERE status = 'approved' ORDER BY date ASC, time ASC"
    );
    sqlx::query_as::<_, MeetRow>(&sql).fetch_all(pool).await
}

pub async fn load_meet(pool: &SqlitePool, meet_id: i64) -> sqlx::Result<Option<MeetRow>> {
    let sql = format!("SELECT {MEET_COLUMNS} FROM meets WHERE id = ?");
    sqlx::query_as::<_, MeetRow>(&sql)
        .bind(meet_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_creator(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<MeetRow>> {
    let sql = format!(
        "SELECT {MEET_COLUMNS} FROM meets WHERE created_by = ? ORDER BY created_at DESC"
    );
    sqlx::query_as::<_, MeetRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn list_approved_for_group(
    pool: &SqlitePool,
    group_id: i64,
) -> sqlx::Result<Vec<MeetRow>> {
    let sql = format!(
        "SELECT {MEET_COLUMNS} FROM meets WHERE group_id = ? AND status = 'approved' ORDER BY date ASC"
    );
    sqlx::query_as::<_, MeetRow>(&sql)
        .bind(group_id)
        .fetch_all(pool)
        .await
}

pub struct NewMeet<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub location: &'a str,
    pub host_name: &'a str,
    pub host_contact: &'a str,
    pub date: &'a str,
    pub time: &'a str,
    pub event_type: &'a str,
    pub photo_url: Option<&'a str>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub is_free: bool,
    pub ticket_link: &'a str,
    pub parking_info: &'a str,
    pub group_id: Option<i64>,
    pub created_by: &'a str,
}

const SQL_INSERT_MEET: &str = r#"
INSERT INTO meets (
  title, description, city, state, location,
  host_name, host_contact, date, time, event_type,
  photo_url, lat, lng, is_free, ticket_link, parking_info,
  status, group_id, created_by
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?)
"#;

pub async fn insert_meet(pool: &SqlitePool, meet: NewMeet<'_>) -> sqlx::Result<i64> {
    let res = sqlx::query(SQL_INSERT_MEET)
        .bind(meet.title)
        .bind(meet.description)
        .bind(meet.city)
        .bind(meet.state)
        .bind(meet.location)
        .bind(meet.host_name)
        .bind(meet.host_contact)
        .bind(meet.date)
        .bind(meet.time)
        .bind(meet.event_type)
        .bind(meet.photo_url)
        .bind(meet.lat)
        .bind(meet.lng)
        .bind(meet.is_free as i64)
        .bind(meet.ticket_link)
        .bind(meet.parking_info)
        .bind(meet.group_id)
        .bind(meet.created_by)
        .execute(pool)
        .await?;
    Ok(res.last_insert_rowid())
}

const SQL_UPDATE_OWN_MEET: &str = r#"
UPDATE meets SET
  title = ?, description = ?, city = ?, state = ?, location = ?,
  host_name = ?, host_contact = ?, date = ?, time = ?, event_type = ?,
  photo_url = COALESCE(?, photo_url), lat = ?, lng = ?,
  is_free = ?, ticket_link = ?, parking_info = ?,
  status = 'pending', rejection_reason = NULL
WHERE id = ? AND created_by = ? AND status IN ('pending', 'rejected')
"#;

/// Only pending/rejected submissions are editable; an approved meet stays as
/// moderation saw it. Edits re-enter the queue as pending with the rejection
/// reason cleared.
pub async fn update_own_meet(
    pool: &SqlitePool,
    meet_id: i64,
    meet: NewMeet<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_OWN_MEET)
        .bind(meet.title)
        .bind(meet.description)
        .bind(meet.city)
        .bind(meet.state)
        .bind(meet.location)
        .bind(meet.host_name)
        .bind(meet.host_contact)
        .bind(meet.date)
        .bind(meet.time)
        .bind(meet.event_type)
        .bind(meet.photo_url)
        .bind(meet.lat)
        .bind(meet.lng)
        .bind(meet.is_free as i64)
        .bind(meet.ticket_link)
        .bind(meet.parking_info)
        .bind(meet_id)
        .bind(meet.created_by)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_own_meet(
    pool: &SqlitePool,
    meet_id: i64,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM meets WHERE id = ? AND created_by = ?")
        .bind(meet_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
