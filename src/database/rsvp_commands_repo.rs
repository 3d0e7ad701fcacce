use sqlx::SqliteConnection;

const SQL_INSERT_RSVP_COMMAND: &str = r#"
INSERT INTO rsvp_commands (
  id,
  actor_user_id,
  meet_id,
  action
) VALUES (?, ?, ?, ?)
"#;

pub struct NewRsvpCommand<'a> {
    pub id: &'a str,
    pub actor_user_id: &'a str,
    pub meet_id: i64,
    pub action: &'a str, // going|maybe|clear
}

pub async fn insert_rsvp_command(
    conn: &mut SqliteConnection,
    cmd: NewRsvpCommand<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_RSVP_COMMAND)
        .bind(cmd.id)
        .bind(cmd.actor_user_id)
        .bind(cmd.meet_id)
        .bind(cmd.action)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}
