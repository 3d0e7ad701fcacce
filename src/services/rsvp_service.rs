use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{rsvp_commands_repo, rsvps_repo};
use crate::models::{RsvpCounts, RsvpRow};

pub const RSVP_STATUSES: [&str; 2] = ["going", "maybe"];

pub fn is_valid_status(status: &str) -> bool {
    RSVP_STATUSES.iter().any(|s| *s == status)
}

#[derive(Serialize)]
pub struct MeetRsvps {
    pub counts: RsvpCounts,
    pub rsvps: Vec<RsvpRow>,
}

pub async fn load_meet_rsvps(pool: &SqlitePool, meet_id: i64) -> sqlx::Result<MeetRsvps> {
    let counts = rsvps_repo::load_counts(pool, meet_id).await?;
    let rsvps = rsvps_repo::list_for_meet(pool, meet_id).await?;
    Ok(MeetRsvps { counts, rsvps })
}

/// RSVP mutations are commands: the state change and its audit row commit (or
/// roll back) together, so a half-applied RSVP can't exist.
pub async fn set_rsvp(
    pool: &SqlitePool,
    user_id: &str,
    meet_id: i64,
    status: &str,
) -> sqlx::Result<RsvpCounts> {
    let mut tx = pool.begin().await?;
    rsvps_repo::upsert_on(&mut *tx, meet_id, user_id, status).await?;
    let command_id = Uuid::new_v4().to_string();
    rsvp_commands_repo::insert_rsvp_command(
        &mut *tx,
        rsvp_commands_repo::NewRsvpCommand {
            id: &command_id,
            actor_user_id: user_id,
            meet_id,
            action: status,
        },
    )
    .await?;
    tx.commit().await?;

    rsvps_repo::load_counts(pool, meet_id).await
}

pub async fn clear_rsvp(
    pool: &SqlitePool,
    user_id: &str,
    meet_id: i64,
) -> sqlx::Result<RsvpCounts> {
    let mut tx = pool.begin().await?;
    rsvps_repo::delete_on(&mut *tx, meet_id, user_id).await?;
    let command_id = Uuid::new_v4().to_string();
    rsvp_commands_repo::insert_rsvp_command(
        &mut *tx,
        rsvp_commands_repo::NewRsvpCommand {
            id: &command_id,
            actor_user_id: user_id,
            meet_id,
            action: "clear",
        },
    )
    .await?;
    tx.commit().await?;

    rsvps_repo::load_counts(pool, meet_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_going_and_maybe_are_valid() {
        assert!(is_valid_status("going"));
        assert!(is_valid_status("maybe"));
        assert!(!is_valid_status("interested"));
        assert!(!is_valid_status("GOING"));
        assert!(!is_valid_status(""));
    }
}
