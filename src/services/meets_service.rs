use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::database::meets_repo;
use crate::models::MeetRow;
use crate::services::geocode_service;
use crate::services::meet_search::{
    self, paginate, DraftCriteria, FilterState, PAGE_SIZE,
};

#[derive(Debug, Deserialize, Default)]
pub struct MeetSearchQuery {
    pub location: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub radius: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MeetSearchPage {
    pub meets: Vec<MeetRow>,
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub geocode_degraded: bool,
}

/// The full pipeline: snapshot of approved meets, geocode the location text,
/// commit the criteria, filter, paginate.
pub async fn search_meets(
    pool: &SqlitePool,
    query: &MeetSearchQuery,
) -> sqlx::Result<MeetSearchPage> {
    let snapshot = meets_repo::list_approved(pool).await?;

    let mut state = FilterState::default();
    state.draft = DraftCriteria {
        location_text: query.location.clone().unwrap_or_default(),
        state_text: query.state.clone().unwrap_or_default(),
        event_type: query.event_type.clone().unwrap_or_default(),
        date_from: query.date_from.clone().unwrap_or_default(),
        date_to: query.date_to.clone().unwrap_or_default(),
        radius_label: query.radius.clone().unwrap_or_default(),
    };
    state.submit(|q| async move { geocode_service::geocode(&q).await }).await;

    let filtered = meet_search::apply_filters(&snapshot, state.committed());
    let page = paginate(&filtered, PAGE_SIZE, query.page.unwrap_or(1));

    Ok(MeetSearchPage {
        meets: page.items,
        page: page.current_page,
        total_pages: page.total_pages,
        total_count: page.total_count,
        geocode_degraded: state.committed().geocode_degraded,
    })
}

#[derive(Debug, Deserialize)]
pub struct MeetSubmission {
    pub title: String,
    pub description: Option<String>,
    pub city: String,
    pub state: String,
    pub location: Option<String>,
    pub host_name: String,
    pub host_contact: Option<String>,
    pub date: String,
    pub time: String,
    pub event_type: String,
    pub photo_url: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub is_free: Option<bool>,
    pub ticket_link: Option<String>,
    pub parking_info: Option<String>,
    pub group_id: Option<i64>,
}

/// Field-level validation before anything touches the database. Returns the
/// offending requirement as a short machine-friendly message.
pub fn validate_submission(meet: &MeetSubmission) -> Result<(), &'static str> {
    if meet.title.trim().is_empty() {
        return Err("title_required");
    }
    if meet.city.trim().is_empty() {
        return Err("city_required");
    }
    if meet.state.trim().is_empty() {
        return Err("state_required");
    }
    if meet.host_name.trim().is_empty() {
        return Err("host_name_required");
    }
    if meet.date.trim().is_empty() {
        return Err("date_required");
    }
    if meet.time.trim().is_empty() {
        return Err("time_required");
    }
    if !meet_search::EVENT_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(meet.event_type.trim()))
    {
        return Err("unknown_event_type");
    }
    Ok(())
}

/// New submissions always enter the moderation queue as pending.
pub async fn submit_meet(
    pool: &SqlitePool,
    user_id: &str,
    meet: &MeetSubmission,
) -> sqlx::Result<Option<MeetRow>> {
    let id = meets_repo::insert_meet(pool, to_new_meet(user_id, meet)).await?;
    meets_repo::load_meet(pool, id).await
}

pub enum UpdateOutcome {
    Updated(MeetRow),
    NotFound,
    /// The meet exists and belongs to the caller, but moderation already
    /// approved it; edits would silently undo that decision.
    NotEditable,
}

pub async fn update_submission(
    pool: &SqlitePool,
    user_id: &str,
    meet_id: i64,
    meet: &MeetSubmission,
) -> sqlx::Result<UpdateOutcome> {
    let Some(existing) = meets_repo::load_meet(pool, meet_id).await? else {
        return Ok(UpdateOutcome::NotFound);
    };
    if existing.created_by != user_id {
        return Ok(UpdateOutcome::NotFound);
    }
    if existing.status != "pending" && existing.status != "rejected" {
        return Ok(UpdateOutcome::NotEditable);
    }

    let updated = meets_repo::update_own_meet(pool, meet_id, to_new_meet(user_id, meet)).await?;
    if updated == 0 {
        return Ok(UpdateOutcome::NotFound);
    }
    match meets_repo::load_meet(pool, meet_id).await? {
        Some(m) => Ok(UpdateOutcome::Updated(m)),
        None => Ok(UpdateOutcome::NotFound),
    }
}

fn to_new_meet<'a>(user_id: &'a str, meet: &'a MeetSubmission) -> meets_repo::NewMeet<'a> {
    meets_repo::NewMeet {
        title: meet.title.trim(),
        description: meet.description.as_deref().unwrap_or(""),
        city: meet.city.trim(),
        state: meet.state.trim(),
        location: meet.location.as_deref().unwrap_or(""),
        host_name: meet.host_name.trim(),
        host_contact: meet.host_contact.as_deref().unwrap_or(""),
        date: meet.date.trim(),
        time: meet.time.trim(),
        event_type: meet.event_type.trim(),
        photo_url: meet.photo_url.as_deref().filter(|s| !s.trim().is_empty()),
        lat: meet.lat,
        lng: meet.lng,
        is_free: meet.is_free.unwrap_or(true),
        ticket_link: meet.ticket_link.as_deref().unwrap_or(""),
        parking_info: meet.parking_info.as_deref().unwrap_or(""),
        group_id: meet.group_id,
        created_by: user_id,
    }
}

/// A meet is visible to everyone once approved, and to its creator in any
/// status (so hosts can see their pending/rejected submissions).
pub fn visible_to(meet: &MeetRow, viewer_user_id: Option<&str>) -> bool {
    meet.status == "approved" || viewer_user_id == Some(meet.created_by.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> MeetSubmission {
        MeetSubmission {
            title: "Sunday Cars and Coffee".to_string(),
            description: None,
            city: "Norfolk".to_string(),
            state: "VA".to_string(),
            location: None,
            host_name: "Jess".to_string(),
            host_contact: None,
            date: "2026-02-20".to_string(),
            time: "09:00".to_string(),
            event_type: "Cars & Coffee".to_string(),
            photo_url: None,
            lat: None,
            lng: None,
            is_free: None,
            ticket_link: None,
            parking_info: None,
            group_id: None,
        }
    }

    #[test]
    fn valid_submission_passes() {
        assert!(validate_submission(&submission()).is_ok());
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let mut s = submission();
        s.title = "   ".to_string();
        assert_eq!(validate_submission(&s), Err("title_required"));

        let mut s = submission();
        s.city = String::new();
        assert_eq!(validate_submission(&s), Err("city_required"));

        let mut s = submission();
        s.event_type = "Drift Day".to_string();
        assert_eq!(validate_submission(&s), Err("unknown_event_type"));
    }

    #[test]
    fn visibility_rules() {
        let mut m = crate::models::MeetRow {
            id: 1,
            title: String::new(),
            description: String::new(),
            city: String::new(),
            state: String::new(),
            location: String::new(),
            host_name: String::new(),
            host_contact: String::new(),
            date: String::new(),
            time: String::new(),
            event_type: String::new(),
            photo_url: None,
            lat: None,
            lng: None,
            is_free: 1,
            ticket_link: String::new(),
            parking_info: String::new(),
            status: "pending".to_string(),
            rejection_reason: None,
            group_id: None,
            created_by: "owner".to_string(),
            created_at: String::new(),
        };
        assert!(!visible_to(&m, None));
        assert!(!visible_to(&m, Some("stranger")));
        assert!(visible_to(&m, Some("owner")));

        m.status = "approved".to_string();
        assert!(visible_to(&m, None));
    }

    async fn test_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrations");
        pool
    }

    async fn set_status(pool: &SqlitePool, meet_id: i64, status: &str, reason: Option<&str>) {
        sqlx::query("UPDATE meets SET status = ?, rejection_reason = ? WHERE id = ?")
            .bind(status)
            .bind(reason)
            .bind(meet_id)
            .execute(pool)
            .await
            .expect("set status");
    }

    #[tokio::test]
    async fn approved_meets_cannot_be_edited_by_their_creator() {
        let pool = test_pool().await;
        let id = meets_repo::insert_meet(&pool, to_new_meet("u1", &submission()))
            .await
            .expect("insert");
        set_status(&pool, id, "approved", None).await;

        let mut edit = submission();
        edit.title = "Edited after approval".to_string();
        let outcome = update_submission(&pool, "u1", id, &edit).await.expect("update");
        assert!(matches!(outcome, UpdateOutcome::NotEditable));

        // The approved record is untouched.
        let meet = meets_repo::load_meet(&pool, id).await.expect("load").expect("row");
        assert_eq!(meet.status, "approved");
        assert_eq!(meet.title, "Sunday Cars and Coffee");
    }

    #[tokio::test]
    async fn rejected_meets_resubmit_as_pending_with_reason_cleared() {
        let pool = test_pool().await;
        let id = meets_repo::insert_meet(&pool, to_new_meet("u1", &submission()))
            .await
            .expect("insert");
        set_status(&pool, id, "rejected", Some("blurry photo")).await;

        let mut edit = submission();
        edit.title = "Sunday Cars and Coffee (new photo)".to_string();
        let outcome = update_submission(&pool, "u1", id, &edit).await.expect("update");
        let UpdateOutcome::Updated(meet) = outcome else {
            panic!("rejected submission should be editable");
        };
        assert_eq!(meet.status, "pending");
        assert_eq!(meet.rejection_reason, None);
        assert_eq!(meet.title, "Sunday Cars and Coffee (new photo)");
    }

    #[tokio::test]
    async fn editing_someone_elses_meet_is_not_found() {
        let pool = test_pool().await;
        let id = meets_repo::insert_meet(&pool, to_new_meet("u1", &submission()))
            .await
            .expect("insert");

        let outcome = update_submission(&pool, "u2", id, &submission())
            .await
            .expect("update");
        assert!(matches!(outcome, UpdateOutcome::NotFound));
    }
}
