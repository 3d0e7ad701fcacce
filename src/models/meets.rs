use serde::Serialize;

/// One meet as stored. `lat`/`lng` are only present when the submission was
/// geocoded; the search pipeline must tolerate their absence.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MeetRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub city: String,
    pub state: String,
    pub location: String,
    pub host_name: String,
    pub host_contact: String,
    pub date: String,
    pub time: String,
    pub event_type: String,
    pub photo_url: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub is_free: i64,
    pub ticket_link: String,
    pub parking_info: String,
    pub status: String,
    /// Set by moderation when a submission is rejected, cleared on resubmit.
    pub rejection_reason: Option<String>,
    pub group_id: Option<i64>,
    pub created_by: String,
    pub created_at: String,
}
