//! The meet search pipeline: committed filter criteria are applied to an
//! in-memory snapshot of approved meets (location radius with text fallback,
//! event type, date range), and the result is paginated.
//!
//! Everything here is pure except [`FilterState::submit`], which awaits the
//! geocoder the caller passes in.

use std::future::Future;

use crate::models::MeetRow;

pub const PAGE_SIZE: usize = 6;
pub const DEFAULT_RADIUS_MILES: f64 = 25.0;
pub const ALL_TYPES: &str = "All Types";

pub const EVENT_TYPES: [&str; 5] = ["Cars & Coffee", "Night Meet", "Cruise", "Show", "Track Day"];

const EARTH_RADIUS_MILES: f64 = 3958.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

pub fn distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_MILES * c
}

/// Radius dropdowns send labels like "25 mi"; take the leading integer and
/// fall back to 25 when it isn't there.
pub fn parse_radius_label(label: &str) -> f64 {
    let digits: String = label
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<f64>().unwrap_or(DEFAULT_RADIUS_MILES)
}

/// Filter inputs as the user edits them. Never read by the pipeline directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftCriteria {
    pub location_text: String,
    pub state_text: String,
    pub event_type: String,
    pub date_from: String,
    pub date_to: String,
    pub radius_label: String,
}

impl DraftCriteria {
    /// What gets sent to the geocoder: "city" or "city, state".
    pub fn geocode_query(&self) -> String {
        let city = self.location_text.trim();
        let state = self.state_text.trim();
        if state.is_empty() {
            city.to_string()
        } else {
            format!("{}, {}", city, state)
        }
    }
}

/// Filter inputs as last applied on explicit submission. This is the only
/// shape the pipeline reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommittedCriteria {
    pub location_text: String,
    pub state_text: String,
    pub event_type: String,
    pub date_from: String,
    pub date_to: String,
    pub radius_miles: f64,
    pub resolved: Option<Coordinates>,
    /// Set when location text was present but geocoding failed, so the
    /// frontend can show a "showing text matches" notice instead of silently
    /// degrading.
    pub geocode_degraded: bool,
}

fn wants_event_type_filter(event_type: &str) -> bool {
    let t = event_type.trim();
    !t.is_empty() && !t.eq_ignore_ascii_case(ALL_TYPES)
}

fn location_matches(meet: &MeetRow, committed: &CommittedCriteria) -> bool {
    let q = committed.location_text.trim().to_lowercase();
    let city = meet.city.trim().to_lowercase();

    match committed.resolved {
        Some(center) => match (meet.lat, meet.lng) {
            (Some(lat), Some(lng)) => {
                distance_miles(center.lat, center.lon, lat, lng) <= committed.radius_miles
            }
            // No coordinates on record: fall back to text so the meet isn't
            // silently dropped from radius search.
            _ => !city.is_empty() && city.contains(&q),
        },
        None => {
            let hay = format!("{} {} {}", meet.city, meet.state, meet.title).to_lowercase();
            // Both directions: "Norfolk, VA" should still match a meet whose
            // city is just "Norfolk".
            hay.contains(&q) || (!city.is_empty() && q.contains(&city))
        }
    }
}

/// Applies the committed criteria in order: location, event type, date from,
/// date to. Each step narrows the previous result; empty criteria are no-ops.
/// Input order is preserved.
pub fn apply_filters(meets: &[MeetRow], committed: &CommittedCriteria) -> Vec<MeetRow> {
    let mut list: Vec<MeetRow> = meets.to_vec();

    if !committed.location_text.trim().is_empty() {
        list.retain(|m| location_matches(m, committed));
    }

    if wants_event_type_filter(&committed.event_type) {
        list.retain(|m| m.event_type.trim().eq_ignore_ascii_case(committed.event_type.trim()));
    }

    // ISO dates compare correctly as strings.
    if !committed.date_from.is_empty() {
        list.retain(|m| m.date.as_str() >= committed.date_from.as_str());
    }
    if !committed.date_to.is_empty() {
        list.retain(|m| m.date.as_str() <= committed.date_to.as_str());
    }

    list
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
}

/// "Page 1 of 1" is a valid display state for zero results, so total_pages is
/// never below 1. Out-of-range requests clamp instead of erroring.
pub fn paginate<T: Clone>(items: &[T], page_size: usize, requested_page: usize) -> Page<T> {
    let total_count = items.len();
    let total_pages = if total_count == 0 {
        1
    } else {
        total_count.div_ceil(page_size)
    };
    let current_page = requested_page.clamp(1, total_pages);

    let start = (current_page - 1) * page_size;
    let end = (start + page_size).min(total_count);
    let page_items = if start < total_count {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };

    Page {
        items: page_items,
        current_page,
        total_pages,
        total_count,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Geocoding,
    Committed,
}

/// Holds the two filter generations plus the page cursor. Submissions carry a
/// sequence number so a geocode response that resolves after a newer
/// submission is discarded instead of clobbering it.
#[derive(Debug)]
pub struct FilterState {
    pub draft: DraftCriteria,
    committed: CommittedCriteria,
    phase: SearchPhase,
    page: usize,
    submit_seq: u64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            draft: DraftCriteria::default(),
            committed: CommittedCriteria::default(),
            phase: SearchPhase::Idle,
            page: 1,
            submit_seq: 0,
        }
    }
}

impl FilterState {
    pub fn committed(&self) -> &CommittedCriteria {
        &self.committed
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Snapshots the draft and hands back the sequence number the eventual
    /// [`finish_submit`](Self::finish_submit) must present.
    pub fn begin_submit(&mut self) -> (u64, DraftCriteria) {
        self.submit_seq += 1;
        if !self.draft.location_text.trim().is_empty() {
            self.phase = SearchPhase::Geocoding;
        }
        (self.submit_seq, self.draft.clone())
    }

    /// Commits the snapshot taken at `begin_submit`. Returns false (and leaves
    /// all state untouched) when a newer submission started in the meantime.
    pub fn finish_submit(
        &mut self,
        seq: u64,
        draft: DraftCriteria,
        resolved: Option<Coordinates>,
        geocode_degraded: bool,
    ) -> bool {
        if seq != self.submit_seq {
            return false;
        }
        self.committed = CommittedCriteria {
            location_text: draft.location_text.trim().to_string(),
            state_text: draft.state_text.trim().to_string(),
            event_type: draft.event_type.trim().to_string(),
            date_from: draft.date_from.trim().to_string(),
            date_to: draft.date_to.trim().to_string(),
            radius_miles: parse_radius_label(&draft.radius_label),
            resolved,
            geocode_degraded,
        };
        self.phase = SearchPhase::Committed;
        self.page = 1;
        true
    }

    /// Full submission: geocode when location text is present, then commit.
    /// Geocoder failure degrades to text matching, it never fails the
    /// submission.
    pub async fn submit<F, Fut>(&mut self, geocode: F) -> bool
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Option<Coordinates>>,
    {
        let (seq, draft) = self.begin_submit();

        let (resolved, degraded) = if draft.location_text.trim().is_empty() {
            (None, false)
        } else {
            let resolved = geocode(draft.geocode_query()).await;
            (resolved, resolved.is_none())
        };

        self.finish_submit(seq, draft, resolved, degraded)
    }

    /// Back to the initial empty state, including the page cursor.
    pub fn clear(&mut self) {
        self.submit_seq += 1;
        self.draft = DraftCriteria::default();
        self.committed = CommittedCriteria::default();
        self.phase = SearchPhase::Idle;
        self.page = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meet(id: i64, city: &str, lat: Option<f64>, lng: Option<f64>) -> MeetRow {
        MeetRow {
            id,
            title: format!("Meet {}", id),
            description: String::new(),
            city: city.to_string(),
            state: "VA".to_string(),
            location: String::new(),
            host_name: "host".to_string(),
            host_contact: String::new(),
            date: "2026-03-01".to_string(),
            time: "09:00".to_string(),
            event_type: "Cars & Coffee".to_string(),
            photo_url: None,
            lat,
            lng,
            is_free: 1,
            ticket_link: String::new(),
            parking_info: String::new(),
            status: "approved".to_string(),
            rejection_reason: None,
            group_id: None,
            created_by: "u1".to_string(),
            created_at: "2026-01-01 00:00:00".to_string(),
        }
    }

    fn committed_location(text: &str, resolved: Option<Coordinates>, radius: f64) -> CommittedCriteria {
        CommittedCriteria {
            location_text: text.to_string(),
            radius_miles: radius,
            resolved,
            ..CommittedCriteria::default()
        }
    }

    const NORFOLK: Coordinates = Coordinates {
        lat: 36.85,
        lon: -76.28,
    };

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            ((36.85, -76.28), (37.54, -77.43)),
            ((0.0, 0.0), (45.0, 90.0)),
            ((-33.86, 151.21), (51.51, -0.13)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in pairs {
            let ab = distance_miles(lat1, lon1, lat2, lon2);
            let ba = distance_miles(lat2, lon2, lat1, lon1);
            assert!((ab - ba).abs() < 1e-9, "asymmetric: {} vs {}", ab, ba);
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert!(distance_miles(36.85, -76.28, 36.85, -76.28).abs() < 1e-9);
        assert!(distance_miles(0.0, 0.0, 0.0, 0.0).abs() < 1e-9);
    }

    #[test]
    fn norfolk_richmond_is_about_ninety_miles() {
        let d = distance_miles(36.85, -76.28, 37.54, -77.43);
        assert!(d > 70.0 && d < 110.0, "got {}", d);
    }

    #[test]
    fn radius_label_parses_leading_integer() {
        assert_eq!(parse_radius_label("25 mi"), 25.0);
        assert_eq!(parse_radius_label("100 mi"), 100.0);
        assert_eq!(parse_radius_label("  50 mi "), 50.0);
        assert_eq!(parse_radius_label("anywhere"), DEFAULT_RADIUS_MILES);
        assert_eq!(parse_radius_label(""), DEFAULT_RADIUS_MILES);
    }

    #[test]
    fn radius_filter_keeps_nearby_drops_far() {
        let meets = vec![
            meet(1, "Norfolk", Some(36.85), Some(-76.28)),
            meet(2, "Richmond", Some(37.54), Some(-77.43)),
        ];
        let committed = committed_location("Norfolk, VA", Some(NORFOLK), 25.0);
        let out = apply_filters(&meets, &committed);
        assert_eq!(out.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn radius_filter_is_monotone_in_radius() {
        let meets = vec![
            meet(1, "Norfolk", Some(36.85), Some(-76.28)),
            meet(2, "Virginia Beach", Some(36.85), Some(-75.98)),
            meet(3, "Richmond", Some(37.54), Some(-77.43)),
            meet(4, "Roanoke", Some(37.27), Some(-79.94)),
        ];
        let mut previous: Vec<i64> = Vec::new();
        for radius in [5.0, 25.0, 50.0, 100.0, 250.0] {
            let committed = committed_location("Norfolk", Some(NORFOLK), radius);
            let ids: Vec<i64> = apply_filters(&meets, &committed).iter().map(|m| m.id).collect();
            for id in &previous {
                assert!(ids.contains(id), "radius {} lost meet {}", radius, id);
            }
            previous = ids;
        }
    }

    #[test]
    fn meet_without_coords_falls_back_to_city_text_match() {
        let meets = vec![
            meet(1, "Norfolk", None, None),
            meet(2, "Richmond", None, None),
        ];
        // Radius is irrelevant for coordinate-less meets.
        let committed = committed_location("norfolk", Some(NORFOLK), 0.001);
        let out = apply_filters(&meets, &committed);
        assert_eq!(out.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn failed_geocode_falls_back_to_text_matching() {
        let meets = vec![
            meet(1, "Norfolk", Some(36.85), Some(-76.28)),
            meet(2, "Richmond", Some(37.54), Some(-77.43)),
        ];
        // resolved = None models a failed geocode; "Norfolk, VA" still finds
        // the Norfolk meet because the query contains the city.
        let committed = committed_location("Norfolk, VA", None, 25.0);
        let out = apply_filters(&meets, &committed);
        assert_eq!(out.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn event_type_filter_respects_sentinel_and_case() {
        let mut night = meet(1, "Norfolk", None, None);
        night.event_type = "Night Meet".to_string();
        let coffee = meet(2, "Norfolk", None, None);
        let meets = vec![night, coffee];

        let mut committed = CommittedCriteria::default();
        committed.event_type = ALL_TYPES.to_string();
        assert_eq!(apply_filters(&meets, &committed).len(), 2);

        committed.event_type = "night meet".to_string();
        let out = apply_filters(&meets, &committed);
        assert_eq!(out.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn date_range_is_lexicographic_inclusive() {
        let mut early = meet(1, "Norfolk", None, None);
        early.date = "2026-02-01".to_string();
        let mut mid = meet(2, "Norfolk", None, None);
        mid.date = "2026-02-20".to_string();
        let mut late = meet(3, "Norfolk", None, None);
        late.date = "2026-03-15".to_string();
        let meets = vec![early, mid, late];

        let committed = CommittedCriteria {
            date_from: "2026-02-20".to_string(),
            date_to: "2026-03-15".to_string(),
            ..CommittedCriteria::default()
        };
        let out = apply_filters(&meets, &committed);
        assert_eq!(out.iter().map(|m| m.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn missing_fields_do_not_panic() {
        let mut blank = meet(1, "", None, None);
        blank.title = String::new();
        blank.state = String::new();
        blank.event_type = String::new();
        blank.date = String::new();
        let meets = vec![blank];

        let committed = CommittedCriteria {
            location_text: "Norfolk".to_string(),
            event_type: "Show".to_string(),
            date_from: "2026-01-01".to_string(),
            ..CommittedCriteria::default()
        };
        assert!(apply_filters(&meets, &committed).is_empty());
    }

    #[test]
    fn pagination_totals() {
        let items: Vec<i64> = (0..14).collect();
        let page = paginate(&items, 6, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_count, 14);

        let empty: Vec<i64> = Vec::new();
        let page = paginate(&empty, 6, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn pagination_last_page_is_partial() {
        let items: Vec<i64> = (0..14).collect();
        let page = paginate(&items, 6, 3);
        assert_eq!(page.items, vec![12, 13]);
        assert_eq!(page.current_page, 3);
    }

    #[test]
    fn page_requests_clamp_instead_of_erroring() {
        let items: Vec<i64> = (0..14).collect();
        assert_eq!(paginate(&items, 6, 0), paginate(&items, 6, 1));
        assert_eq!(paginate(&items, 6, 99), paginate(&items, 6, 3));
    }

    #[tokio::test]
    async fn submit_geocodes_and_commits() {
        let mut state = FilterState::default();
        state.draft.location_text = "Norfolk".to_string();
        state.draft.state_text = "VA".to_string();
        state.draft.radius_label = "25 mi".to_string();
        state.set_page(4);

        let ok = state
            .submit(|query| async move {
                assert_eq!(query, "Norfolk, VA");
                Some(NORFOLK)
            })
            .await;

        assert!(ok);
        assert_eq!(state.phase(), SearchPhase::Committed);
        assert_eq!(state.committed().resolved, Some(NORFOLK));
        assert_eq!(state.committed().radius_miles, 25.0);
        assert!(!state.committed().geocode_degraded);
        // Committing resets the page cursor.
        assert_eq!(state.page(), 1);
    }

    #[tokio::test]
    async fn submit_without_location_skips_geocoder() {
        let mut state = FilterState::default();
        state.draft.event_type = "Show".to_string();

        let ok = state
            .submit(|_query| async move {
                panic!("geocoder must not be called for empty location text");
            })
            .await;

        assert!(ok);
        assert_eq!(state.committed().resolved, None);
        assert!(!state.committed().geocode_degraded);
    }

    #[tokio::test]
    async fn geocode_failure_degrades_but_still_commits() {
        let mut state = FilterState::default();
        state.draft.location_text = "Norfolk".to_string();

        let ok = state.submit(|_query| async move { None }).await;

        assert!(ok);
        assert_eq!(state.phase(), SearchPhase::Committed);
        assert_eq!(state.committed().resolved, None);
        assert!(state.committed().geocode_degraded);
    }

    #[test]
    fn stale_geocode_response_is_discarded() {
        let mut state = FilterState::default();
        state.draft.location_text = "Norfolk".to_string();
        let (first_seq, first_draft) = state.begin_submit();

        // A second submission starts while the first geocode is in flight.
        state.draft.location_text = "Richmond".to_string();
        let (second_seq, second_draft) = state.begin_submit();
        assert!(state.finish_submit(second_seq, second_draft, None, true));

        // The first response resolves late and must not clobber the commit.
        let applied = state.finish_submit(first_seq, first_draft, Some(NORFOLK), false);
        assert!(!applied);
        assert_eq!(state.committed().location_text, "Richmond");
        assert_eq!(state.committed().resolved, None);
    }

    #[test]
    fn clear_resets_everything() {
        let mut state = FilterState::default();
        state.draft.location_text = "Norfolk".to_string();
        let (seq, draft) = state.begin_submit();
        state.finish_submit(seq, draft, Some(NORFOLK), false);
        state.set_page(3);

        state.clear();
        assert_eq!(state.phase(), SearchPhase::Idle);
        assert_eq!(state.draft, DraftCriteria::default());
        assert_eq!(*state.committed(), CommittedCriteria::default());
        assert_eq!(state.page(), 1);
    }
}
