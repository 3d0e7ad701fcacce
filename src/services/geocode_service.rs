use serde::Deserialize;
use tracing::warn;

use crate::services::meet_search::Coordinates;

/// Nominatim returns lat/lon as strings.
#[derive(Debug, Deserialize)]
struct GeocodeHit {
    lat: Option<String>,
    lon: Option<String>,
}

fn geocoder_base_url() -> String {
    std::env::var("GEOCODER_URL")
        .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string())
}

/// Resolves free-text location ("Norfolk, VA") to coordinates. Returns None
/// on any failure; callers fall back to text matching, the user never sees a
/// geocode error. No retries, no caching.
pub async fn geocode(query: &str) -> Option<Coordinates> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let base_url = geocoder_base_url();
    let url = format!("{}/search", base_url.trim_end_matches('/'));
    let client = reqwest::Client::new();

    let resp = match client
        .get(&url)
        .query(&[
            ("q", query),
            ("format", "json"),
            ("limit", "1"),
            ("countrycodes", "us"),
        ])
        .header("Accept-Language", "en")
        .header("User-Agent", "cruiser-backend")
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!("📍 Geocoder unreachable: {}", e);
            return None;
        }
    };

    if !resp.status().is_success() {
        warn!("📍 Geocoder non-OK: {}", resp.status());
        return None;
    }

    let hits: Vec<GeocodeHit> = match resp.json().await {
        Ok(data) => data,
        Err(e) => {
            warn!("📍 Geocoder JSON parse failed: {}", e);
            return None;
        }
    };

    let hit = hits.into_iter().next()?;
    let lat = hit.lat.as_deref()?.parse::<f64>().ok()?;
    let lon = hit.lon.as_deref()?.parse::<f64>().ok()?;
    Some(Coordinates { lat, lon })
}
