use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::warn;

/// Liveness probe: reports the build marker and whether the database answers.
pub async fn health(State(pool): State<SqlitePool>) -> (StatusCode, Json<Value>) {
    let db_ok = sqlx::query("SELECT 1").execute(&pool).await.is_ok();
    if !db_ok {
        warn!("health check: database did not respond");
    }

    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "status": if db_ok { "ok" } else { "degraded" },
            "build": env!("CRUISER_BUILD_ID"),
        })),
    )
}
