use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use dotenvy::dotenv;
use http::header::{HeaderValue, CACHE_CONTROL};
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use cruiser::web::middleware::auth as auth_middleware;
use cruiser::web::routes::{favorites, groups, health, meet, meets, profiles};

/// Locked down to the configured frontend origin when CORS_ALLOW_ORIGIN is
/// set; wide open otherwise (local development).
fn cors_layer() -> CorsLayer {
    match env::var("CORS_ALLOW_ORIGIN") {
        Ok(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .expect("invalid CORS_ALLOW_ORIGIN"),
            )
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt::init();

    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in .env");
    println!("Connecting to database: {}", db_url);

    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("cannot connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations failed");

    // Everything that writes, plus the caller-specific reads, sits behind one
    // auth layer.
    let protected_routes = Router::new()
        .route("/meets", post(meets::submit_meet))
        .route(
            "/meets/:meet_id",
            put(meets::update_meet).delete(meets::delete_meet),
        )
        .route("/my/meets", get(meets::my_meets))
        .route(
            "/meets/:meet_id/rsvp",
            put(meet::set_rsvp).delete(meet::clear_rsvp),
        )
        .route("/meets/:meet_id/comments", post(meet::post_comment))
        .route("/comments/:comment_id", delete(meet::delete_comment))
        .route("/favorites/:meet_id", post(favorites::toggle_favorite))
        .route("/favorites", get(favorites::favorite_ids))
        .route("/favorites/meets", get(favorites::favorite_meets))
        .route("/groups", post(groups::create_group))
        .route("/groups/:slug/membership", get(groups::my_membership))
        .route("/groups/:slug/join", post(groups::join_group))
        .route("/groups/:slug/leave", post(groups::leave_group))
        .route(
            "/groups/:slug/requests",
            get(groups::pending_requests).post(groups::decide_request),
        )
        .route(
            "/groups/:slug/members/:member_id",
            put(groups::set_member_role).delete(groups::remove_member),
        )
        .route("/groups/:slug", put(groups::update_group))
        .route(
            "/profile",
            get(profiles::my_profile).put(profiles::save_profile),
        )
        .route("/profile/mods", post(profiles::add_mod))
        .route("/profile/mods/:mod_id", delete(profiles::delete_mod))
        .route("/profile/posts", post(profiles::add_post))
        .route("/profile/posts/:post_id", delete(profiles::delete_post))
        .layer(middleware::from_fn(auth_middleware::require_auth));

    let app = Router::new()
        // Public routes
        .route("/health", get(health::health))
        .route("/meets", get(meets::meets_index))
        .route("/meets/search", get(meets::meets_search))
        .route("/meets/:meet_id", get(meets::meet_detail))
        .route("/meets/:meet_id/rsvps", get(meet::meet_rsvps))
        .route("/meets/:meet_id/comments", get(meet::meet_comments))
        .route("/groups", get(groups::groups_index))
        .route("/groups/:slug", get(groups::group_detail))
        .route("/groups/:slug/members", get(groups::group_members))
        .route("/groups/:slug/meets", get(groups::group_meets))
        .route("/profiles/:username", get(profiles::profile_by_username))
        .route("/profiles/:username/mods", get(profiles::profile_mods))
        .route("/profiles/:username/posts", get(profiles::profile_posts))
        // Protected routes
        .merge(protected_routes)
        // Layers
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(cors_layer())
        .layer(CatchPanicLayer::new())
        // State
        .with_state(pool);

    // Start the server (with fallback port)
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("cannot parse host/port");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!(
                "⚠️  Could not bind {}: {}. Trying fallback {}:{}",
                addr,
                e,
                host,
                port + 1
            );
            let fallback: SocketAddr = format!("{}:{}", host, port + 1)
                .parse()
                .expect("cannot parse fallback address");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("cannot bind fallback port")
        }
    };

    let bound_addr = listener.local_addr().expect("no local address");
    println!("🚀 Cruiser backend running on http://{}", bound_addr);
    println!("📍 Try http://{}/meets/search to get started", bound_addr);

    axum::serve(listener, app).await.expect("server error");
}
