use axum::{
    Router,
    extract::State,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use log::info;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::activity::{ACTIVITY_DB_FILE, ActivityLog};
use crate::auth;
use crate::catalog::visible_dashboards;
use crate::export;
use crate::users::UserStore;

/// Path of the CSV user table read once at startup
pub const USERS_FILE: &str = "database/users.csv";

/// Shared application state
///
/// The user store is a read-only snapshot; the activity log serializes its
/// writes internally. Neither needs request-level coordination.
pub struct AppState {
    /// All registered accounts, loaded once at startup
    pub users: UserStore,

    /// Append-only login/logout audit log
    pub activity: ActivityLog,
}

/// Start the portal on the given port
///
/// Loads the user table, opens (and backs up) the activity database, wires
/// the routes and serves until the process is stopped.
pub async fn run(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let users = UserStore::load(Path::new(USERS_FILE));
    info!("user store loaded with {} account(s)", users.len());

    let activity = ActivityLog::open(Path::new(ACTIVITY_DB_FILE))?;

    let app_state = Arc::new(AppState { users, activity });

    // Routes behind the session check
    let protected = Router::new()
        .route("/dashboard", get(serve_dashboard))
        .route("/logout", get(auth::handle_logout))
        .route("/download_logs", get(export::handle_download_logs))
        .route_layer(middleware::from_fn(auth::require_auth));

    // Build router
    let app = Router::new()
        .route("/", get(|| async { Redirect::to("/login") }))
        .route("/login", get(auth::serve_login_page).post(auth::handle_login))
        .route("/health", get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Start server
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Liveness probe
async fn health() -> &'static str {
    "OK"
}

/// Serve the dashboard page for the logged-in account
///
/// Renders the static template with the account's name and its visible
/// dashboard entries injected as a script block, the same way the template
/// consumes them client-side.
#[axum::debug_handler]
async fn serve_dashboard(
    State(state): State<Arc<AppState>>,
    axum::Extension(email): axum::Extension<String>,
) -> Response {
    let account = match state.users.get(&email) {
        Some(account) => account,
        // Session for an email the store no longer knows; force a re-login.
        None => return Redirect::to("/login").into_response(),
    };

    let dashboards = visible_dashboards(account);
    log::debug!("{} sees {} dashboard(s)", email, dashboards.len());

    let dashboards_json =
        serde_json::to_string(&dashboards).unwrap_or_else(|_| "[]".to_string());

    let mut template = include_str!("./static/dashboard.html").to_string();
    template = template.replace(
        "</head>",
        &format!(
            "    <script>const DASHBOARDS_DATA = {};</script>\n</head>",
            dashboards_json
        ),
    );
    template = template.replace("{{user_name}}", &account.name);

    Html(template).into_response()
}
