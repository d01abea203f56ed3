use crate::activity::{format_duration, now_portal};
use crate::app::AppState;
use crate::error::PortalError;
use crate::users::{Account, UserStore};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{DateTime, FixedOffset};
use lazy_static::lazy_static;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// Login form data
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Email address identifying the account
    pub email: String,

    /// Password in plaintext (only transmitted, never stored)
    pub password: String,
}

/// An authenticated session
///
/// Lives in the in-process session map; the browser only carries its id in
/// the `session` cookie. Sessions do not survive a restart.
#[derive(Debug, Clone)]
pub struct Session {
    /// Email of the authenticated account
    pub email: String,

    /// When the session was established; taken (and cleared) at logout to
    /// compute the logged session duration
    pub start_time: Option<DateTime<FixedOffset>>,

    /// Time when the session expires
    pub expires_at: SystemTime,
}

/// Global sessions storage
///
/// Stores all active user sessions in a thread-safe map.
lazy_static! {
    static ref SESSIONS: RwLock<HashMap<String, Session>> = RwLock::new(HashMap::new());
}

// Constants
const SESSION_COOKIE: &str = "session";
const SESSION_DURATION: u64 = 24 * 60 * 60; // 24 hours in seconds

/// Verify credentials against the user store
///
/// Looks the account up by email and checks the password against its stored
/// Argon2 hash. An unknown email and a wrong password both fail with
/// [`PortalError::InvalidCredentials`] so the responses are
/// indistinguishable to a caller probing for valid emails.
pub fn authenticate<'a>(
    store: &'a UserStore,
    email: &str,
    password: &str,
) -> Result<&'a Account, PortalError> {
    let account = store.get(email).ok_or(PortalError::InvalidCredentials)?;

    if verify_password(password, &account.password_hash) {
        Ok(account)
    } else {
        Err(PortalError::InvalidCredentials)
    }
}

/// Hash a password using Argon2
///
/// Produces the PHC-format string stored in the user table's password
/// column. Used by the `hashpw` provisioning helper.
pub fn hash_password(password: &str) -> Result<String, PortalError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortalError::PasswordHash(e.to_string()))
}

/// Verify a password against a stored Argon2 hash
///
/// A hash that does not parse counts as a mismatch; the row is unusable
/// either way and a distinct error would leak which accounts are broken.
fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("stored password hash is not valid PHC format: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Create a new session for an authenticated account
///
/// Stamps the session start time with the current wall-clock time and
/// returns the unique session id to be set as the `session` cookie.
pub fn create_session(email: &str) -> String {
    let session_id = Uuid::new_v4().to_string();
    let expires_at = SystemTime::now() + Duration::from_secs(SESSION_DURATION);

    let session = Session {
        email: email.to_string(),
        start_time: Some(now_portal()),
        expires_at,
    };

    let mut sessions = SESSIONS.write().unwrap();
    sessions.insert(session_id.clone(), session);

    session_id
}

/// Validate a session id
///
/// Returns the account email if the session exists and has not expired.
pub fn validate_session(session_id: &str) -> Option<String> {
    let sessions = SESSIONS.read().unwrap();

    if let Some(session) = sessions.get(session_id) {
        if session.expires_at > SystemTime::now() {
            return Some(session.email.clone());
        }
    }

    None
}

/// Read and clear a session's start time
///
/// Returns `None` if the session is unknown or the start time was already
/// taken, in which case the logout duration is logged as unknown.
pub fn take_start_time(session_id: &str) -> Option<DateTime<FixedOffset>> {
    let mut sessions = SESSIONS.write().unwrap();
    sessions
        .get_mut(session_id)
        .and_then(|session| session.start_time.take())
}

/// Remove a session from the session map
pub fn destroy_session(session_id: &str) {
    let mut sessions = SESSIONS.write().unwrap();
    sessions.remove(session_id);
}

// Web handler functions below

/// Serve the login page HTML
pub async fn serve_login_page() -> Html<&'static str> {
    Html(include_str!("./static/login.html"))
}

/// Handle login form submissions
///
/// Validates credentials, establishes a session, appends a `login` activity
/// record, and redirects to the dashboard. Invalid credentials get a plain
/// 401 text response rather than a redirect.
#[axum::debug_handler]
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    debug!("login attempt: {}", form.email);

    match authenticate(&state.users, &form.email, &form.password) {
        Ok(account) => {
            let session_id = create_session(&account.email);

            // The audit record must not be able to break the login itself.
            if let Err(e) = state.activity.record(&account.email, "login") {
                warn!("failed to record login for {}: {}", account.email, e);
            }

            debug!("user logged in: {}", account.email);
            let cookie = Cookie::new(SESSION_COOKIE, session_id);
            (jar.add(cookie), Redirect::to("/dashboard")).into_response()
        }
        Err(PortalError::InvalidCredentials) => {
            debug!("invalid credentials for {}", form.email);
            (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response()
        }
        Err(e) => {
            warn!("authentication error for {}: {}", form.email, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error").into_response()
        }
    }
}

/// Handle user logout
///
/// Computes the session duration from the stored start time (or logs it as
/// unknown), appends the logout activity record, invalidates the session and
/// clears the cookie. The session always ends, even when the activity write
/// fails.
#[axum::debug_handler]
pub async fn handle_logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    axum::Extension(email): axum::Extension<String>,
) -> Response {
    let action = match jar.get(SESSION_COOKIE) {
        Some(cookie) => {
            let session_id = cookie.value().to_string();
            let action = match take_start_time(&session_id) {
                Some(start) => {
                    format!("logout (duration: {})", format_duration(now_portal() - start))
                }
                None => "logout (duration: unknown)".to_string(),
            };
            destroy_session(&session_id);
            action
        }
        None => "logout (duration: unknown)".to_string(),
    };

    if let Err(e) = state.activity.record(&email, &action) {
        warn!("failed to record logout for {}: {}", email, e);
    }

    debug!("user logged out: {}", email);
    let cookie = Cookie::new(SESSION_COOKIE, "");
    (jar.add(cookie), Redirect::to("/login")).into_response()
}

/// Authentication middleware
///
/// Requests carrying a valid session cookie continue with the account email
/// inserted as a request extension; everything else is redirected to the
/// login page.
pub async fn require_auth(
    jar: CookieJar,
    mut request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        if let Some(email) = validate_session(session_cookie.value()) {
            request.extensions_mut().insert(email);
            return next.run(request).await;
        }
    }

    Redirect::to("/login").into_response()
}
