/*!
# BI Portal

A small internal web portal that authenticates employees and shows each of
them the embedded business-intelligence dashboards assigned to them, while
recording login/logout activity for audit purposes.

## Overview

Accounts are provisioned in a CSV table (`database/users.csv`) loaded once at
startup; the portal itself has no user management. Each account carries a
role (admin or standard), a display name, and a comma-separated list of
dashboard identifiers. After login the portal filters a static catalog of
Power BI embed links against those identifiers and renders the matches.

Every login and logout appends a timestamped record to a single SQLite table.
Admins can download the accumulated log as an XLSX spreadsheet; the database
file is backup-copied once at startup.

## Architecture

- **Backend**: Rust, axum, cookie-based sessions held in an in-process map
- **User store**: read-only CSV snapshot, Argon2 password hashes
- **Activity log**: append-only SQLite table, one INSERT per event
- **Export**: rust_xlsxwriter workbook streamed as an attachment

## Modules

- **users**: account model and the CSV-backed user store
- **auth**: credential verification, sessions, login/logout handlers
- **catalog**: static dashboard catalog and the per-account filter
- **activity**: SQLite activity log, timestamps, startup backup
- **export**: XLSX serialization and the admin-only download handler
- **app**: routing, middleware and shared state
- **error**: application error type

## HTTP surface

- `GET/POST /login` - login page and form submission
- `GET /dashboard` - filtered dashboard list (auth required)
- `GET /logout` - ends the session, logs the duration (auth required)
- `GET /download_logs` - XLSX export of the activity log (admin required)
- `GET /health` - liveness probe

## Configuration

The `PORT` environment variable selects the listening port (default 5000).
Everything else - user table path, database path, dashboard catalog, session
lifetime - is compiled in.
*/

// Re-export all modules so they appear in the documentation
pub mod activity;
pub mod app;
pub mod auth;
pub mod catalog;
pub mod error;
pub mod export;
pub mod users;

/// Re-export everything from these modules to make it easier to use
pub use activity::*;
pub use auth::*;
pub use catalog::*;
pub use error::*;
pub use export::*;
pub use users::*;
