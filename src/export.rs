use crate::activity::ActivityRecord;
use crate::app::AppState;
use crate::users::Role;
use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use log::{debug, warn};
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::sync::Arc;

/// Convert activity records to XLSX format
///
/// Writes a header row followed by one row per record, in the order given
/// (the callers pass records in insertion order). Returns the workbook as an
/// in-memory byte buffer ready to be served as a download.
///
/// # Arguments
/// * `records` - The activity records to serialize
///
/// # Returns
/// * `Result<Vec<u8>, XlsxError>` - XLSX file content as bytes or an error
pub fn logs_to_xlsx(records: &[ActivityRecord]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    worksheet.write_string(0, 0, "email")?;
    worksheet.write_string(0, 1, "action")?;
    worksheet.write_string(0, 2, "timestamp")?;

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, &record.email)?;
        worksheet.write_string(row, 1, &record.action)?;
        worksheet.write_string(row, 2, &record.timestamp)?;
    }

    workbook.push_worksheet(worksheet);
    workbook.save_to_buffer()
}

/// Handle activity log downloads (admin only)
///
/// Standard-role accounts get an explicit 403 denial. With no records yet
/// the response says so in plain text instead of serving an empty file.
#[axum::debug_handler]
pub async fn handle_download_logs(
    State(state): State<Arc<AppState>>,
    axum::Extension(email): axum::Extension<String>,
) -> Response {
    let account = match state.users.get(&email) {
        Some(account) => account,
        None => return (StatusCode::UNAUTHORIZED, "Unknown account").into_response(),
    };

    if account.role != Role::Admin {
        debug!("log download denied for non-admin {}", email);
        return (StatusCode::FORBIDDEN, "Access denied: admin role required").into_response();
    }

    let records = match state.activity.fetch_all() {
        Ok(records) => records,
        Err(e) => {
            warn!("failed to read activity log: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read activity log")
                .into_response();
        }
    };

    if records.is_empty() {
        return (StatusCode::OK, "No activity logs recorded yet.").into_response();
    }

    match logs_to_xlsx(&records) {
        Ok(buffer) => (
            [
                (
                    header::CONTENT_TYPE,
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                ),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"activity_logs.xlsx\"",
                ),
            ],
            buffer,
        )
            .into_response(),
        Err(e) => {
            warn!("failed to serialize activity log: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to export activity log").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityLog;
    use crate::auth::hash_password;
    use crate::users::UserStore;

    fn sample_records() -> Vec<ActivityRecord> {
        vec![
            ActivityRecord {
                email: "ana@example.com".to_string(),
                action: "login".to_string(),
                timestamp: "2024-01-31 08:00:00".to_string(),
            },
            ActivityRecord {
                email: "ana@example.com".to_string(),
                action: "logout (duration: 0:45:10)".to_string(),
                timestamp: "2024-01-31 08:45:10".to_string(),
            },
        ]
    }

    fn state_with_roles() -> Arc<AppState> {
        let hash = hash_password("pw").unwrap();
        let csv_text = format!(
            "email,password,role,dashboards,name\n\
             admin@example.com,\"{h}\",admin,abc,Admin\n\
             user@example.com,\"{h}\",standard,abc,User\n",
            h = hash
        );
        let users = UserStore::from_csv_reader(csv::Reader::from_reader(csv_text.as_bytes()));
        Arc::new(AppState {
            users,
            activity: ActivityLog::open_in_memory().unwrap(),
        })
    }

    #[test]
    fn xlsx_output_is_a_zip_container() {
        let buffer = logs_to_xlsx(&sample_records()).unwrap();
        // XLSX is a zip archive; check the magic instead of parsing it back.
        assert!(buffer.len() > 4);
        assert_eq!(&buffer[..2], b"PK");
    }

    #[tokio::test]
    async fn standard_role_is_denied() {
        let state = state_with_roles();
        state.activity.record("user@example.com", "login").unwrap();

        let response = handle_download_logs(
            State(state),
            axum::Extension("user@example.com".to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_with_no_records_gets_an_explicit_message() {
        let state = state_with_roles();

        let response = handle_download_logs(
            State(state),
            axum::Extension("admin@example.com".to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"No activity logs recorded yet.");
    }

    #[tokio::test]
    async fn admin_with_records_gets_an_xlsx_attachment() {
        let state = state_with_roles();
        state.activity.record("user@example.com", "login").unwrap();

        let response = handle_download_logs(
            State(state),
            axum::Extension("admin@example.com".to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .unwrap(),
            "attachment; filename=\"activity_logs.xlsx\""
        );
    }
}
