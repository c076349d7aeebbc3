// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV export of attendance summaries.

use clubhub_domain::AttendanceSummary;

use crate::error::ApiError;

/// Column headers of the attendance export, in order.
pub const ATTENDANCE_CSV_HEADERS: [&str; 9] = [
    "user_id",
    "name",
    "email",
    "expected_sessions",
    "present",
    "late",
    "absent",
    "excused",
    "attendance_rate",
];

fn csv_error(err: impl std::fmt::Display) -> ApiError {
    ApiError::Internal {
        message: format!("Failed to write CSV: {err}"),
    }
}

/// Renders attendance summaries as CSV with a header row.
///
/// The header is written even when there are no rows.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn attendance_summary_csv(rows: &[AttendanceSummary]) -> Result<String, ApiError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(ATTENDANCE_CSV_HEADERS)
        .map_err(csv_error)?;

    for row in rows {
        writer
            .write_record([
                row.user_id.to_string(),
                row.name.clone(),
                row.email.clone(),
                row.expected_sessions.to_string(),
                row.present.to_string(),
                row.late.to_string(),
                row.absent.to_string(),
                row.excused.to_string(),
                row.attendance_rate.to_string(),
            ])
            .map_err(csv_error)?;
    }

    let bytes: Vec<u8> = writer.into_inner().map_err(csv_error)?;
    String::from_utf8(bytes).map_err(csv_error)
}
