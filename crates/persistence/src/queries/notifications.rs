// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::{NotificationData, NotificationRow};
use crate::diesel_schema::notifications;
use crate::error::PersistenceError;

/// Lists a user's notifications, newest first.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `user_id` - The recipient
/// * `unread_only` - When true, read notifications are skipped
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_notifications(
    conn: &mut SqliteConnection,
    user_id: i64,
    unread_only: bool,
) -> Result<Vec<NotificationData>, PersistenceError> {
    let mut query = notifications::table
        .filter(notifications::user_id.eq(user_id))
        .order(notifications::notification_id.desc())
        .select(NotificationRow::as_select())
        .into_boxed();

    if unread_only {
        query = query.filter(notifications::is_read.eq(0));
    }

    let rows: Vec<NotificationRow> = query.load(conn)?;
    Ok(rows.into_iter().map(NotificationData::from).collect())
}
