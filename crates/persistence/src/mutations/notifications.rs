// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::diesel_schema::notifications;
use crate::error::PersistenceError;

/// Marks one of a user's notifications as read.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `notification_id` - The notification
/// * `user_id` - The caller; only the recipient may mark it
///
/// # Errors
///
/// Returns `NotificationNotFound` if no notification with that id belongs to
/// the user.
pub fn mark_notification_read(
    conn: &mut SqliteConnection,
    notification_id: i64,
    user_id: i64,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(notifications::table)
        .filter(notifications::notification_id.eq(notification_id))
        .filter(notifications::user_id.eq(user_id))
        .set(notifications::is_read.eq(1))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotificationNotFound(notification_id));
    }

    debug!(notification_id, user_id, "Marked notification read");
    Ok(())
}
