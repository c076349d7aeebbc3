// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Activity aggregate queries.
//!
//! An activity is stored across four tables. These queries read the
//! activity row and its children and rebuild the domain `Activity`.

use std::str::FromStr;

use clubhub_domain::{
    Activity, ActivityStatus, ActivityType, ApprovalStatus, AttendanceRecord, AttendanceStatus,
    DaySlot, Location, LocationMode, Participant, ParticipantRole, ScheduleDay, SlotKind,
    Visibility, parse_date,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use tracing::debug;

use crate::data_models::{ActivityRecord, ActivityRow, AttendanceRow, ParticipantRow};
use crate::diesel_schema::{activities, activity_responsible_persons, attendance_records, participants};
use crate::error::PersistenceError;

fn parse_enum<T: FromStr>(table: &'static str, value: &str) -> Result<T, PersistenceError>
where
    T::Err: std::fmt::Display,
{
    T::from_str(value).map_err(|e| PersistenceError::corrupt(table, e))
}

fn attendance_from_row(row: AttendanceRow) -> Result<AttendanceRecord, PersistenceError> {
    let day_slot: Option<DaySlot> = match (row.day, row.slot) {
        (Some(day), Some(slot)) => {
            let day: u32 = day.to_u32().ok_or_else(|| {
                PersistenceError::corrupt("attendance_records", format!("negative day {day}"))
            })?;
            Some(DaySlot::new(
                day,
                parse_enum::<SlotKind>("attendance_records", &slot)?,
            ))
        }
        _ => None,
    };
    Ok(AttendanceRecord {
        day_slot,
        status: parse_enum::<AttendanceStatus>("attendance_records", &row.status)?,
        recorded_at: row.recorded_at,
        recorded_by: row.recorded_by,
    })
}

fn participant_from_row(
    row: ParticipantRow,
    attendance: Vec<AttendanceRecord>,
) -> Result<Participant, PersistenceError> {
    let registered_day_slots: Vec<DaySlot> = serde_json::from_str(&row.registered_day_slots_json)?;
    Ok(Participant {
        user_id: row.user_id,
        name: row.name,
        email: row.email,
        role: parse_enum::<ParticipantRole>("participants", &row.role)?,
        approval_status: parse_enum::<ApprovalStatus>("participants", &row.approval_status)?,
        registered_day_slots,
        rejection_reason: row.rejection_reason,
        joined_at: row.joined_at,
        attendance,
    })
}

/// Reads the children of an activity row and assembles the aggregate.
fn load_aggregate(
    conn: &mut SqliteConnection,
    row: ActivityRow,
) -> Result<ActivityRecord, PersistenceError> {
    let activity_id: i64 = row.activity_id;

    let responsible_persons: Vec<i64> = activity_responsible_persons::table
        .filter(activity_responsible_persons::activity_id.eq(activity_id))
        .order(activity_responsible_persons::position.asc())
        .select(activity_responsible_persons::user_id)
        .load(conn)?;

    let participant_rows: Vec<ParticipantRow> = participants::table
        .filter(participants::activity_id.eq(activity_id))
        .order(participants::position.asc())
        .select(ParticipantRow::as_select())
        .load(conn)?;

    let mut attendance_rows: Vec<AttendanceRow> = attendance_records::table
        .filter(attendance_records::activity_id.eq(activity_id))
        .order(attendance_records::record_id.asc())
        .select(AttendanceRow::as_select())
        .load(conn)?;

    let mut participant_list: Vec<Participant> = Vec::with_capacity(participant_rows.len());
    for participant_row in participant_rows {
        let (mine, rest): (Vec<AttendanceRow>, Vec<AttendanceRow>) = attendance_rows
            .into_iter()
            .partition(|a| a.user_id == participant_row.user_id);
        attendance_rows = rest;
        let attendance: Vec<AttendanceRecord> = mine
            .into_iter()
            .map(attendance_from_row)
            .collect::<Result<_, _>>()?;
        participant_list.push(participant_from_row(participant_row, attendance)?);
    }

    let location: Option<Location> = row
        .location_json
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;
    let schedule: Vec<ScheduleDay> = serde_json::from_str(&row.schedule_json)?;
    let max_participants: Option<u32> = row
        .max_participants
        .map(|v| {
            v.to_u32().ok_or_else(|| {
                PersistenceError::corrupt("activities", format!("capacity out of range: {v}"))
            })
        })
        .transpose()?;
    let registration_threshold: u8 = row.registration_threshold.to_u8().ok_or_else(|| {
        PersistenceError::corrupt(
            "activities",
            format!("threshold out of range: {}", row.registration_threshold),
        )
    })?;

    let activity: Activity = Activity {
        activity_id: Some(activity_id),
        name: row.name,
        description: row.description,
        activity_type: parse_enum::<ActivityType>("activities", &row.activity_type)?,
        start_date: parse_date(&row.start_date)
            .map_err(|e| PersistenceError::corrupt("activities", e))?,
        end_date: parse_date(&row.end_date)
            .map_err(|e| PersistenceError::corrupt("activities", e))?,
        location_mode: parse_enum::<LocationMode>("activities", &row.location_mode)?,
        location,
        max_participants,
        registration_threshold,
        visibility: parse_enum::<Visibility>("activities", &row.visibility)?,
        status: parse_enum::<ActivityStatus>("activities", &row.status)?,
        responsible_persons,
        schedule,
        participants: participant_list,
        created_by: row.created_by,
    };

    Ok(ActivityRecord {
        activity,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Loads one activity with its participants and attendance.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `activity_id` - The activity to load
///
/// # Errors
///
/// Returns `ActivityNotFound` if no such activity exists, or an error if a
/// stored value cannot be decoded.
pub fn get_activity(
    conn: &mut SqliteConnection,
    activity_id: i64,
) -> Result<ActivityRecord, PersistenceError> {
    debug!(activity_id, "Loading activity");

    let row: ActivityRow = activities::table
        .filter(activities::activity_id.eq(activity_id))
        .select(ActivityRow::as_select())
        .first(conn)
        .optional()?
        .ok_or(PersistenceError::ActivityNotFound(activity_id))?;

    load_aggregate(conn, row)
}

/// Lists every activity, newest start date first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value cannot be decoded.
pub fn list_activities(conn: &mut SqliteConnection) -> Result<Vec<ActivityRecord>, PersistenceError> {
    let rows: Vec<ActivityRow> = activities::table
        .order((activities::start_date.desc(), activities::activity_id.desc()))
        .select(ActivityRow::as_select())
        .load(conn)?;

    rows.into_iter().map(|row| load_aggregate(conn, row)).collect()
}

/// Lists the activities a user has a participant entry in, whatever its status.
///
/// Used by the slot overlap check, which filters on approval status itself.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value cannot be decoded.
pub fn list_activities_for_participant(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<Activity>, PersistenceError> {
    let rows: Vec<ActivityRow> = activities::table
        .inner_join(participants::table)
        .filter(participants::user_id.eq(user_id))
        .order(activities::activity_id.asc())
        .select(ActivityRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| load_aggregate(conn, row).map(|record| record.activity))
        .collect()
}
