// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Detection of a participant's slot selections that collide across activities.

use crate::error::DomainError;
use crate::slot::{ClockTime, DaySlot, SlotKind};
use crate::types::Activity;
use serde::{Deserialize, Serialize};
use time::Date;

/// A registered slot in another activity that collides with a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotConflict {
    pub activity_id: i64,
    pub activity_name: String,
    pub day: u32,
    pub slot: SlotKind,
    #[serde(with = "crate::iso_date")]
    pub date: Date,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

/// A `{day, slot}` pinned to its calendar date and time range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledSlot {
    pub day_slot: DaySlot,
    pub date: Date,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl ScheduledSlot {
    /// Two slots collide when they share a date and their time ranges intersect.
    #[must_use]
    pub fn collides_with(&self, other: &Self) -> bool {
        self.date == other.date && self.start_time < other.end_time && other.start_time < self.end_time
    }
}

/// Resolves a `{day, slot}` reference against an activity's schedule.
///
/// # Errors
///
/// Returns an error if the day is not in the schedule or the slot is not
/// active on that day.
pub fn resolve_day_slot(activity: &Activity, day_slot: DaySlot) -> Result<ScheduledSlot, DomainError> {
    let day = activity
        .schedule_day(day_slot.day)
        .ok_or(DomainError::DayNotInSchedule { day: day_slot.day })?;
    let plan = day.resolved_plan();
    let slot = plan
        .slot(day_slot.slot)
        .filter(|s| s.is_active)
        .ok_or(DomainError::SlotNotActive(day_slot))?;

    Ok(ScheduledSlot {
        day_slot,
        date: day.date,
        start_time: slot.start_time,
        end_time: slot.end_time,
    })
}

/// Returns the slots a user currently holds in an activity.
///
/// Only pending or approved registrations in activities that are neither
/// cancelled nor completed hold slots. References that
/// no longer resolve against the schedule are skipped.
#[must_use]
pub fn held_slots(activity: &Activity, user_id: i64) -> Vec<ScheduledSlot> {
    if !activity.status.holds_slots() {
        return Vec::new();
    }
    let Some(participant) = activity
        .participant(user_id)
        .filter(|p| p.approval_status.counts_toward_capacity())
    else {
        return Vec::new();
    };

    participant
        .registered_day_slots
        .iter()
        .filter_map(|ds| resolve_day_slot(activity, *ds).ok())
        .collect()
}

/// Finds the user's registrations in other activities that collide with one
/// slot of `target`.
///
/// # Arguments
///
/// * `target` - The activity the slot belongs to
/// * `day_slot` - The slot being selected
/// * `user_id` - The participant making the selection
/// * `others` - Candidate activities; `target` itself is skipped if present
///
/// # Errors
///
/// Returns an error if `day_slot` does not resolve against `target`.
pub fn find_slot_overlaps(
    target: &Activity,
    day_slot: DaySlot,
    user_id: i64,
    others: &[Activity],
) -> Result<Vec<SlotConflict>, DomainError> {
    let wanted: ScheduledSlot = resolve_day_slot(target, day_slot)?;
    let mut conflicts: Vec<SlotConflict> = Vec::new();

    for other in others {
        if other.activity_id.is_some() && other.activity_id == target.activity_id {
            continue;
        }
        for held in held_slots(other, user_id) {
            if held.collides_with(&wanted) {
                conflicts.push(SlotConflict {
                    activity_id: other.activity_id.unwrap_or_default(),
                    activity_name: other.name.clone(),
                    day: held.day_slot.day,
                    slot: held.day_slot.slot,
                    date: held.date,
                    start_time: held.start_time,
                    end_time: held.end_time,
                });
            }
        }
    }

    Ok(conflicts)
}

/// Runs [`find_slot_overlaps`] for every slot of a selection.
///
/// A registration held elsewhere is reported once even if it collides with
/// several selected slots.
///
/// # Errors
///
/// Returns an error if any selected slot does not resolve against `target`.
pub fn find_selection_overlaps(
    target: &Activity,
    selection: &[DaySlot],
    user_id: i64,
    others: &[Activity],
) -> Result<Vec<SlotConflict>, DomainError> {
    let mut conflicts: Vec<SlotConflict> = Vec::new();
    for day_slot in selection {
        for conflict in find_slot_overlaps(target, *day_slot, user_id, others)? {
            if !conflicts.contains(&conflict) {
                conflicts.push(conflict);
            }
        }
    }
    Ok(conflicts)
}
