// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registration admission rules.
//!
//! An activity (or, for multi-day activities, a single `{day, slot}`) accepts
//! new registrations while its registration rate is below the configured
//! threshold. The rate is the share of capacity taken by pending and approved
//! participants. A participant changing their slot set must also select at
//! least `threshold` percent of the available slots.

use crate::error::DomainError;
use crate::slot::DaySlot;
use crate::types::{Activity, Participant};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Computes the registration rate in percent, rounded half up.
///
/// A capacity of `None` or zero means no limit and always yields 0.
#[must_use]
pub fn registration_rate(registered: usize, capacity: Option<u32>) -> u32 {
    let Some(capacity) = capacity.filter(|c| *c > 0) else {
        return 0;
    };
    let registered: u64 = u64::try_from(registered).unwrap_or(u64::MAX);
    let capacity: u64 = u64::from(capacity);
    let rate: u64 = registered.saturating_mul(200).saturating_add(capacity) / (2 * capacity);
    u32::try_from(rate).unwrap_or(u32::MAX)
}

/// Returns whether another registration is admitted.
///
/// Unlimited capacity always admits.
#[must_use]
pub fn can_register(registered: usize, capacity: Option<u32>, threshold: u8) -> bool {
    if capacity.is_none_or(|c| c == 0) {
        return true;
    }
    registration_rate(registered, capacity) < u32::from(threshold)
}

/// Counts pending and approved participants.
///
/// # Arguments
///
/// * `participants` - The activity's participants
/// * `day_slot` - Restrict the count to holders of this slot, or count all
/// * `exclude_user` - A participant to leave out of the count
#[must_use]
pub fn count_registered(
    participants: &[Participant],
    day_slot: Option<DaySlot>,
    exclude_user: Option<i64>,
) -> usize {
    participants
        .iter()
        .filter(|p| p.approval_status.counts_toward_capacity())
        .filter(|p| Some(p.user_id) != exclude_user)
        .filter(|p| day_slot.is_none_or(|ds| p.holds(ds)))
        .count()
}

/// Registration figures for an activity or one of its slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationStatus {
    pub day_slot: Option<DaySlot>,
    pub registered: usize,
    pub capacity: Option<u32>,
    pub rate: u32,
    pub threshold: u8,
    pub can_register: bool,
}

/// Computes the registration figures for an activity or one slot of it.
#[must_use]
pub fn registration_status(
    activity: &Activity,
    day_slot: Option<DaySlot>,
    exclude_user: Option<i64>,
) -> RegistrationStatus {
    let registered: usize = count_registered(&activity.participants, day_slot, exclude_user);
    let capacity: Option<u32> = activity.max_participants.filter(|c| *c > 0);
    RegistrationStatus {
        day_slot,
        registered,
        capacity,
        rate: registration_rate(registered, capacity),
        threshold: activity.registration_threshold,
        can_register: can_register(registered, capacity, activity.registration_threshold),
    }
}

/// Returns whether `selected` of `available` slots reaches `threshold` percent.
#[must_use]
pub fn selection_meets_threshold(selected: usize, available: usize, threshold: u8) -> bool {
    selected.saturating_mul(100) >= usize::from(threshold).saturating_mul(available)
}

/// Checks that a user may join an activity as a whole.
///
/// # Errors
///
/// Returns `SlotFull` with no slot when the activity's rate has reached its
/// threshold.
pub fn check_activity_admission(activity: &Activity, user_id: i64) -> Result<(), DomainError> {
    let status: RegistrationStatus = registration_status(activity, None, Some(user_id));
    if !status.can_register {
        return Err(DomainError::SlotFull {
            day_slot: None,
            rate: status.rate,
            threshold: status.threshold,
        });
    }
    Ok(())
}

/// Validates a participant's requested slot set for a multi-day activity.
///
/// # Arguments
///
/// * `activity` - The activity being registered for
/// * `user_id` - The participant whose selection is evaluated
/// * `selection` - The complete requested slot set
///
/// # Returns
///
/// The selection, sorted by day then slot.
///
/// # Errors
///
/// Returns an error if:
/// - The schedule has no active slot at all
/// - A selected day is missing from the schedule
/// - A selected slot is not active on its day
/// - A slot is selected twice
/// - Fewer than `threshold` percent of the available slots are selected
/// - A slot the participant does not already hold has reached its threshold
pub fn validate_slot_selection(
    activity: &Activity,
    user_id: i64,
    selection: &[DaySlot],
) -> Result<Vec<DaySlot>, DomainError> {
    let available: Vec<DaySlot> = activity.available_day_slots();
    if available.is_empty() {
        return Err(DomainError::NoSlotsAvailable);
    }

    let mut seen: BTreeSet<DaySlot> = BTreeSet::new();
    for day_slot in selection {
        if activity.schedule_day(day_slot.day).is_none() {
            return Err(DomainError::DayNotInSchedule { day: day_slot.day });
        }
        if !available.contains(day_slot) {
            return Err(DomainError::SlotNotActive(*day_slot));
        }
        if !seen.insert(*day_slot) {
            return Err(DomainError::DuplicateSlot(*day_slot));
        }
    }

    // Rule: the selection must cover at least threshold% of available slots
    if !selection_meets_threshold(seen.len(), available.len(), activity.registration_threshold) {
        return Err(DomainError::ThresholdNotMet {
            selected: seen.len(),
            available: available.len(),
            threshold: activity.registration_threshold,
        });
    }

    // Rule: slots already held are never rejected as full
    let held: Vec<DaySlot> = activity
        .participant(user_id)
        .filter(|p| p.approval_status.counts_toward_capacity())
        .map(|p| p.registered_day_slots.clone())
        .unwrap_or_default();
    for day_slot in seen.iter().filter(|ds| !held.contains(ds)) {
        let status: RegistrationStatus = registration_status(activity, Some(*day_slot), Some(user_id));
        if !status.can_register {
            return Err(DomainError::SlotFull {
                day_slot: Some(*day_slot),
                rate: status.rate,
                threshold: status.threshold,
            });
        }
    }

    Ok(seen.into_iter().collect())
}
