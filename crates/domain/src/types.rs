// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::slot::{DaySlot, Location, SlotKind, WeeklySlot};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// Default registration threshold in percent.
pub const DEFAULT_REGISTRATION_THRESHOLD: u8 = 80;

/// Generates `as_str`, `FromStr` and `Display` for a fieldless enum whose
/// persisted form is a fixed string per variant.
macro_rules! string_enum {
    ($ty:ident, $err:ident, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Converts this value to its persisted string representation.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(DomainError::$err(s.to_string())),
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

/// Lifecycle state of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    /// Initial state after creation. Visible to admins only.
    #[default]
    Draft,
    /// Open for registration.
    Published,
    /// Running; registration closed.
    Ongoing,
    /// Finished.
    Completed,
    /// Called off.
    Cancelled,
    /// Delayed until further notice.
    Postponed,
}

string_enum!(ActivityStatus, InvalidStatus, {
    Draft => "draft",
    Published => "published",
    Ongoing => "ongoing",
    Completed => "completed",
    Cancelled => "cancelled",
    Postponed => "postponed",
});

impl ActivityStatus {
    /// Checks if a transition from this state to another is valid.
    ///
    /// Valid transitions are:
    /// - Draft → Published, Cancelled
    /// - Published → Draft, Ongoing, Postponed, Cancelled
    /// - Ongoing → Completed, Postponed, Cancelled
    /// - Postponed → Published, Cancelled
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::Published | Self::Cancelled)
                | (
                    Self::Published,
                    Self::Draft | Self::Ongoing | Self::Postponed | Self::Cancelled
                )
                | (
                    Self::Ongoing,
                    Self::Completed | Self::Postponed | Self::Cancelled
                )
                | (Self::Postponed, Self::Published | Self::Cancelled)
        )
    }

    /// Returns whether participants may register or change slots.
    #[must_use]
    pub const fn accepts_registrations(&self) -> bool {
        matches!(self, Self::Published)
    }

    /// Returns whether the activity details may still be edited.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        !matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns whether attendance may be taken.
    #[must_use]
    pub const fn records_attendance(&self) -> bool {
        matches!(self, Self::Published | Self::Ongoing | Self::Completed)
    }

    /// Returns whether registrations in this activity can collide with others.
    #[must_use]
    pub const fn holds_slots(&self) -> bool {
        !matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Whether an activity spans one day or several scheduled days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    #[default]
    SingleDay,
    MultipleDays,
}

string_enum!(ActivityType, InvalidActivityType, {
    SingleDay => "single_day",
    MultipleDays => "multiple_days",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

string_enum!(Visibility, InvalidVisibility, {
    Public => "public",
    Private => "private",
});

/// Where schedule locations are declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LocationMode {
    /// One location on the activity itself.
    #[default]
    #[serde(rename = "global")]
    Global,
    /// One location line per schedule day.
    #[serde(rename = "perDay")]
    PerDay,
    /// Locations attached to individual slots.
    #[serde(rename = "perSlot")]
    PerSlot,
}

string_enum!(LocationMode, InvalidLocationMode, {
    Global => "global",
    PerDay => "perDay",
    PerSlot => "perSlot",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Leader,
    Deputy,
    #[default]
    Member,
}

string_enum!(ParticipantRole, InvalidParticipantRole, {
    Leader => "leader",
    Deputy => "deputy",
    Member => "member",
});

/// Approval state of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Removed,
}

string_enum!(ApprovalStatus, InvalidApprovalStatus, {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Removed => "removed",
});

impl ApprovalStatus {
    /// Pending and approved participants occupy capacity; rejected and
    /// removed ones do not.
    #[must_use]
    pub const fn counts_toward_capacity(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    Excused,
}

string_enum!(AttendanceStatus, InvalidAttendanceStatus, {
    Present => "present",
    Late => "late",
    Absent => "absent",
    Excused => "excused",
});

impl AttendanceStatus {
    /// Present and late both count as attended.
    #[must_use]
    pub const fn attended(&self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }
}

/// Account role of a user of the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Creates and edits activities; full authority.
    Admin,
    /// Manages participants and attendance.
    Officer,
    /// Browses activities and registers for slots.
    #[default]
    Student,
}

string_enum!(UserRole, InvalidUserRole, {
    Admin => "admin",
    Officer => "officer",
    Student => "student",
});

impl UserRole {
    /// Admins and officers may be listed as responsible persons.
    #[must_use]
    pub const fn can_be_responsible(&self) -> bool {
        matches!(self, Self::Admin | Self::Officer)
    }
}

/// A member account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// `None` until persisted.
    pub user_id: Option<i64>,
    pub login_name: String,
    pub display_name: String,
    pub email: String,
    pub role: UserRole,
    pub student_code: Option<String>,
    pub class_name: Option<String>,
}

/// The editable state of one schedule day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Always the three slots in `SlotKind::ALL` order.
    pub slots: Vec<WeeklySlot>,
    /// Day-level location, written in per-day location mode.
    #[serde(default)]
    pub location: Option<Location>,
    /// Free-text notes, written last.
    #[serde(default)]
    pub notes: String,
}

impl Default for DayPlan {
    fn default() -> Self {
        Self {
            slots: WeeklySlot::default_day(),
            location: None,
            notes: String::new(),
        }
    }
}

impl DayPlan {
    /// Returns the slot of the given kind.
    #[must_use]
    pub fn slot(&self, kind: SlotKind) -> Option<&WeeklySlot> {
        self.slots.iter().find(|s| s.kind == kind)
    }

    /// Returns the slot of the given kind, mutably.
    pub fn slot_mut(&mut self, kind: SlotKind) -> Option<&mut WeeklySlot> {
        self.slots.iter_mut().find(|s| s.kind == kind)
    }

    /// Returns the active slots in schedule order.
    pub fn active_slots(&self) -> impl Iterator<Item = &WeeklySlot> {
        self.slots.iter().filter(|s| s.is_active)
    }

    /// Restores the three-slot invariant after deserializing client input.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let mut slots: Vec<WeeklySlot> = Vec::with_capacity(SlotKind::ALL.len());
        for kind in SlotKind::ALL {
            let slot = self
                .slots
                .iter()
                .find(|s| s.kind == kind)
                .cloned()
                .unwrap_or_else(|| WeeklySlot::new(kind));
            slots.push(slot);
        }
        self.slots = slots;
        self
    }
}

/// A structured day plan with its position in the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedDay {
    pub day: u32,
    #[serde(with = "crate::iso_date")]
    pub date: Date,
    pub plan: DayPlan,
}

/// A persisted schedule day.
///
/// `activities` is the encoded text; `plan` is the structure it was encoded
/// from. Entries written by older clients may carry text only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDay {
    /// 1-based day index.
    pub day: u32,
    #[serde(with = "crate::iso_date")]
    pub date: Date,
    #[serde(default)]
    pub activities: String,
    #[serde(default)]
    pub plan: Option<DayPlan>,
}

/// An attendance entry for a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The slot attended; `None` for single-day activities.
    pub day_slot: Option<DaySlot>,
    pub status: AttendanceStatus,
    pub recorded_at: String,
    pub recorded_by: i64,
}

/// A member's participation in an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: ParticipantRole,
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub registered_day_slots: Vec<DaySlot>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    pub joined_at: String,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
}

impl Participant {
    /// Creates a pending member registration.
    #[must_use]
    pub const fn pending(
        user_id: i64,
        name: String,
        email: String,
        registered_day_slots: Vec<DaySlot>,
        joined_at: String,
    ) -> Self {
        Self {
            user_id,
            name,
            email,
            role: ParticipantRole::Member,
            approval_status: ApprovalStatus::Pending,
            registered_day_slots,
            rejection_reason: None,
            joined_at,
            attendance: Vec::new(),
        }
    }

    /// Returns true if the participant holds the given slot.
    #[must_use]
    pub fn holds(&self, day_slot: DaySlot) -> bool {
        self.registered_day_slots.contains(&day_slot)
    }
}

/// The editable fields of an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub activity_type: ActivityType,
    #[serde(with = "crate::iso_date")]
    pub start_date: Date,
    #[serde(with = "crate::iso_date")]
    pub end_date: Date,
    #[serde(default)]
    pub location_mode: LocationMode,
    #[serde(default)]
    pub location: Option<Location>,
    /// `None` or zero means no limit.
    #[serde(default)]
    pub max_participants: Option<u32>,
    pub registration_threshold: u8,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub responsible_persons: Vec<i64>,
    #[serde(default)]
    pub schedule: Vec<ScheduleDay>,
}

/// A club activity with its schedule and participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// `None` until persisted.
    pub activity_id: Option<i64>,
    pub name: String,
    pub description: String,
    pub activity_type: ActivityType,
    #[serde(with = "crate::iso_date")]
    pub start_date: Date,
    #[serde(with = "crate::iso_date")]
    pub end_date: Date,
    pub location_mode: LocationMode,
    pub location: Option<Location>,
    pub max_participants: Option<u32>,
    pub registration_threshold: u8,
    pub visibility: Visibility,
    pub status: ActivityStatus,
    pub responsible_persons: Vec<i64>,
    pub schedule: Vec<ScheduleDay>,
    pub participants: Vec<Participant>,
    pub created_by: Option<i64>,
}

impl Activity {
    /// Creates a new draft activity from its editable fields.
    #[must_use]
    pub fn from_draft(draft: ActivityDraft, created_by: Option<i64>) -> Self {
        Self {
            activity_id: None,
            name: draft.name,
            description: draft.description,
            activity_type: draft.activity_type,
            start_date: draft.start_date,
            end_date: draft.end_date,
            location_mode: draft.location_mode,
            location: draft.location,
            max_participants: draft.max_participants,
            registration_threshold: draft.registration_threshold,
            visibility: draft.visibility,
            status: ActivityStatus::Draft,
            responsible_persons: draft.responsible_persons,
            schedule: draft.schedule,
            participants: Vec::new(),
            created_by,
        }
    }

    /// Replaces the editable fields, keeping identity, status and participants.
    pub fn apply_draft(&mut self, draft: ActivityDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.activity_type = draft.activity_type;
        self.start_date = draft.start_date;
        self.end_date = draft.end_date;
        self.location_mode = draft.location_mode;
        self.location = draft.location;
        self.max_participants = draft.max_participants;
        self.registration_threshold = draft.registration_threshold;
        self.visibility = draft.visibility;
        self.responsible_persons = draft.responsible_persons;
        self.schedule = draft.schedule;
    }

    /// Returns the editable fields of this activity.
    #[must_use]
    pub fn to_draft(&self) -> ActivityDraft {
        ActivityDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            activity_type: self.activity_type,
            start_date: self.start_date,
            end_date: self.end_date,
            location_mode: self.location_mode,
            location: self.location.clone(),
            max_participants: self.max_participants,
            registration_threshold: self.registration_threshold,
            visibility: self.visibility,
            responsible_persons: self.responsible_persons.clone(),
            schedule: self.schedule.clone(),
        }
    }

    #[must_use]
    pub fn is_multi_day(&self) -> bool {
        self.activity_type == ActivityType::MultipleDays
    }

    /// Returns the participant entry for a user.
    #[must_use]
    pub fn participant(&self, user_id: i64) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    /// Returns the participant entry for a user, mutably.
    pub fn participant_mut(&mut self, user_id: i64) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.user_id == user_id)
    }

    /// Returns the schedule entry for a day index.
    #[must_use]
    pub fn schedule_day(&self, day: u32) -> Option<&ScheduleDay> {
        self.schedule.iter().find(|d| d.day == day)
    }

    /// Returns every `(day, active slot)` pair of the schedule.
    #[must_use]
    pub fn available_day_slots(&self) -> Vec<DaySlot> {
        self.schedule
            .iter()
            .flat_map(|day| {
                day.resolved_plan()
                    .active_slots()
                    .map(|slot| DaySlot::new(day.day, slot.kind))
                    .collect::<Vec<DaySlot>>()
            })
            .collect()
    }

    /// Returns whether the user is listed as responsible for this activity.
    #[must_use]
    pub fn is_responsible(&self, user_id: i64) -> bool {
        self.responsible_persons.contains(&user_id)
    }
}
