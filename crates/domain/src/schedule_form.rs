// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Editable schedule state.
//!
//! A [`ScheduleForm`] is an immutable value. Every edit goes through
//! [`ScheduleForm::apply`], which returns the next form or an error and never
//! leaves a partially edited form behind.

use crate::error::DomainError;
use crate::schedule_codec::encode_schedule;
use crate::slot::{ClockTime, Location, MapLocation, SlotKind, WeeklySlot};
use crate::types::{DayPlan, LocationMode, PlannedDay, ScheduleDay};
use time::{Date, Duration};

/// An edit to a [`ScheduleForm`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleFormAction {
    SetLocationMode(LocationMode),
    /// Appends a day with the given date and default (inactive) slots.
    AddDay { date: Date },
    /// Removes a day and renumbers the days after it.
    RemoveDay { day: u32 },
    SetDayDate { day: u32, date: Date },
    ToggleSlot { day: u32, slot: SlotKind },
    SetSlotTimes {
        day: u32,
        slot: SlotKind,
        start: ClockTime,
        end: ClockTime,
    },
    SetSlotActivities {
        day: u32,
        slot: SlotKind,
        activities: String,
    },
    SetSlotLocation {
        day: u32,
        slot: SlotKind,
        detailed: String,
        map: Option<MapLocation>,
    },
    SetDayLocation { day: u32, location: Option<Location> },
    SetDayNotes { day: u32, notes: String },
    /// Copies one day's plan onto every other day, keeping their dates.
    CopyDayToAll { day: u32 },
}

/// The structured schedule being edited.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScheduleForm {
    pub location_mode: LocationMode,
    pub days: Vec<PlannedDay>,
}

impl ScheduleForm {
    #[must_use]
    pub const fn new(location_mode: LocationMode) -> Self {
        Self {
            location_mode,
            days: Vec::new(),
        }
    }

    /// Creates one empty day per date from `start` to `end` inclusive.
    #[must_use]
    pub fn for_date_range(location_mode: LocationMode, start: Date, end: Date) -> Self {
        let mut days: Vec<PlannedDay> = Vec::new();
        let mut date: Date = start;
        let mut index: u32 = 1;
        while date <= end {
            days.push(PlannedDay {
                day: index,
                date,
                plan: DayPlan::default(),
            });
            index += 1;
            match date.checked_add(Duration::days(1)) {
                Some(next) => date = next,
                None => break,
            }
        }
        Self {
            location_mode,
            days,
        }
    }

    /// Rebuilds form state from a persisted schedule.
    #[must_use]
    pub fn from_schedule(location_mode: LocationMode, schedule: &[ScheduleDay]) -> Self {
        let days: Vec<PlannedDay> = schedule
            .iter()
            .map(|day| PlannedDay {
                day: day.day,
                date: day.date,
                plan: day.resolved_plan(),
            })
            .collect();
        Self {
            location_mode,
            days,
        }
    }

    fn plan_mut(&mut self, day: u32) -> Result<&mut DayPlan, DomainError> {
        self.days
            .iter_mut()
            .find(|d| d.day == day)
            .map(|d| &mut d.plan)
            .ok_or(DomainError::DayNotInSchedule { day })
    }

    fn slot_mut(&mut self, day: u32, slot: SlotKind) -> Result<&mut WeeklySlot, DomainError> {
        self.plan_mut(day)?
            .slot_mut(slot)
            .ok_or_else(|| DomainError::InvalidSlot(slot.to_string()))
    }

    /// Applies an edit and returns the resulting form.
    ///
    /// # Errors
    ///
    /// Returns an error if the action references a day that is not in the
    /// form, or if slot times are not increasing.
    pub fn apply(mut self, action: ScheduleFormAction) -> Result<Self, DomainError> {
        match action {
            ScheduleFormAction::SetLocationMode(mode) => {
                self.location_mode = mode;
            }
            ScheduleFormAction::AddDay { date } => {
                let day: u32 = u32::try_from(self.days.len()).unwrap_or(u32::MAX - 1) + 1;
                self.days.push(PlannedDay {
                    day,
                    date,
                    plan: DayPlan::default(),
                });
            }
            ScheduleFormAction::RemoveDay { day } => {
                let before: usize = self.days.len();
                self.days.retain(|d| d.day != day);
                if self.days.len() == before {
                    return Err(DomainError::DayNotInSchedule { day });
                }
                for (index, planned) in (1u32..).zip(self.days.iter_mut()) {
                    planned.day = index;
                }
            }
            ScheduleFormAction::SetDayDate { day, date } => {
                let planned: &mut PlannedDay = self
                    .days
                    .iter_mut()
                    .find(|d| d.day == day)
                    .ok_or(DomainError::DayNotInSchedule { day })?;
                planned.date = date;
            }
            ScheduleFormAction::ToggleSlot { day, slot } => {
                let weekly: &mut WeeklySlot = self.slot_mut(day, slot)?;
                weekly.is_active = !weekly.is_active;
            }
            ScheduleFormAction::SetSlotTimes {
                day,
                slot,
                start,
                end,
            } => {
                if end <= start {
                    return Err(DomainError::InvalidTimeRange {
                        day,
                        slot,
                        start,
                        end,
                    });
                }
                let weekly: &mut WeeklySlot = self.slot_mut(day, slot)?;
                weekly.start_time = start;
                weekly.end_time = end;
            }
            ScheduleFormAction::SetSlotActivities {
                day,
                slot,
                activities,
            } => {
                self.slot_mut(day, slot)?.activities = activities;
            }
            ScheduleFormAction::SetSlotLocation {
                day,
                slot,
                detailed,
                map,
            } => {
                let weekly: &mut WeeklySlot = self.slot_mut(day, slot)?;
                weekly.detailed_location = detailed;
                weekly.map_location = map;
            }
            ScheduleFormAction::SetDayLocation { day, location } => {
                self.plan_mut(day)?.location = location.filter(|l| !l.is_empty());
            }
            ScheduleFormAction::SetDayNotes { day, notes } => {
                self.plan_mut(day)?.notes = notes;
            }
            ScheduleFormAction::CopyDayToAll { day } => {
                let source: DayPlan = self
                    .days
                    .iter()
                    .find(|d| d.day == day)
                    .map(|d| d.plan.clone())
                    .ok_or(DomainError::DayNotInSchedule { day })?;
                for planned in self.days.iter_mut().filter(|d| d.day != day) {
                    planned.plan = source.clone();
                }
            }
        }
        Ok(self)
    }

    /// Encodes the form into persisted schedule days.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`encode_schedule`].
    pub fn encode(&self) -> Result<Vec<ScheduleDay>, DomainError> {
        encode_schedule(&self.days, self.location_mode)
    }
}
