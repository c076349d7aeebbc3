// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Time slots within a schedule day.
//!
//! Every schedule day has exactly three slots (morning, afternoon, evening).
//! A slot only contributes to the persisted schedule when it is active.

use crate::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use time::Time;

/// One of the three fixed slots of a schedule day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// Morning slot (`id` "1").
    #[serde(alias = "1")]
    Morning,
    /// Afternoon slot (`id` "2").
    #[serde(alias = "2")]
    Afternoon,
    /// Evening slot (`id` "3").
    #[serde(alias = "3")]
    Evening,
}

impl SlotKind {
    /// All slots in schedule order.
    pub const ALL: [Self; 3] = [Self::Morning, Self::Afternoon, Self::Evening];

    /// Returns the short slot id used by clients ("1", "2", "3").
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Morning => "1",
            Self::Afternoon => "2",
            Self::Evening => "3",
        }
    }

    /// Returns the slot label as it appears after "Buổi " in schedule text.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Morning => "Sáng",
            Self::Afternoon => "Chiều",
            Self::Evening => "Tối",
        }
    }

    /// Returns the full display name, e.g. "Buổi Sáng".
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("Buổi {}", self.label())
    }

    /// Looks up a slot by its schedule-text label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }

    /// Returns the machine name ("morning", "afternoon", "evening").
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }

    /// Default time range offered when a slot is first activated.
    #[must_use]
    pub const fn default_times(&self) -> (ClockTime, ClockTime) {
        match self {
            Self::Morning => (ClockTime::from_hm_unchecked(7, 0), ClockTime::from_hm_unchecked(11, 30)),
            Self::Afternoon => (
                ClockTime::from_hm_unchecked(13, 0),
                ClockTime::from_hm_unchecked(17, 0),
            ),
            Self::Evening => (ClockTime::from_hm_unchecked(18, 0), ClockTime::from_hm_unchecked(21, 0)),
        }
    }
}

impl FromStr for SlotKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" | "1" => Ok(Self::Morning),
            "afternoon" | "2" => Ok(Self::Afternoon),
            "evening" | "3" => Ok(Self::Evening),
            _ => Err(DomainError::InvalidSlot(s.to_string())),
        }
    }
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A wall-clock time with minute precision, written as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime(Time);

impl ClockTime {
    /// Creates a clock time from hour and minute.
    ///
    /// # Errors
    ///
    /// Returns an error if the hour or minute is out of range.
    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, DomainError> {
        Time::from_hms(hour, minute, 0)
            .map(Self)
            .map_err(|e| DomainError::InvalidTime(format!("{hour:02}:{minute:02}: {e}")))
    }

    /// Builds a constant clock time. Out-of-range values fall back to midnight.
    const fn from_hm_unchecked(hour: u8, minute: u8) -> Self {
        match Time::from_hms(hour, minute, 0) {
            Ok(t) => Self(t),
            Err(_) => Self(Time::MIDNIGHT),
        }
    }

    /// Parses `H:MM` or `HH:MM`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid 24-hour time.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidTime(value.to_string());
        let (hour, minute) = value.trim().split_once(':').ok_or_else(invalid)?;
        if minute.len() != 2 || hour.is_empty() || hour.len() > 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute)
    }

    /// Returns the hour component.
    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.0.hour()
    }

    /// Returns the minute component.
    #[must_use]
    pub const fn minute(&self) -> u8 {
        self.0.minute()
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: String = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A geocoded location picked on a map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapLocation {
    /// Human-readable address.
    pub address: String,
    /// Coordinates, when the address was geocoded.
    #[serde(default)]
    pub point: Option<GeoPoint>,
    /// Check-in radius in metres.
    #[serde(default)]
    pub radius: Option<u32>,
}

/// A location: free-text details plus an optional map pin.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub detailed: String,
    #[serde(default)]
    pub map: Option<MapLocation>,
}

impl Location {
    /// Returns true when neither the details nor the map pin carry anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.detailed.trim().is_empty() && self.map.is_none()
    }
}

/// The editable state of one slot on one schedule day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySlot {
    pub kind: SlotKind,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    #[serde(default)]
    pub is_active: bool,
    /// Free-text description of what happens in this slot.
    #[serde(default)]
    pub activities: String,
    /// Slot-level location text, written only in per-slot location mode.
    #[serde(default)]
    pub detailed_location: String,
    #[serde(default)]
    pub map_location: Option<MapLocation>,
}

impl WeeklySlot {
    /// Creates an inactive slot with the default time range.
    #[must_use]
    pub const fn new(kind: SlotKind) -> Self {
        let (start_time, end_time) = kind.default_times();
        Self {
            kind,
            start_time,
            end_time,
            is_active: false,
            activities: String::new(),
            detailed_location: String::new(),
            map_location: None,
        }
    }

    /// Returns the three default (inactive) slots of a day.
    #[must_use]
    pub fn default_day() -> Vec<Self> {
        SlotKind::ALL.into_iter().map(Self::new).collect()
    }

    /// Returns true when the slot's time range overlaps `[start, end)`.
    #[must_use]
    pub fn overlaps(&self, start: ClockTime, end: ClockTime) -> bool {
        self.start_time < end && start < self.end_time
    }
}

/// A `{day, slot}` reference into an activity's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DaySlot {
    /// 1-based schedule day index.
    pub day: u32,
    pub slot: SlotKind,
}

impl DaySlot {
    #[must_use]
    pub const fn new(day: u32, slot: SlotKind) -> Self {
        Self { day, slot }
    }
}

impl std::fmt::Display for DaySlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "day {} {}", self.day, self.slot)
    }
}
