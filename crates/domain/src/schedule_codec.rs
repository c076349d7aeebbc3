// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conversion between structured day plans and persisted schedule text.
//!
//! Each schedule day is stored as one newline-delimited text blob:
//!
//! ```text
//! Buổi Sáng (07:00-11:30) - Dọn dẹp sân - Địa điểm chi tiết: Khu A
//! Buổi Chiều (13:00-17:00) - Văn nghệ
//! Địa điểm chi tiết: Hội trường B
//! Mang theo nước uống
//! ```
//!
//! Slot lines come first, then day-level location lines, then notes.
//! Encoding is strict and can fail; decoding is best effort and never fails.

use crate::error::DomainError;
use crate::slot::{ClockTime, GeoPoint, Location, MapLocation, SlotKind, WeeklySlot};
use crate::types::{DayPlan, LocationMode, PlannedDay, ScheduleDay};
use regex::Regex;
use std::sync::LazyLock;

/// Maximum encoded length of one schedule day, in characters.
pub const MAX_DAY_TEXT_CHARS: usize = 1000;

const SEPARATOR: &str = " - ";
const LOCATION_MARKER: &str = "Địa điểm";
const DETAILED_PREFIX: &str = "Địa điểm chi tiết: ";
const MAP_PREFIX: &str = "Địa điểm map: ";
const RADIUS_PREFIX: &str = "Bán kính: ";
const SAME_ADDRESS: &str = "Cùng địa chỉ";

static SLOT_HEADER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^Buổi (Sáng|Chiều|Tối) \((\d{1,2}:\d{2})\s*-\s*(\d{1,2}:\d{2})\)(.*)$").ok()
});

static MAP_FRAGMENT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^(.*?)(?:\s*\((-?\d+(?:\.\d+)?),\s*(-?\d+(?:\.\d+)?)\))?(?:\s*-\s*Bán kính:\s*(\d+)\s*m)?\s*$",
    )
    .ok()
});

fn encode_map(map: &MapLocation) -> String {
    let mut out: String = map.address.trim().to_string();
    if let Some(point) = map.point {
        out.push_str(&format!(" ({}, {})", point.lat, point.lng));
    }
    if let Some(radius) = map.radius {
        out.push_str(&format!("{SEPARATOR}{RADIUS_PREFIX}{radius}m"));
    }
    out
}

fn has_map(map: &MapLocation) -> bool {
    !map.address.trim().is_empty() || map.point.is_some()
}

/// Encodes one active slot as a single line.
///
/// Slot-level location fragments are written only in per-slot mode.
#[must_use]
pub fn encode_slot_line(slot: &WeeklySlot, mode: LocationMode) -> String {
    let mut parts: Vec<String> = vec![format!(
        "{} ({}-{})",
        slot.kind.display_name(),
        slot.start_time,
        slot.end_time
    )];

    let activities: &str = slot.activities.trim();
    if !activities.is_empty() {
        parts.push(activities.to_string());
    }

    if mode == LocationMode::PerSlot {
        let detailed: &str = slot.detailed_location.trim();
        if !detailed.is_empty() {
            parts.push(format!("{DETAILED_PREFIX}{detailed}"));
        }
        if let Some(map) = slot.map_location.as_ref().filter(|m| has_map(m)) {
            parts.push(format!("{MAP_PREFIX}{}", encode_map(map)));
        }
    }

    parts.join(SEPARATOR)
}

/// Encodes a day plan into its persisted text.
///
/// This does not validate the plan; see [`encode_schedule`].
#[must_use]
pub fn encode_day(plan: &DayPlan, mode: LocationMode) -> String {
    let mut lines: Vec<String> = plan
        .active_slots()
        .map(|slot| encode_slot_line(slot, mode))
        .collect();

    if let Some(location) = plan.location.as_ref().filter(|_| mode == LocationMode::PerDay) {
        let detailed: &str = location.detailed.trim();
        if !detailed.is_empty() {
            if detailed.starts_with(SAME_ADDRESS) {
                lines.push(detailed.to_string());
            } else {
                lines.push(format!("{DETAILED_PREFIX}{detailed}"));
            }
        }
        if let Some(map) = location.map.as_ref().filter(|m| has_map(m)) {
            lines.push(format!("{MAP_PREFIX}{}", encode_map(map)));
        }
    }

    let notes: &str = plan.notes.trim();
    if !notes.is_empty() {
        lines.push(notes.to_string());
    }

    lines.join("\n")
}

/// Encodes and validates a whole schedule.
///
/// # Arguments
///
/// * `days` - The structured days, in schedule order
/// * `mode` - The activity's location mode
///
/// # Returns
///
/// One [`ScheduleDay`] per input day carrying both the encoded text and the
/// plan it was encoded from.
///
/// # Errors
///
/// Returns an error if:
/// - An active slot ends at or before its start time
/// - A day has no active slot
/// - One or more days encode to more than [`MAX_DAY_TEXT_CHARS`] characters.
///   The error lists every offending day.
pub fn encode_schedule(
    days: &[PlannedDay],
    mode: LocationMode,
) -> Result<Vec<ScheduleDay>, DomainError> {
    let mut encoded: Vec<ScheduleDay> = Vec::with_capacity(days.len());
    let mut too_long: Vec<u32> = Vec::new();

    for planned in days {
        let mut active: usize = 0;
        for slot in planned.plan.active_slots() {
            active += 1;
            if slot.end_time <= slot.start_time {
                return Err(DomainError::InvalidTimeRange {
                    day: planned.day,
                    slot: slot.kind,
                    start: slot.start_time,
                    end: slot.end_time,
                });
            }
        }
        if active == 0 {
            return Err(DomainError::NoActiveSlot { day: planned.day });
        }

        let text: String = encode_day(&planned.plan, mode);
        if text.chars().count() > MAX_DAY_TEXT_CHARS {
            too_long.push(planned.day);
        }

        encoded.push(ScheduleDay {
            day: planned.day,
            date: planned.date,
            activities: text,
            plan: Some(planned.plan.clone()),
        });
    }

    if !too_long.is_empty() {
        return Err(DomainError::ScheduleTooLong {
            days: too_long,
            max: MAX_DAY_TEXT_CHARS,
        });
    }

    Ok(encoded)
}

/// Rebuilds persisted schedule days into canonical form.
///
/// Days that carry a plan are re-encoded from it. Days that carry only text
/// are decoded first, so hand-written text is normalized on save.
///
/// # Errors
///
/// Returns the same errors as [`encode_schedule`].
pub fn canonicalize_schedule(
    days: &[ScheduleDay],
    mode: LocationMode,
) -> Result<Vec<ScheduleDay>, DomainError> {
    let planned: Vec<PlannedDay> = days
        .iter()
        .map(|day| PlannedDay {
            day: day.day,
            date: day.date,
            plan: day.resolved_plan(),
        })
        .collect();
    encode_schedule(&planned, mode)
}

fn parse_map(fragment: &str) -> Option<MapLocation> {
    let captures = MAP_FRAGMENT.as_ref()?.captures(fragment.trim())?;

    let address: String = captures
        .get(1)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    let lat: Option<f64> = captures.get(2).and_then(|m| m.as_str().parse().ok());
    let lng: Option<f64> = captures.get(3).and_then(|m| m.as_str().parse().ok());
    let point: Option<GeoPoint> = lat.zip(lng).map(|(lat, lng)| GeoPoint { lat, lng });
    let radius: Option<u32> = captures.get(4).and_then(|m| m.as_str().parse().ok());

    if address.is_empty() && point.is_none() {
        return None;
    }
    Some(MapLocation {
        address,
        point,
        radius,
    })
}

/// Splits the part of a slot line after the time range.
///
/// The activities segment ends at the first `" - Địa điểm"` fragment, so
/// activities text may contain plain hyphens.
fn decode_slot_remainder(rest: &str, slot: &mut WeeklySlot) {
    let detailed_marker: String = format!("{SEPARATOR}{DETAILED_PREFIX}");
    let map_marker: String = format!("{SEPARATOR}{MAP_PREFIX}");
    let detailed_at: Option<usize> = rest.find(&detailed_marker);
    let map_at: Option<usize> = rest.find(&map_marker);

    let activities_end: usize = [detailed_at, map_at]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(rest.len());
    let activities: &str = rest[..activities_end].trim();
    let activities: &str = activities.strip_prefix('-').unwrap_or(activities).trim();
    slot.activities = activities.to_string();

    if let Some(start) = detailed_at {
        let from: usize = start + detailed_marker.len();
        let to: usize = map_at.filter(|m| *m > start).unwrap_or(rest.len());
        slot.detailed_location = rest[from..to].trim().to_string();
    }

    if let Some(start) = map_at {
        let from: usize = start + map_marker.len();
        let to: usize = detailed_at.filter(|d| *d > start).unwrap_or(rest.len());
        slot.map_location = parse_map(&rest[from..to]);
    }
}

fn decode_slot_line(line: &str, plan: &mut DayPlan) -> bool {
    let Some(captures) = SLOT_HEADER.as_ref().and_then(|re| re.captures(line)) else {
        return false;
    };
    let Some(kind) = captures.get(1).and_then(|m| SlotKind::from_label(m.as_str())) else {
        return false;
    };
    let Some(slot) = plan.slot_mut(kind) else {
        return false;
    };

    slot.is_active = true;
    let start: Option<ClockTime> = captures
        .get(2)
        .and_then(|m| ClockTime::parse(m.as_str()).ok());
    let end: Option<ClockTime> = captures
        .get(3)
        .and_then(|m| ClockTime::parse(m.as_str()).ok());
    if let Some(start) = start {
        slot.start_time = start;
    }
    if let Some(end) = end {
        slot.end_time = end;
    }
    if let Some(rest) = captures.get(4) {
        decode_slot_remainder(rest.as_str(), slot);
    }
    true
}

/// Reconstructs a day plan from persisted text.
///
/// Unrecognized lines become notes. Lines that look like slot headers but
/// fail to parse leave the affected fields at their defaults. Never fails.
#[must_use]
pub fn decode_day(text: &str) -> DayPlan {
    let mut plan: DayPlan = DayPlan::default();
    let mut notes: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if decode_slot_line(line, &mut plan) {
            continue;
        }

        if let Some(detailed) = line.strip_prefix(DETAILED_PREFIX) {
            plan.location.get_or_insert_with(Location::default).detailed = detailed.trim().to_string();
        } else if let Some(map) = line.strip_prefix(MAP_PREFIX) {
            plan.location.get_or_insert_with(Location::default).map = parse_map(map);
        } else if line.starts_with(SAME_ADDRESS) || line.starts_with(LOCATION_MARKER) {
            plan.location.get_or_insert_with(Location::default).detailed = line.to_string();
        } else {
            notes.push(line);
        }
    }

    plan.notes = notes.join("\n");
    plan
}

/// Guesses the location mode that produced a set of persisted days.
#[must_use]
pub fn infer_location_mode(days: &[ScheduleDay]) -> LocationMode {
    let plans: Vec<DayPlan> = days.iter().map(ScheduleDay::resolved_plan).collect();

    let per_slot: bool = plans.iter().any(|plan| {
        plan.active_slots()
            .any(|s| !s.detailed_location.is_empty() || s.map_location.is_some())
    });
    if per_slot {
        return LocationMode::PerSlot;
    }

    if plans
        .iter()
        .any(|plan| plan.location.as_ref().is_some_and(|l| !l.is_empty()))
    {
        return LocationMode::PerDay;
    }

    LocationMode::Global
}

impl ScheduleDay {
    /// Returns the structured plan, decoding the text when no plan was stored.
    #[must_use]
    pub fn resolved_plan(&self) -> DayPlan {
        self.plan
            .clone()
            .map_or_else(|| decode_day(&self.activities), DayPlan::normalized)
    }
}
