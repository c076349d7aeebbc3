// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_test_schedule, date, time};
use crate::{
    DomainError, Location, LocationMode, ScheduleDay, ScheduleForm, ScheduleFormAction, SlotKind,
};

fn three_day_form() -> ScheduleForm {
    ScheduleForm::for_date_range(LocationMode::PerSlot, date(2), date(4))
}

#[test]
fn test_for_date_range_creates_one_numbered_day_per_date() {
    let form: ScheduleForm = three_day_form();
    let days: Vec<(u32, time::Date)> = form.days.iter().map(|d| (d.day, d.date)).collect();
    assert_eq!(days, vec![(1, date(2)), (2, date(3)), (3, date(4))]);
    assert!(form.days.iter().all(|d| d.plan.active_slots().count() == 0));
}

#[test]
fn test_apply_edits_encode_to_schedule_text() {
    let form: ScheduleForm = ScheduleForm::for_date_range(LocationMode::PerSlot, date(2), date(2))
        .apply(ScheduleFormAction::ToggleSlot {
            day: 1,
            slot: SlotKind::Morning,
        })
        .unwrap()
        .apply(ScheduleFormAction::SetSlotActivities {
            day: 1,
            slot: SlotKind::Morning,
            activities: String::from("Dọn dẹp sân"),
        })
        .unwrap()
        .apply(ScheduleFormAction::SetSlotLocation {
            day: 1,
            slot: SlotKind::Morning,
            detailed: String::from("Khu A"),
            map: None,
        })
        .unwrap();

    let schedule: Vec<ScheduleDay> = form.encode().unwrap();
    assert_eq!(
        schedule[0].activities,
        "Buổi Sáng (07:00-11:30) - Dọn dẹp sân - Địa điểm chi tiết: Khu A"
    );
}

#[test]
fn test_apply_rejects_inverted_slot_times_without_touching_form() {
    let form: ScheduleForm = three_day_form();
    let result: Result<ScheduleForm, DomainError> =
        form.clone().apply(ScheduleFormAction::SetSlotTimes {
            day: 1,
            slot: SlotKind::Evening,
            start: time("21:00"),
            end: time("18:00"),
        });

    assert!(matches!(result, Err(DomainError::InvalidTimeRange { .. })));
    assert_eq!(form, three_day_form());
}

#[test]
fn test_apply_rejects_unknown_day() {
    let result: Result<ScheduleForm, DomainError> =
        three_day_form().apply(ScheduleFormAction::SetDayNotes {
            day: 7,
            notes: String::from("x"),
        });
    assert_eq!(result, Err(DomainError::DayNotInSchedule { day: 7 }));
}

#[test]
fn test_remove_day_renumbers_following_days() {
    let form: ScheduleForm = three_day_form()
        .apply(ScheduleFormAction::RemoveDay { day: 2 })
        .unwrap();

    let days: Vec<(u32, time::Date)> = form.days.iter().map(|d| (d.day, d.date)).collect();
    assert_eq!(days, vec![(1, date(2)), (2, date(4))]);
}

#[test]
fn test_add_day_appends_next_index() {
    let form: ScheduleForm = three_day_form()
        .apply(ScheduleFormAction::AddDay { date: date(9) })
        .unwrap();
    let last = form.days.last().unwrap();
    assert_eq!(last.day, 4);
    assert_eq!(last.date, date(9));
}

#[test]
fn test_copy_day_to_all_keeps_each_date() {
    let form: ScheduleForm = three_day_form()
        .apply(ScheduleFormAction::ToggleSlot {
            day: 2,
            slot: SlotKind::Afternoon,
        })
        .unwrap()
        .apply(ScheduleFormAction::SetDayNotes {
            day: 2,
            notes: String::from("Mặc áo đoàn"),
        })
        .unwrap()
        .apply(ScheduleFormAction::CopyDayToAll { day: 2 })
        .unwrap();

    for planned in &form.days {
        assert!(planned.plan.slot(SlotKind::Afternoon).unwrap().is_active);
        assert_eq!(planned.plan.notes, "Mặc áo đoàn");
    }
    assert_eq!(form.days[0].date, date(2));
    assert_eq!(form.days[2].date, date(4));
}

#[test]
fn test_set_day_location_drops_empty_location() {
    let form: ScheduleForm = three_day_form()
        .apply(ScheduleFormAction::SetDayLocation {
            day: 1,
            location: Some(Location::default()),
        })
        .unwrap();
    assert_eq!(form.days[0].plan.location, None);
}

#[test]
fn test_from_schedule_restores_persisted_plans() {
    let schedule: Vec<ScheduleDay> = create_test_schedule(2);
    let form: ScheduleForm = ScheduleForm::from_schedule(LocationMode::Global, &schedule);

    assert_eq!(form.days.len(), 2);
    assert_eq!(form.encode().unwrap(), schedule);
}
