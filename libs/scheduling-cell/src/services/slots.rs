use chrono::{Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::{Appointment, AppointmentStatus, Doctor, StatusTone};

/// Half-hour labels offered Monday to Friday.
pub const WEEKDAY_SLOTS: [&str; 22] = [
    "07:00", "07:30", "08:00", "08:30", "09:00", "09:30",
    "10:00", "10:30", "11:00", "11:30", "12:00", "12:30",
    "13:00", "13:30", "14:00", "14:30", "15:00", "15:30",
    "16:00", "16:30", "17:00", "17:30",
];

/// Reduced weekend hours.
pub const WEEKEND_SLOTS: [&str; 12] = [
    "08:00", "08:30", "09:00", "09:30", "10:00", "10:30",
    "11:00", "11:30", "12:00", "12:30", "13:00", "13:30",
];

pub const SLOT_MINUTES: i64 = 30;

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn slot_labels(date: NaiveDate) -> &'static [&'static str] {
    if is_weekend(date) {
        &WEEKEND_SLOTS
    } else {
        &WEEKDAY_SLOTS
    }
}

/// Only days strictly before today are past; today stays bookable all day.
pub fn is_past_day(day: NaiveDate, today: NaiveDate) -> bool {
    day < today
}

/// Appointment start on the clinic's wall clock.
pub fn local_start(appointment: &Appointment, offset: FixedOffset) -> NaiveDateTime {
    appointment.scheduled_date.with_timezone(&offset).naive_local()
}

pub fn format_slot_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn parse_slot_time(label: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(label, "%H:%M").ok()
}

/// First appointment occupying `label` for the doctor on `day`.
pub fn find_slot_appointment<'a>(
    appointments: &'a [Appointment],
    doctor_id: &str,
    day: NaiveDate,
    label: &str,
    offset: FixedOffset,
) -> Option<&'a Appointment> {
    appointments.iter().find(|appointment| {
        if appointment.doctor_id.as_deref() != Some(doctor_id) {
            return false;
        }
        let start = local_start(appointment, offset);
        start.date() == day && format_slot_time(start.time()) == label
    })
}

pub fn is_slot_taken(
    appointments: &[Appointment],
    doctor_id: &str,
    day: NaiveDate,
    label: &str,
    offset: FixedOffset,
) -> bool {
    find_slot_appointment(appointments, doctor_id, day, label, offset).is_some()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SlotState {
    Taken {
        appointment_id: String,
        patient_name: String,
        status: AppointmentStatus,
        tone: StatusTone,
    },
    /// Free and clickable.
    Open,
    /// Free but on a past day.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotView {
    pub time: String,
    #[serde(flatten)]
    pub state: SlotState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorColumn {
    pub doctor_id: String,
    pub doctor_name: String,
    pub appointment_count: usize,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub is_weekend: bool,
    pub is_today: bool,
    pub is_past: bool,
    pub doctors: Vec<DoctorColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSchedule {
    pub week_start: NaiveDate,
    pub days: Vec<DaySchedule>,
}

/// Slot grid for one doctor on one day.
pub fn doctor_day_slots(
    appointments: &[Appointment],
    doctor_id: &str,
    day: NaiveDate,
    today: NaiveDate,
    offset: FixedOffset,
) -> Vec<SlotView> {
    let past = is_past_day(day, today);

    slot_labels(day)
        .iter()
        .map(|label| {
            let state = match find_slot_appointment(appointments, doctor_id, day, label, offset) {
                Some(appointment) => SlotState::Taken {
                    appointment_id: appointment.id.clone(),
                    patient_name: appointment.patient_name.clone(),
                    status: appointment.status,
                    tone: appointment.status.tone(),
                },
                None if past => SlotState::Closed,
                None => SlotState::Open,
            };
            SlotView {
                time: label.to_string(),
                state,
            }
        })
        .collect()
}

pub fn day_schedule(
    day: NaiveDate,
    today: NaiveDate,
    doctors: &[Doctor],
    appointments: &[Appointment],
    offset: FixedOffset,
) -> DaySchedule {
    let columns = doctors
        .iter()
        .map(|doctor| {
            let appointment_count = appointments
                .iter()
                .filter(|a| a.doctor_id.as_deref() == Some(doctor.id.as_str()))
                .filter(|a| local_start(a, offset).date() == day)
                .count();

            DoctorColumn {
                doctor_id: doctor.id.clone(),
                doctor_name: doctor.name.clone(),
                appointment_count,
                slots: doctor_day_slots(appointments, &doctor.id, day, today, offset),
            }
        })
        .collect();

    DaySchedule {
        date: day,
        is_weekend: is_weekend(day),
        is_today: day == today,
        is_past: is_past_day(day, today),
        doctors: columns,
    }
}

/// Monday-first week containing `anchor`, or `None` when part of that week
/// falls outside the representable calendar.
pub fn week_days(anchor: NaiveDate) -> Option<[NaiveDate; 7]> {
    let monday = anchor.checked_sub_signed(Duration::days(anchor.weekday().num_days_from_monday() as i64))?;
    let mut days = [monday; 7];
    for (i, day) in days.iter_mut().enumerate().skip(1) {
        *day = monday.checked_add_signed(Duration::days(i as i64))?;
    }
    Some(days)
}

pub fn week_schedule(
    anchor: NaiveDate,
    today: NaiveDate,
    doctors: &[Doctor],
    appointments: &[Appointment],
    offset: FixedOffset,
) -> Option<WeekSchedule> {
    let days = week_days(anchor)?;
    Some(WeekSchedule {
        week_start: days[0],
        days: days
            .iter()
            .map(|day| day_schedule(*day, today, doctors, appointments, offset))
            .collect(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSelection {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub time: String,
    pub doctor_id: String,
    pub doctor_name: String,
}

/// Turns a click on a slot into a bookable interval. Past days, taken slots
/// and labels outside the day's catalog yield `None`.
pub fn select_slot(
    day: NaiveDate,
    label: &str,
    doctor: &Doctor,
    today: NaiveDate,
    appointments: &[Appointment],
    offset: FixedOffset,
) -> Option<SlotSelection> {
    if is_past_day(day, today) || !slot_labels(day).iter().any(|l| *l == label) {
        return None;
    }
    if is_slot_taken(appointments, &doctor.id, day, label, offset) {
        return None;
    }

    let start = day.and_time(parse_slot_time(label)?);
    Some(SlotSelection {
        start,
        end: start.checked_add_signed(Duration::minutes(SLOT_MINUTES))?,
        time: label.to_string(),
        doctor_id: doctor.id.clone(),
        doctor_name: doctor.name.clone(),
    })
}
