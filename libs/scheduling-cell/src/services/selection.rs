//! Doctor / exam type / unit selection as an explicit state container.
//!
//! Every user action is a [`SelectionEvent`] applied to a [`SelectionState`].
//! The cross-field rules run inside `apply`, so each reset happens exactly
//! once per event and before the caller renders again.

use serde::{Deserialize, Serialize};
use tracing::debug;

use shared_models::auth::User;

use crate::models::{CatalogSnapshot, Doctor, ExamType};
use crate::services::compatibility::filter_exam_types;
use crate::services::visibility::filter_doctors;

/// User-visible message describing an automatic change to the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    fn unit_switched(unit_name: Option<&str>) -> Self {
        Self {
            title: "Unit updated".to_string(),
            description: format!(
                "Unit changed to {}.",
                unit_name.unwrap_or("the doctor's unit")
            ),
        }
    }

    fn selections_cleared() -> Self {
        Self {
            title: "Selections updated".to_string(),
            description: "Doctor and exam were cleared because the unit changed.".to_string(),
        }
    }
}

/// Receives the notices produced by selection transitions.
pub trait NotificationSink {
    fn notify(&mut self, notice: Notice);
}

impl NotificationSink for Vec<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum SelectionEvent {
    DoctorChanged(String),
    ExamTypeChanged(String),
    UnitChanged(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub doctor_id: Option<String>,
    pub exam_type_id: Option<String>,
    pub unit_id: Option<String>,
}

fn non_empty(id: String) -> Option<String> {
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

impl SelectionState {
    /// Starts with nothing selected except the viewer's home unit.
    pub fn for_viewer(viewer: &User) -> Self {
        Self {
            unit_id: viewer.home_unit_id().map(str::to_string),
            ..Self::default()
        }
    }

    pub fn apply<S: NotificationSink>(&mut self, event: SelectionEvent, snapshot: &CatalogSnapshot, sink: &mut S) {
        match event {
            SelectionEvent::DoctorChanged(doctor_id) => self.change_doctor(doctor_id, snapshot, sink),
            SelectionEvent::ExamTypeChanged(exam_type_id) => {
                debug!("Exam type changed to {:?}", exam_type_id);
                self.exam_type_id = non_empty(exam_type_id);
            }
            SelectionEvent::UnitChanged(unit_id) => self.change_unit(unit_id, snapshot, sink),
        }
    }

    fn change_doctor<S: NotificationSink>(&mut self, doctor_id: String, snapshot: &CatalogSnapshot, sink: &mut S) {
        debug!("Doctor changed to {:?}", doctor_id);

        if let Some(doctor) = snapshot.doctor(&doctor_id) {
            if let Some(doctor_unit) = doctor.unit_id.as_deref().filter(|u| !u.is_empty()) {
                if self.unit_id.as_deref() != Some(doctor_unit) {
                    self.unit_id = Some(doctor_unit.to_string());
                    let unit_name = snapshot.unit(doctor_unit).map(|u| u.name.as_str());
                    debug!("Unit switched to {} for doctor {}", doctor_unit, doctor.id);
                    sink.notify(Notice::unit_switched(unit_name));
                }
            }
        }

        self.doctor_id = non_empty(doctor_id);

        // A new doctor always forces the exam type to be picked again.
        if self.exam_type_id.take().is_some() {
            debug!("Exam type cleared after doctor change");
        }
    }

    fn change_unit<S: NotificationSink>(&mut self, unit_id: String, snapshot: &CatalogSnapshot, sink: &mut S) {
        debug!("Unit changed to {:?}", unit_id);

        if !unit_id.is_empty() {
            let conflicting = self
                .doctor_id
                .as_deref()
                .and_then(|id| snapshot.doctor(id))
                .is_some_and(|doctor| doctor.unit_id.as_deref() != Some(unit_id.as_str()));

            if conflicting {
                self.doctor_id = None;
                self.exam_type_id = None;
                sink.notify(Notice::selections_cleared());
            }
        }

        self.unit_id = non_empty(unit_id);
    }
}

/// Selection workflow bound to one viewer and one catalog snapshot.
pub struct AppointmentSelection<'a> {
    viewer: &'a User,
    snapshot: &'a CatalogSnapshot,
    state: SelectionState,
    notices: Vec<Notice>,
}

impl<'a> AppointmentSelection<'a> {
    pub fn new(viewer: &'a User, snapshot: &'a CatalogSnapshot) -> Self {
        Self::resume(viewer, snapshot, SelectionState::for_viewer(viewer))
    }

    /// Continues from a state produced earlier, e.g. one echoed back by a client.
    pub fn resume(viewer: &'a User, snapshot: &'a CatalogSnapshot, state: SelectionState) -> Self {
        Self {
            viewer,
            snapshot,
            state,
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn selected_doctor(&self) -> Option<&'a Doctor> {
        let snapshot = self.snapshot;
        self.state.doctor_id.as_deref().and_then(|id| snapshot.doctor(id))
    }

    pub fn filtered_doctors(&self) -> Vec<Doctor> {
        filter_doctors(&self.snapshot.doctors, self.viewer, self.state.unit_id.as_deref())
    }

    pub fn filtered_exam_types(&self) -> Vec<ExamType> {
        filter_exam_types(&self.snapshot.exam_types, self.selected_doctor())
    }

    pub fn handle_doctor_change(&mut self, doctor_id: &str) {
        self.dispatch(SelectionEvent::DoctorChanged(doctor_id.to_string()));
    }

    pub fn handle_exam_type_change(&mut self, exam_type_id: &str) {
        self.dispatch(SelectionEvent::ExamTypeChanged(exam_type_id.to_string()));
    }

    pub fn handle_unit_change(&mut self, unit_id: &str) {
        self.dispatch(SelectionEvent::UnitChanged(unit_id.to_string()));
    }

    pub fn dispatch(&mut self, event: SelectionEvent) {
        self.state.apply(event, self.snapshot, &mut self.notices);
    }

    /// Notices raised since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn into_parts(self) -> (SelectionState, Vec<Notice>) {
        (self.state, self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Unit;
    use shared_models::auth::UserRole;

    fn doctor(id: &str, unit: &str, specialty: Option<&str>) -> Doctor {
        Doctor {
            id: id.to_string(),
            name: format!("Dr. {}", id),
            specialty: specialty.map(str::to_string),
            unit_id: Some(unit.to_string()),
            ..Doctor::default()
        }
    }

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot {
            doctors: vec![
                doctor("a", "north", Some("Cardiology")),
                doctor("b", "north", None),
                doctor("c", "south", Some("Dermatology")),
            ],
            exam_types: vec![
                ExamType { id: "ecg".into(), name: "Resting ECG".into(), active: true, ..ExamType::default() },
                ExamType { id: "biopsy".into(), name: "Skin Biopsy".into(), active: true, ..ExamType::default() },
            ],
            units: vec![
                Unit { id: "north".into(), name: "North Lab".into(), code: "N".into() },
                Unit { id: "south".into(), name: "South Lab".into(), code: "S".into() },
            ],
            appointments: vec![],
        }
    }

    fn admin() -> User {
        User { id: "admin".into(), email: None, role: UserRole::Admin, unit_id: Some("north".into()), created_at: None }
    }

    #[test]
    fn test_initial_state_uses_home_unit() {
        let state = SelectionState::for_viewer(&admin());
        assert_eq!(state.unit_id.as_deref(), Some("north"));
        assert!(state.doctor_id.is_none());
        assert!(state.exam_type_id.is_none());
    }

    #[test]
    fn test_doctor_change_clears_exam_type() {
        let snapshot = snapshot();
        let mut sink = Vec::new();
        let mut state = SelectionState { unit_id: Some("north".into()), ..Default::default() };

        state.apply(SelectionEvent::DoctorChanged("a".into()), &snapshot, &mut sink);
        state.apply(SelectionEvent::ExamTypeChanged("ecg".into()), &snapshot, &mut sink);
        assert_eq!(state.exam_type_id.as_deref(), Some("ecg"));

        state.apply(SelectionEvent::DoctorChanged("b".into()), &snapshot, &mut sink);
        assert_eq!(state.doctor_id.as_deref(), Some("b"));
        assert!(state.exam_type_id.is_none());
        assert!(sink.is_empty(), "same unit, no notice");
    }

    #[test]
    fn test_doctor_change_switches_unit_once() {
        let snapshot = snapshot();
        let mut sink = Vec::new();
        let mut state = SelectionState { unit_id: Some("north".into()), ..Default::default() };

        state.apply(SelectionEvent::DoctorChanged("c".into()), &snapshot, &mut sink);

        assert_eq!(state.unit_id.as_deref(), Some("south"));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].title, "Unit updated");
        assert!(sink[0].description.contains("South Lab"));
    }

    #[test]
    fn test_unit_switch_notice_falls_back_when_unit_unknown() {
        let mut snapshot = snapshot();
        snapshot.units.clear();
        let mut sink = Vec::new();
        let mut state = SelectionState::default();

        state.apply(SelectionEvent::DoctorChanged("c".into()), &snapshot, &mut sink);
        assert_eq!(sink[0].description, "Unit changed to the doctor's unit.");
    }

    #[test]
    fn test_unknown_doctor_keeps_unit() {
        let snapshot = snapshot();
        let mut sink = Vec::new();
        let mut state = SelectionState { unit_id: Some("north".into()), ..Default::default() };

        state.apply(SelectionEvent::DoctorChanged("zzz".into()), &snapshot, &mut sink);
        assert_eq!(state.unit_id.as_deref(), Some("north"));
        assert_eq!(state.doctor_id.as_deref(), Some("zzz"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_conflicting_unit_clears_doctor_and_exam() {
        let snapshot = snapshot();
        let mut sink = Vec::new();
        let mut state = SelectionState {
            doctor_id: Some("a".into()),
            exam_type_id: Some("ecg".into()),
            unit_id: Some("north".into()),
        };

        state.apply(SelectionEvent::UnitChanged("south".into()), &snapshot, &mut sink);

        assert_eq!(state.unit_id.as_deref(), Some("south"));
        assert!(state.doctor_id.is_none());
        assert!(state.exam_type_id.is_none());
        assert_eq!(sink, vec![Notice::selections_cleared()]);
    }

    #[test]
    fn test_matching_unit_keeps_selection() {
        let snapshot = snapshot();
        let mut sink = Vec::new();
        let mut state = SelectionState {
            doctor_id: Some("a".into()),
            exam_type_id: Some("ecg".into()),
            unit_id: None,
        };

        state.apply(SelectionEvent::UnitChanged("north".into()), &snapshot, &mut sink);
        assert_eq!(state.doctor_id.as_deref(), Some("a"));
        assert_eq!(state.exam_type_id.as_deref(), Some("ecg"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_clearing_unit_keeps_doctor() {
        let snapshot = snapshot();
        let mut sink = Vec::new();
        let mut state = SelectionState {
            doctor_id: Some("a".into()),
            exam_type_id: None,
            unit_id: Some("north".into()),
        };

        state.apply(SelectionEvent::UnitChanged(String::new()), &snapshot, &mut sink);
        assert!(state.unit_id.is_none());
        assert_eq!(state.doctor_id.as_deref(), Some("a"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_workflow_refreshes_filtered_lists() {
        let viewer = admin();
        let snapshot = snapshot();
        let mut selection = AppointmentSelection::new(&viewer, &snapshot);

        let north: Vec<String> = selection.filtered_doctors().into_iter().map(|d| d.id).collect();
        assert_eq!(north, vec!["a", "b"]);
        assert_eq!(selection.filtered_exam_types().len(), 2);

        selection.handle_doctor_change("c");
        let south: Vec<String> = selection.filtered_doctors().into_iter().map(|d| d.id).collect();
        assert_eq!(south, vec!["c"]);

        let exams: Vec<String> = selection.filtered_exam_types().into_iter().map(|e| e.id).collect();
        assert_eq!(exams, vec!["biopsy"]);

        assert_eq!(selection.drain_notices().len(), 1);
        assert!(selection.drain_notices().is_empty());
    }

    #[test]
    fn test_event_wire_format() {
        let event: SelectionEvent =
            serde_json::from_str(r#"{"type":"unit_changed","id":"south"}"#).unwrap();
        assert_eq!(event, SelectionEvent::UnitChanged("south".into()));
    }
}
