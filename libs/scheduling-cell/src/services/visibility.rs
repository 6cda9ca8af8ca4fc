use tracing::debug;

use shared_models::auth::{UnitScope, User};

use crate::models::{Appointment, Doctor};

/// A doctor can be offered for selection only with an id and a non-blank name.
pub fn is_selectable_doctor(doctor: &Doctor) -> bool {
    !doctor.id.is_empty() && !doctor.name.trim().is_empty()
}

/// Doctors the viewer may pick from, in input order.
///
/// Regular staff only ever see their home unit and the `selected_unit`
/// override is ignored for them. Admins and supervisors see the overridden
/// unit when one is given, otherwise every unit.
pub fn filter_doctors(doctors: &[Doctor], viewer: &User, selected_unit: Option<&str>) -> Vec<Doctor> {
    let scope = viewer.resolve_unit_scope(selected_unit);

    let filtered: Vec<Doctor> = doctors
        .iter()
        .filter(|doctor| is_selectable_doctor(doctor))
        .filter(|doctor| scope.includes(doctor.unit_id.as_deref()))
        .cloned()
        .collect();

    debug!(
        "Doctor visibility for {} ({:?}, scope {:?}): {} of {}",
        viewer.id,
        viewer.role,
        scope,
        filtered.len(),
        doctors.len()
    );

    filtered
}

/// Restricts both calendar collections to one unit, or passes them through.
pub fn filter_for_calendar(
    doctors: &[Doctor],
    appointments: &[Appointment],
    scope: &UnitScope,
) -> (Vec<Doctor>, Vec<Appointment>) {
    let doctors = doctors
        .iter()
        .filter(|d| scope.includes(d.unit_id.as_deref()))
        .cloned()
        .collect();
    let appointments = appointments
        .iter()
        .filter(|a| scope.includes(a.unit_id.as_deref()))
        .cloned()
        .collect();
    (doctors, appointments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::auth::UserRole;

    fn doctor(id: &str, name: &str, unit: Option<&str>) -> Doctor {
        Doctor {
            id: id.to_string(),
            name: name.to_string(),
            unit_id: unit.map(str::to_string),
            ..Doctor::default()
        }
    }

    fn viewer(role: UserRole, unit: Option<&str>) -> User {
        User {
            id: "viewer".to_string(),
            email: None,
            role,
            unit_id: unit.map(str::to_string),
            created_at: None,
        }
    }

    fn roster() -> Vec<Doctor> {
        vec![
            doctor("d1", "Ana Souza", Some("north")),
            doctor("d2", "   ", Some("north")),
            doctor("", "Ghost", Some("north")),
            doctor("d3", "Bruno Lima", Some("south")),
            doctor("d4", "Carla Dias", None),
            doctor("d5", "Davi Rocha", Some("north")),
        ]
    }

    fn ids(doctors: &[Doctor]) -> Vec<&str> {
        doctors.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_blank_doctors_never_visible() {
        for role in [UserRole::Admin, UserRole::Supervisor, UserRole::Staff] {
            for unit in [None, Some("north")] {
                for selected in [None, Some("north"), Some("south")] {
                    let visible = filter_doctors(&roster(), &viewer(role, unit), selected);
                    assert!(visible.iter().all(is_selectable_doctor));
                    assert!(!ids(&visible).contains(&"d2"));
                    assert!(!ids(&visible).contains(&""));
                }
            }
        }
    }

    #[test]
    fn test_staff_restricted_to_home_unit_regardless_of_override() {
        let staff = viewer(UserRole::Staff, Some("north"));
        for selected in [None, Some(""), Some("south"), Some("north")] {
            let visible = filter_doctors(&roster(), &staff, selected);
            assert_eq!(ids(&visible), vec!["d1", "d5"]);
        }
    }

    #[test]
    fn test_staff_without_home_unit_follows_selection() {
        let staff = viewer(UserRole::Staff, None);
        assert_eq!(ids(&filter_doctors(&roster(), &staff, Some("south"))), vec!["d3"]);
    }

    #[test]
    fn test_admin_without_override_sees_all_valid() {
        let admin = viewer(UserRole::Admin, Some("north"));
        assert_eq!(ids(&filter_doctors(&roster(), &admin, None)), vec!["d1", "d3", "d4", "d5"]);
        assert_eq!(ids(&filter_doctors(&roster(), &admin, Some(""))), vec!["d1", "d3", "d4", "d5"]);
    }

    #[test]
    fn test_supervisor_with_override() {
        let supervisor = viewer(UserRole::Supervisor, Some("north"));
        assert_eq!(ids(&filter_doctors(&roster(), &supervisor, Some("south"))), vec!["d3"]);
    }

    #[test]
    fn test_empty_input() {
        let admin = viewer(UserRole::Admin, None);
        assert!(filter_doctors(&[], &admin, None).is_empty());
    }

    #[test]
    fn test_calendar_filter_by_unit() {
        let (doctors, appointments) =
            filter_for_calendar(&roster(), &[], &UnitScope::Unit("south".into()));
        assert_eq!(ids(&doctors), vec!["d3"]);
        assert!(appointments.is_empty());

        let (all, _) = filter_for_calendar(&roster(), &[], &UnitScope::All);
        assert_eq!(all.len(), roster().len());
    }
}
