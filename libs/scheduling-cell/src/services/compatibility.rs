//! Which exam types a doctor may order.
//!
//! Matching is a case-insensitive substring test of the exam's name and
//! category against the keywords registered for the doctor's specialty.
//! Basic exams (consultations, checkups, triage...) are always allowed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Doctor, ExamType};

/// Keywords that mark an exam as basic, allowed for every specialty.
pub const BASIC_EXAM_KEYWORDS: [&str; 8] = [
    "consultation",
    "evaluation",
    "general",
    "basic",
    "routine",
    "checkup",
    "preventive",
    "triage",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialty {
    Cardiology,
    Endocrinology,
    Hematology,
    Gastroenterology,
    Neurology,
    Orthopedics,
    Dermatology,
    Ophthalmology,
    Urology,
    Gynecology,
    Pulmonology,
    Radiology,
    Endoscopy,
    Laboratory,
    GeneralPractice,
}

impl Specialty {
    pub const ALL: [Specialty; 15] = [
        Specialty::Cardiology,
        Specialty::Endocrinology,
        Specialty::Hematology,
        Specialty::Gastroenterology,
        Specialty::Neurology,
        Specialty::Orthopedics,
        Specialty::Dermatology,
        Specialty::Ophthalmology,
        Specialty::Urology,
        Specialty::Gynecology,
        Specialty::Pulmonology,
        Specialty::Radiology,
        Specialty::Endoscopy,
        Specialty::Laboratory,
        Specialty::GeneralPractice,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Specialty::Cardiology => "Cardiology",
            Specialty::Endocrinology => "Endocrinology",
            Specialty::Hematology => "Hematology",
            Specialty::Gastroenterology => "Gastroenterology",
            Specialty::Neurology => "Neurology",
            Specialty::Orthopedics => "Orthopedics",
            Specialty::Dermatology => "Dermatology",
            Specialty::Ophthalmology => "Ophthalmology",
            Specialty::Urology => "Urology",
            Specialty::Gynecology => "Gynecology",
            Specialty::Pulmonology => "Pulmonology",
            Specialty::Radiology => "Radiology",
            Specialty::Endoscopy => "Endoscopy",
            Specialty::Laboratory => "Laboratory",
            Specialty::GeneralPractice => "General Practice",
        }
    }

    /// Trimmed, case-insensitive lookup by label.
    pub fn from_label(label: &str) -> Option<Specialty> {
        let wanted = label.trim();
        Specialty::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(wanted))
    }

    /// Lowercase keywords relevant to the specialty. Empty means unrestricted.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Specialty::Cardiology => &["cardio", "heart", "ecg", "echo", "pressure", "stress test", "holter"],
            Specialty::Endocrinology => &["diabetes", "hormone", "thyroid", "glucose", "insulin", "cortisol"],
            Specialty::Hematology => &["blood", "hemogram", "coagul", "platelet", "hematocrit"],
            Specialty::Gastroenterology => &["gastro", "digestive", "endoscop", "colonoscopy", "stomach"],
            Specialty::Neurology => &["neuro", "cerebr", "encephalogram", "brain mri"],
            Specialty::Orthopedics => &["bone", "joint", "x-ray", "radiograph", "joint mri"],
            Specialty::Dermatology => &["skin", "dermat", "biopsy", "dermoscopy"],
            Specialty::Ophthalmology => &["eye", "ocular", "vision", "acuity", "fundus"],
            Specialty::Urology => &["urine", "psa", "prostate", "renal"],
            Specialty::Gynecology => &["gyneco", "breast", "pap smear", "pelvic ultrasound"],
            Specialty::Pulmonology => &["pulmonary", "respirat", "thorax", "spirometry"],
            Specialty::Radiology => &[
                "x-ray", "tomography", "mri", "ultrasound", "mammography",
                "densitometry", "radiograph", "ct scan",
            ],
            Specialty::Endoscopy => &["endoscopy", "colonoscopy", "gastroscopy", "bronchoscopy", "endoscopic"],
            Specialty::Laboratory => &["laboratory", "collection", "analysis", "blood", "urine"],
            Specialty::GeneralPractice => &[],
        }
    }
}

/// An exam type is offered only with an id and a non-blank name.
pub fn is_selectable_exam(exam: &ExamType) -> bool {
    !exam.id.is_empty() && !exam.name.trim().is_empty()
}

/// Registered keywords for a free-text specialty, or `None` when the doctor
/// may order anything (no specialty, general practice, or an unmapped label).
fn restricting_keywords(specialty: Option<&str>) -> Option<&'static [&'static str]> {
    let label = specialty.map(str::trim).filter(|s| !s.is_empty())?;
    let keywords = Specialty::from_label(label)?.keywords();
    if keywords.is_empty() {
        None
    } else {
        Some(keywords)
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn exam_matches(exam: &ExamType, specialty_label: &str, keywords: &[&str]) -> bool {
    let name = exam.name.to_lowercase();
    let category = exam.category.as_deref().unwrap_or("").to_lowercase();

    let specialty_match = contains_any(&name, keywords) || contains_any(&category, keywords);
    let category_match = category == specialty_label.trim().to_lowercase();
    let basic_exam = contains_any(&name, &BASIC_EXAM_KEYWORDS)
        || contains_any(&category, &BASIC_EXAM_KEYWORDS);

    specialty_match || category_match || basic_exam
}

/// Exam types presentable for `doctor`, in input order.
pub fn filter_exam_types(exam_types: &[ExamType], doctor: Option<&Doctor>) -> Vec<ExamType> {
    let selectable = exam_types.iter().filter(|exam| is_selectable_exam(exam));

    let restriction = doctor.and_then(|d| {
        let specialty = d.specialty.as_deref()?;
        restricting_keywords(Some(specialty)).map(|keywords| (specialty, keywords))
    });

    let filtered: Vec<ExamType> = match restriction {
        None => selectable.cloned().collect(),
        Some((specialty, keywords)) => selectable
            .filter(|exam| exam_matches(exam, specialty, keywords))
            .cloned()
            .collect(),
    };

    debug!(
        "Exam types for doctor {:?}: {} of {}",
        doctor.map(|d| d.id.as_str()),
        filtered.len(),
        exam_types.len()
    );

    filtered
}

/// Whether `doctor` may order `exam`.
pub fn is_doctor_exam_compatible(doctor: &Doctor, exam: &ExamType) -> bool {
    match restricting_keywords(doctor.specialty.as_deref()) {
        None => true,
        Some(keywords) => exam_matches(exam, doctor.specialty.as_deref().unwrap_or(""), keywords),
    }
}

/// Blank specialties and general practice accept any exam id. Otherwise the
/// exam must exist, and only then does an unmapped specialty accept it.
pub fn check_doctor_exam_compatibility(doctor: &Doctor, exam_type_id: &str, exam_types: &[ExamType]) -> bool {
    let specialty = doctor.specialty.as_deref().map(str::trim).filter(|s| !s.is_empty());
    match specialty {
        None => return true,
        Some(label) if Specialty::from_label(label) == Some(Specialty::GeneralPractice) => return true,
        Some(_) => {}
    }

    match exam_types.iter().find(|e| e.id == exam_type_id) {
        Some(exam) => is_doctor_exam_compatible(doctor, exam),
        None => false,
    }
}
