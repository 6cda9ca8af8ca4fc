// =====================================================================================
// REPORT AGGREGATIONS
// =====================================================================================

use std::collections::HashSet;

use chrono::{Datelike, FixedOffset, NaiveDate};
use tracing::debug;

use scheduling_cell::models::{Appointment, AppointmentStatus, ExamType};
use scheduling_cell::services::slots::local_start;

use crate::models::{
    AppointmentMetrics, CategoryValue, ExamCatalogStats, InventoryItem, InventoryStats,
    StatusCount, UNCATEGORISED_COLOR, UNCATEGORISED_LABEL,
};

/// Number of categories the dashboard waffle shows.
pub const DASHBOARD_CATEGORY_LIMIT: usize = 4;

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

pub fn appointment_metrics(appointments: &[Appointment], today: NaiveDate, offset: FixedOffset) -> AppointmentMetrics {
    let total = appointments.len();

    let this_month = appointments
        .iter()
        .map(|a| local_start(a, offset).date())
        .filter(|day| day.year() == today.year() && day.month() == today.month())
        .count();

    let count_of = |status: AppointmentStatus| appointments.iter().filter(|a| a.status == status).count();

    let by_status = AppointmentStatus::ALL
        .into_iter()
        .map(|status| StatusCount { status, count: count_of(status) })
        .collect();

    let revenue = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Completed)
        .map(|a| a.cost.unwrap_or(0.0))
        .sum();

    AppointmentMetrics {
        total,
        this_month,
        by_status,
        completion_rate: percentage(count_of(AppointmentStatus::Completed), total),
        cancellation_rate: percentage(count_of(AppointmentStatus::Cancelled), total),
        revenue,
    }
}

/// Missing categories count as one distinct category of their own.
pub fn exam_catalog_stats(exam_types: &[ExamType]) -> ExamCatalogStats {
    let total = exam_types.len();
    let categories: HashSet<Option<&str>> = exam_types.iter().map(|e| e.category.as_deref()).collect();
    let average_cost = if total == 0 {
        0.0
    } else {
        exam_types.iter().map(|e| e.cost.unwrap_or(0.0)).sum::<f64>() / total as f64
    };

    ExamCatalogStats {
        total,
        active: exam_types.iter().filter(|e| e.active).count(),
        categories: categories.len(),
        average_cost,
    }
}

pub fn inventory_stats(items: &[InventoryItem]) -> InventoryStats {
    InventoryStats {
        total_items: items.len(),
        total_value: items.iter().map(InventoryItem::stock_value).sum(),
        low_stock: items.iter().filter(|i| i.current_stock <= i.min_stock).count(),
        out_of_stock: items.iter().filter(|i| i.current_stock == 0).count(),
    }
}

/// Stock value per category, largest first, truncated to `limit` entries.
/// Percentages are relative to the value of every category, not just the kept ones.
pub fn category_breakdown(items: &[InventoryItem], limit: usize) -> Vec<CategoryValue> {
    let mut categories: Vec<CategoryValue> = Vec::new();

    for item in items {
        let (label, color) = match &item.category {
            Some(category) => (
                category.name.as_str(),
                category.color.as_deref().unwrap_or(UNCATEGORISED_COLOR),
            ),
            None => (UNCATEGORISED_LABEL, UNCATEGORISED_COLOR),
        };

        match categories.iter_mut().find(|c| c.label == label) {
            Some(existing) => existing.value += item.stock_value(),
            None => categories.push(CategoryValue {
                label: label.to_string(),
                value: item.stock_value(),
                percentage: 0.0,
                color: color.to_string(),
            }),
        }
    }

    let total: f64 = categories.iter().map(|c| c.value).sum();
    for category in &mut categories {
        category.percentage = if total > 0.0 { category.value / total * 100.0 } else { 0.0 };
    }

    categories.sort_by(|a, b| b.value.total_cmp(&a.value));
    categories.truncate(limit);

    debug!("Inventory breakdown: {} categories, total value {:.2}", categories.len(), total);
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::models::InventoryCategory;

    fn appointment(day: u32, status: AppointmentStatus, cost: Option<f64>) -> Appointment {
        Appointment {
            id: format!("a-{}-{}", day, status),
            patient_name: "Maria".into(),
            scheduled_date: Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap(),
            doctor_id: None,
            unit_id: None,
            exam_type_id: None,
            status,
            cost,
            notes: None,
        }
    }

    fn item(name: &str, stock: i64, min: i64, cost: Option<f64>, category: Option<&str>) -> InventoryItem {
        InventoryItem {
            id: name.to_lowercase(),
            name: name.into(),
            current_stock: stock,
            min_stock: min,
            cost_per_unit: cost,
            unit_id: None,
            category: category.map(|c| InventoryCategory { name: c.into(), color: None }),
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_appointment_metrics() {
        let appointments = vec![
            appointment(1, AppointmentStatus::Completed, Some(100.0)),
            appointment(2, AppointmentStatus::Completed, None),
            appointment(3, AppointmentStatus::Cancelled, Some(500.0)),
            appointment(4, AppointmentStatus::Scheduled, Some(70.0)),
        ];
        let today = NaiveDate::from_ymd_opt(2026, 3, 20).unwrap();

        let metrics = appointment_metrics(&appointments, today, utc());

        assert_eq!(metrics.total, 4);
        assert_eq!(metrics.this_month, 4);
        assert_eq!(metrics.revenue, 100.0);
        assert_eq!(metrics.completion_rate, 50.0);
        assert_eq!(metrics.cancellation_rate, 25.0);
        assert_eq!(metrics.by_status.len(), 5);
        assert_eq!(metrics.by_status[0], StatusCount { status: AppointmentStatus::Scheduled, count: 1 });
        assert_eq!(metrics.by_status[3], StatusCount { status: AppointmentStatus::Completed, count: 2 });

        let april = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        assert_eq!(appointment_metrics(&appointments, april, utc()).this_month, 0);
    }

    #[test]
    fn test_this_month_uses_clinic_time() {
        // 02:00 UTC on April 1st is still March 31st at UTC-3.
        let mut late = appointment(1, AppointmentStatus::Scheduled, None);
        late.scheduled_date = Utc.with_ymd_and_hms(2026, 4, 1, 2, 0, 0).unwrap();
        let march = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();

        assert_eq!(appointment_metrics(&[late], march, offset).this_month, 1);
    }

    #[test]
    fn test_empty_inputs() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 20).unwrap();
        let metrics = appointment_metrics(&[], today, utc());
        assert_eq!(metrics.completion_rate, 0.0);
        assert_eq!(metrics.cancellation_rate, 0.0);

        assert_eq!(exam_catalog_stats(&[]).average_cost, 0.0);
        assert_eq!(inventory_stats(&[]).total_value, 0.0);
        assert!(category_breakdown(&[], 4).is_empty());
    }

    #[test]
    fn test_exam_catalog_stats() {
        let exams = vec![
            ExamType { id: "1".into(), name: "ECG".into(), category: Some("Cardiology".into()), cost: Some(80.0), active: true, ..ExamType::default() },
            ExamType { id: "2".into(), name: "Echo".into(), category: Some("Cardiology".into()), cost: Some(220.0), active: false, ..ExamType::default() },
            ExamType { id: "3".into(), name: "Consult".into(), category: None, cost: None, active: true, ..ExamType::default() },
        ];
        let stats = exam_catalog_stats(&exams);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.categories, 2);
        assert!((stats.average_cost - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_inventory_stats() {
        let items = vec![
            item("Gloves", 0, 10, Some(2.0), Some("Supplies")),
            item("Syringes", 10, 10, Some(1.5), Some("Supplies")),
            item("Reagent", 40, 5, Some(12.0), Some("Lab")),
            item("Gauze", 3, 1, None, None),
        ];
        let stats = inventory_stats(&items);
        assert_eq!(stats.total_items, 4);
        assert_eq!(stats.total_value, 15.0 + 480.0);
        assert_eq!(stats.low_stock, 2);
        assert_eq!(stats.out_of_stock, 1);
    }

    #[test]
    fn test_category_breakdown_sorted_and_truncated() {
        let items = vec![
            item("Gloves", 100, 10, Some(1.0), Some("Supplies")),
            item("Masks", 100, 10, Some(1.0), Some("Supplies")),
            item("Reagent", 10, 5, Some(50.0), Some("Lab")),
            item("Gauze", 50, 1, Some(1.0), None),
            item("Paper", 25, 1, Some(1.0), Some("Office")),
            item("Toner", 1, 1, Some(25.0), Some("Printing")),
        ];

        let breakdown = category_breakdown(&items, DASHBOARD_CATEGORY_LIMIT);

        let labels: Vec<&str> = breakdown.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Lab", "Supplies", "Other", "Office"]);
        assert_eq!(breakdown[0].value, 500.0);
        assert_eq!(breakdown[2].color, UNCATEGORISED_COLOR);
        assert!((breakdown[0].percentage - 500.0 / 800.0 * 100.0).abs() < 1e-9);
    }
}
