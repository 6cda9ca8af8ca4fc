// =====================================================================================
// REPORTS SERVICE
// =====================================================================================

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use scheduling_cell::models::{Appointment, ExamType};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::UnitScope;

use crate::models::{CategoryValue, InventoryItem, ReportSummary, ReportsError};
use crate::services::metrics::{
    appointment_metrics, category_breakdown, exam_catalog_stats, inventory_stats,
};

pub struct ReportsService {
    supabase: Arc<SupabaseClient>,
}

fn unit_filter(scope: &UnitScope) -> String {
    match scope {
        UnitScope::All => String::new(),
        UnitScope::Unit(unit_id) => format!("&unit_id=eq.{}", urlencoding::encode(unit_id)),
    }
}

impl ReportsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, auth_token: &str) -> Result<Vec<T>, ReportsError> {
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await?;

        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| ReportsError::DataUnavailable(format!("Failed to parse row: {}", e)))
            })
            .collect()
    }

    pub async fn appointments(&self, scope: &UnitScope, auth_token: &str) -> Result<Vec<Appointment>, ReportsError> {
        let path = format!("/rest/v1/appointments?select=*{}", unit_filter(scope));
        self.fetch(&path, auth_token).await
    }

    /// Exam types are shared by every unit, inactive ones included.
    pub async fn exam_types(&self, auth_token: &str) -> Result<Vec<ExamType>, ReportsError> {
        self.fetch("/rest/v1/exam_types?select=*", auth_token).await
    }

    pub async fn inventory_items(&self, scope: &UnitScope, auth_token: &str) -> Result<Vec<InventoryItem>, ReportsError> {
        let path = format!(
            "/rest/v1/inventory_items?select=*,categories:inventory_categories(name,color)&active=eq.true{}",
            unit_filter(scope)
        );
        self.fetch(&path, auth_token).await
    }

    pub async fn summary(
        &self,
        scope: UnitScope,
        today: NaiveDate,
        offset: FixedOffset,
        auth_token: &str,
    ) -> Result<ReportSummary, ReportsError> {
        info!("Building report summary for {:?}", scope);

        let (appointments, exam_types, items) = futures::try_join!(
            self.appointments(&scope, auth_token),
            self.exam_types(auth_token),
            self.inventory_items(&scope, auth_token),
        )?;

        debug!(
            "Report rows: {} appointments, {} exam types, {} inventory items",
            appointments.len(),
            exam_types.len(),
            items.len()
        );

        Ok(ReportSummary {
            appointments: appointment_metrics(&appointments, today, offset),
            exams: exam_catalog_stats(&exam_types),
            inventory: inventory_stats(&items),
            scope,
        })
    }

    pub async fn inventory_categories(
        &self,
        scope: &UnitScope,
        limit: usize,
        auth_token: &str,
    ) -> Result<Vec<CategoryValue>, ReportsError> {
        let items = self.inventory_items(scope, auth_token).await?;
        Ok(category_breakdown(&items, limit))
    }
}
