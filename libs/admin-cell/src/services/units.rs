// =====================================================================================
// UNIT REGISTRY SERVICE
// =====================================================================================

use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AdminError, ManagedUnit, UnitForm};

pub struct UnitService {
    supabase: Arc<SupabaseClient>,
}

fn parse_unit(row: Value) -> Result<ManagedUnit, AdminError> {
    serde_json::from_value(row).map_err(|e| AdminError::DatabaseError(format!("Failed to parse unit: {}", e)))
}

impl UnitService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    /// Every unit, inactive ones included, by name.
    pub async fn list_units(&self, auth_token: &str) -> Result<Vec<ManagedUnit>, AdminError> {
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, "/rest/v1/units?select=*&order=name.asc", Some(auth_token), None)
            .await?;

        rows.into_iter().map(parse_unit).collect()
    }

    pub async fn create_unit(&self, form: &UnitForm, auth_token: &str) -> Result<ManagedUnit, AdminError> {
        let form = form.validated()?;
        let mut row = form.to_row();
        row["active"] = json!(true);

        let result: Vec<Value> = self.supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/units",
                Some(auth_token),
                Some(row),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| AdminError::DatabaseError("Failed to create unit".to_string()))?;

        let unit = parse_unit(row)?;
        info!("Unit {} ({}) created", unit.id, unit.code);
        Ok(unit)
    }

    pub async fn update_unit(&self, unit_id: &str, form: &UnitForm, auth_token: &str) -> Result<ManagedUnit, AdminError> {
        let form = form.validated()?;
        self.patch(unit_id, form.to_row(), auth_token).await
    }

    /// Units are never deleted; deactivated ones stay for historical records.
    pub async fn deactivate_unit(&self, unit_id: &str, auth_token: &str) -> Result<ManagedUnit, AdminError> {
        self.patch(unit_id, json!({ "active": false }), auth_token).await
    }

    async fn patch(&self, unit_id: &str, body: Value, auth_token: &str) -> Result<ManagedUnit, AdminError> {
        let path = format!("/rest/v1/units?id=eq.{}", urlencoding::encode(unit_id));

        let result: Vec<Value> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(body),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        let Some(row) = result.into_iter().next() else {
            warn!("Update for unknown unit {}", unit_id);
            return Err(AdminError::UnitNotFound);
        };

        let unit = parse_unit(row)?;
        info!("Unit {} updated (active: {})", unit.id, unit.active);
        Ok(unit)
    }
}
