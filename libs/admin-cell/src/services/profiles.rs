// =====================================================================================
// PROFILE APPROVAL SERVICE
// =====================================================================================

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AdminError, ApprovalDecision, PendingProfile, Profile, ProfileStatus, UnitSummary};

pub struct ProfileService {
    supabase: Arc<SupabaseClient>,
}

/// Pairs each profile with its requested unit. Unknown unit ids leave `unit` empty.
pub fn attach_units(profiles: Vec<Profile>, units: &[UnitSummary]) -> Vec<PendingProfile> {
    let by_id: HashMap<&str, &UnitSummary> = units.iter().map(|u| (u.id.as_str(), u)).collect();

    profiles
        .into_iter()
        .map(|profile| {
            let unit = profile
                .unit_id
                .as_deref()
                .and_then(|id| by_id.get(id))
                .map(|unit| (*unit).clone());
            PendingProfile { profile, unit }
        })
        .collect()
}

impl ProfileService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, auth_token: &str) -> Result<Vec<T>, AdminError> {
        let rows: Vec<Value> = self.supabase
            .request(Method::GET, path, Some(auth_token), None)
            .await?;

        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| AdminError::DatabaseError(format!("Failed to parse row: {}", e)))
            })
            .collect()
    }

    /// Profiles awaiting a decision, newest first.
    pub async fn list_pending(&self, auth_token: &str) -> Result<Vec<PendingProfile>, AdminError> {
        let (profiles, units) = futures::try_join!(
            self.fetch::<Profile>("/rest/v1/profiles?select=*&status=eq.pending&order=created_at.desc", auth_token),
            self.fetch::<UnitSummary>("/rest/v1/units?select=id,name,code", auth_token),
        )?;

        debug!("{} pending profiles, {} units", profiles.len(), units.len());
        Ok(attach_units(profiles, &units))
    }

    /// Moves a pending profile to the decision's status. Profiles that were
    /// already decided are not touched and report as not found.
    pub async fn decide(
        &self,
        profile_id: &str,
        decision: ApprovalDecision,
        auth_token: &str,
    ) -> Result<Profile, AdminError> {
        let status = decision.target_status();
        let path = format!(
            "/rest/v1/profiles?id=eq.{}&status=eq.{}",
            urlencoding::encode(profile_id),
            ProfileStatus::Pending
        );

        let result: Vec<Value> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(json!({ "status": status })),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        let Some(row) = result.into_iter().next() else {
            warn!("No pending profile {} to {:?}", profile_id, decision);
            return Err(AdminError::ProfileNotFound);
        };

        let profile: Profile = serde_json::from_value(row)
            .map_err(|e| AdminError::DatabaseError(format!("Failed to parse profile: {}", e)))?;

        info!("Profile {} is now {}", profile.id, profile.status);
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, unit_id: Option<&str>) -> Profile {
        Profile {
            id: id.to_string(),
            full_name: Some("Joana Prado".to_string()),
            email: Some("joana@example.com".to_string()),
            role: Some("staff".to_string()),
            unit_id: unit_id.map(str::to_string),
            status: ProfileStatus::Pending,
            created_at: None,
        }
    }

    #[test]
    fn test_attach_units_by_id() {
        let units = vec![UnitSummary { id: "north".into(), name: "North Clinic".into(), code: "N".into() }];
        let pending = attach_units(
            vec![profile("p1", Some("north")), profile("p2", Some("gone")), profile("p3", None)],
            &units,
        );

        assert_eq!(pending.len(), 3);
        assert_eq!(pending[0].unit.as_ref().map(|u| u.code.as_str()), Some("N"));
        assert!(pending[1].unit.is_none());
        assert!(pending[2].unit.is_none());
        assert_eq!(pending[1].profile.id, "p2");
    }
}
