use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{User, UserRole};

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub clinic_utc_offset_minutes: i32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            clinic_utc_offset_minutes: 0,
        }
    }
}

impl TestConfig {
    /// Points the config at a mock PostgREST server.
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            clinic_utc_offset_minutes: self.clinic_utc_offset_minutes,
            port: 3000,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub unit_id: Option<String>,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "staff".to_string(),
            unit_id: None,
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str, unit_id: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
            unit_id: unit_id.map(str::to_string),
        }
    }

    pub fn staff(unit_id: &str) -> Self {
        Self::new("staff@example.com", "staff", Some(unit_id))
    }

    pub fn supervisor(unit_id: &str) -> Self {
        Self::new("supervisor@example.com", "supervisor", Some(unit_id))
    }

    pub fn admin() -> Self {
        Self::new("admin@example.com", "admin", None)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: UserRole::from_claim(Some(&self.role)),
            unit_id: self.unit_id.clone(),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": "authenticated",
            "app_metadata": {
                "role": user.role,
                "unit_id": user.unit_id,
            },
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Row fixtures shaped like the PostgREST responses for the lab tables.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn unit_response(id: &str, name: &str, code: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "code": code
        })
    }

    pub fn doctor_response(id: &str, name: &str, specialty: Option<&str>, unit_id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "specialty": specialty,
            "crm": "CRM-12345",
            "email": null,
            "phone": null,
            "unit_id": unit_id
        })
    }

    pub fn exam_type_response(id: &str, name: &str, category: Option<&str>, cost: f64) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "category": category,
            "description": null,
            "duration_minutes": 30,
            "cost": cost,
            "requires_preparation": false,
            "preparation_instructions": null,
            "active": true
        })
    }

    pub fn appointment_response(
        id: &str,
        doctor_id: &str,
        unit_id: &str,
        scheduled_date: &str,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "patient_name": "Maria Silva",
            "scheduled_date": scheduled_date,
            "doctor_id": doctor_id,
            "unit_id": unit_id,
            "exam_type_id": null,
            "status": status,
            "cost": 120.0,
            "notes": null
        })
    }

    pub fn profile_response(id: &str, full_name: &str, unit_id: Option<&str>, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "full_name": full_name,
            "email": format!("{}@example.com", id),
            "role": "staff",
            "unit_id": unit_id,
            "status": status,
            "created_at": "2026-03-01T12:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "error": {
                "message": message,
                "code": code
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(!app_config.supabase_jwt_secret.is_empty());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::supervisor("unit-a");
        assert_eq!(user.role, "supervisor");

        let user_model = user.to_user();
        assert_eq!(user_model.role, UserRole::Supervisor);
        assert_eq!(user_model.unit_id.as_deref(), Some("unit-a"));
        assert_eq!(user_model.id, user.id);
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let token = JwtTestUtils::create_test_token(&user, "test-secret", Some(1));

        assert_eq!(token.split('.').count(), 3);
    }
}
