use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use chrono::{Utc, TimeZone};
use serde_json::Value;
use tracing::debug;
use shared_models::auth::{JwtClaims, JwtHeader, User, UserRole};

type HmacSha256 = Hmac<Sha256>;

/// Validates an HS256 token issued by the hosted auth service and lifts the
/// staff context (role, home unit) out of `app_metadata`.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let header: JwtHeader = decode_segment(header_b64)
        .map_err(|_| "Invalid header encoding".to_string())?;
    if header.alg != "HS256" {
        debug!("Rejecting token signed with {}", header.alg);
        return Err("Unsupported token algorithm".to_string());
    }

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let signature_string = format!("{}.{}", header_b64, claims_b64);

    let mut mac = match HmacSha256::new_from_slice(jwt_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return Err("Failed to create HMAC".to_string()),
    };

    mac.update(signature_string.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims: JwtClaims = match decode_segment(claims_b64) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            return Err("Invalid claims format".to_string());
        },
    };

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    let created_at = claims.iat
        .and_then(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    let app_metadata = claims.app_metadata.as_ref();
    let role = UserRole::from_claim(metadata_str(app_metadata, "role"));
    let unit_id = metadata_str(app_metadata, "unit_id").map(str::to_string);

    let user = User {
        id: claims.sub,
        email: claims.email,
        role,
        unit_id,
        created_at,
    };

    debug!("Token validated successfully for user: {} ({:?})", user.id, user.role);
    Ok(user)
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, String> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).map_err(|e| e.to_string())?;
    serde_json::from_slice(&bytes).map_err(|e| e.to_string())
}

fn metadata_str<'a>(metadata: Option<&'a Value>, key: &str) -> Option<&'a str> {
    metadata?.get(key)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{JwtTestUtils, TestUser};

    const SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

    #[test]
    fn test_valid_token_carries_role_and_unit() {
        let test_user = TestUser::supervisor("unit-north");
        let token = JwtTestUtils::create_test_token(&test_user, SECRET, Some(1));

        let user = validate_token(&token, SECRET).unwrap();
        assert_eq!(user.id, test_user.id);
        assert_eq!(user.role, UserRole::Supervisor);
        assert_eq!(user.unit_id.as_deref(), Some("unit-north"));
        assert!(user.created_at.is_some());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = JwtTestUtils::create_expired_token(&TestUser::default(), SECRET);
        assert_eq!(validate_token(&token, SECRET).unwrap_err(), "Token expired");
    }

    #[test]
    fn test_wrong_signature_rejected() {
        let token = JwtTestUtils::create_invalid_signature_token(&TestUser::default());
        assert_eq!(validate_token(&token, SECRET).unwrap_err(), "Invalid token signature");
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(validate_token(&JwtTestUtils::create_malformed_token(), SECRET).is_err());
        assert_eq!(validate_token("only.two", SECRET).unwrap_err(), "Invalid token format");
    }

    #[test]
    fn test_missing_secret_rejected() {
        let token = JwtTestUtils::create_test_token(&TestUser::default(), SECRET, None);
        assert_eq!(validate_token(&token, "").unwrap_err(), "JWT secret is not set");
    }
}
