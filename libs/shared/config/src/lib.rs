use std::env;

use chrono::{FixedOffset, Offset, Utc};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    /// Offset of the clinic's wall clock from UTC, in minutes. Slot labels are
    /// matched against appointment times rendered in this offset.
    pub clinic_utc_offset_minutes: i32,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            clinic_utc_offset_minutes: env::var("CLINIC_UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|raw| match raw.parse::<i32>() {
                    Ok(minutes) => Some(minutes),
                    Err(_) => {
                        warn!("CLINIC_UTC_OFFSET_MINUTES is not a number: {}", raw);
                        None
                    }
                })
                .unwrap_or(0),
            port: env::var("PORT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(3000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    /// Clinic wall-clock offset. Out-of-range values fall back to UTC.
    pub fn clinic_offset(&self) -> FixedOffset {
        self.clinic_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                warn!(
                    "Clinic offset of {} minutes is out of range, using UTC",
                    self.clinic_utc_offset_minutes
                );
                Utc.fix()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_offset(minutes: i32) -> AppConfig {
        AppConfig {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "anon".to_string(),
            supabase_jwt_secret: "secret".to_string(),
            clinic_utc_offset_minutes: minutes,
            port: 3000,
        }
    }

    #[test]
    fn test_clinic_offset_in_range() {
        let config = config_with_offset(-180);
        assert_eq!(config.clinic_offset().local_minus_utc(), -180 * 60);
    }

    #[test]
    fn test_clinic_offset_out_of_range_falls_back_to_utc() {
        let config = config_with_offset(60 * 48);
        assert_eq!(config.clinic_offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_clinic_offset_overflowing_minutes_falls_back_to_utc() {
        assert_eq!(config_with_offset(i32::MAX).clinic_offset().local_minus_utc(), 0);
        assert_eq!(config_with_offset(i32::MIN).clinic_offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_is_configured() {
        assert!(config_with_offset(0).is_configured());

        let mut config = config_with_offset(0);
        config.supabase_jwt_secret.clear();
        assert!(!config.is_configured());
    }
}
