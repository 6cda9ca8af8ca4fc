use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

/// Application role of the signed-in staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Supervisor,
    Staff,
}

impl UserRole {
    /// Unknown or missing roles get the most restricted view.
    pub fn from_claim(raw: Option<&str>) -> Self {
        match raw.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
            Some("admin") => UserRole::Admin,
            Some("supervisor") => UserRole::Supervisor,
            _ => UserRole::Staff,
        }
    }
}

/// Which units a query covers once the viewer's permissions are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "unit_id")]
pub enum UnitScope {
    All,
    Unit(String),
}

impl UnitScope {
    /// `"all"` and blank values select every unit.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None | Some("all") => UnitScope::All,
            Some(id) => UnitScope::Unit(id.to_string()),
        }
    }

    pub fn includes(&self, unit_id: Option<&str>) -> bool {
        match self {
            UnitScope::All => true,
            UnitScope::Unit(id) => unit_id == Some(id.as_str()),
        }
    }

    pub fn unit_id(&self) -> Option<&str> {
        match self {
            UnitScope::All => None,
            UnitScope::Unit(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub unit_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_supervisor(&self) -> bool {
        self.role == UserRole::Supervisor
    }

    pub fn can_view_all_units(&self) -> bool {
        self.is_admin() || self.is_supervisor()
    }

    pub fn home_unit_id(&self) -> Option<&str> {
        self.unit_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Regular staff are pinned to their home unit whatever they ask for.
    /// Staff without a home unit, admins and supervisors get the requested scope.
    pub fn resolve_unit_scope(&self, requested: Option<&str>) -> UnitScope {
        if !self.can_view_all_units() {
            if let Some(home) = self.home_unit_id() {
                return UnitScope::Unit(home.to_string());
            }
        }
        UnitScope::from_param(requested)
    }
}
