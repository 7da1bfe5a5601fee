use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of caller roles carried in the `userRole` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    // Case-sensitive: "admin" is not a role.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated token payload. Built fresh per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,
    pub email: Option<String>,
    pub role: UserRole,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

/// Wire form of the JWT payload.
///
/// Fields are kept as raw JSON values so that a verified token with a missing
/// or mistyped claim is reported as `INVALID_CLAIMS` rather than a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
    #[serde(rename = "userRole", default, skip_serializing_if = "Option::is_none")]
    pub user_role: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<Value>,
}

impl From<&Claims> for TokenClaims {
    fn from(c: &Claims) -> Self {
        Self {
            sub: Some(Value::from(c.user_id.to_string())),
            email: c.email.clone().map(Value::from),
            user_role: Some(Value::from(c.role.as_str())),
            exp: Some(Value::from(c.expires_at.timestamp())),
            iat: c.issued_at.map(|t| Value::from(t.timestamp())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_exact() {
        assert_eq!("ADMIN".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!("USER".parse::<UserRole>(), Ok(UserRole::User));
        assert_eq!(
            "admin".parse::<UserRole>(),
            Err(UnknownRole("admin".to_string()))
        );
        assert!("SUPERUSER".parse::<UserRole>().is_err());
    }

    #[test]
    fn wire_form_writes_sub_as_string() {
        let claims = Claims {
            user_id: 9,
            email: None,
            role: UserRole::User,
            issued_at: None,
            expires_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };

        let wire = serde_json::to_value(TokenClaims::from(&claims)).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({"sub": "9", "userRole": "USER", "exp": 1_700_000_000})
        );
    }

    #[test]
    fn role_serializes_as_upper_case() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"ADMIN\"");
    }
}
