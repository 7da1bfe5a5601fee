//! Path-prefix rules for the auth gate.
//!
//! Matching is a plain `starts_with` on the request path, so `/authors`
//! falls under a `/auth` bypass prefix as well.

use crate::config::{Config, DEFAULT_BYPASS_PREFIX, DEFAULT_PRIVILEGED_PREFIX};
use crate::services::auth::UserRole;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPolicy {
    bypass_prefixes: Vec<String>,
    privileged_prefixes: Vec<String>,
    admin_role: UserRole,
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self::new(
            vec![DEFAULT_BYPASS_PREFIX.to_string()],
            vec![DEFAULT_PRIVILEGED_PREFIX.to_string()],
        )
    }
}

impl PathPolicy {
    pub fn new(bypass_prefixes: Vec<String>, privileged_prefixes: Vec<String>) -> Self {
        Self {
            bypass_prefixes,
            privileged_prefixes,
            admin_role: UserRole::Admin,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.bypass_prefixes.clone(),
            config.privileged_prefixes.clone(),
        )
    }

    /// No token is required under these prefixes.
    pub fn is_bypassed(&self, path: &str) -> bool {
        self.bypass_prefixes.iter().any(|p| path.starts_with(p))
    }

    pub fn is_privileged(&self, path: &str) -> bool {
        self.privileged_prefixes.iter().any(|p| path.starts_with(p))
    }

    pub fn permits(&self, path: &str, role: UserRole) -> bool {
        !self.is_privileged(path) || role == self.admin_role
    }
}
