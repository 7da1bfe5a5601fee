use chrono::{DateTime, Utc};

use crate::services::auth::UserRole;

/// Caller snapshot + URL for one privileged invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditContext {
    pub user_id: Option<i64>,
    pub user_role: Option<UserRole>,
    pub url: String,
}

/// Emitted before the privileged operation runs.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub user_id: Option<i64>,
    pub user_role: Option<UserRole>,
    pub url: String,
    /// Serialized request payload; `None` when the operation has no body input.
    pub request_body: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Emitted after the privileged operation returned successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditOutcome {
    pub user_id: Option<i64>,
    pub url: String,
    pub response_body: String,
    pub timestamp: DateTime<Utc>,
}

/// Emitted once per intercepted request, privileged or not.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessRecord {
    pub user_id: Option<i64>,
    pub user_role: Option<UserRole>,
    pub email: Option<String>,
    pub method: String,
    pub path: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    AuditRequest(AuditRecord),
    AuditResponse(AuditOutcome),
    Access(AccessRecord),
}
