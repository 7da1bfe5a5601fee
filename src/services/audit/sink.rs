use std::fmt;

use crate::services::audit::record::LogEvent;

/// Destination for audit/access log events.
///
/// Implementations must not block; the default forwards to `tracing`.
pub trait LogSink: Send + Sync + fmt::Debug {
    fn emit(&self, event: LogEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn emit(&self, event: LogEvent) {
        match event {
            LogEvent::AuditRequest(r) => tracing::info!(
                target: "audit",
                user_id = ?r.user_id,
                user_role = ?r.user_role,
                timestamp = %r.timestamp,
                url = %r.url,
                request_body = %r.request_body.as_deref().unwrap_or("null"),
                "privileged request"
            ),
            LogEvent::AuditResponse(r) => tracing::info!(
                target: "audit",
                user_id = ?r.user_id,
                timestamp = %r.timestamp,
                url = %r.url,
                response_body = %r.response_body,
                "privileged response"
            ),
            LogEvent::Access(r) => tracing::info!(
                target: "access",
                user_id = ?r.user_id,
                user_role = ?r.user_role,
                email = ?r.email,
                method = %r.method,
                path = %r.path,
                timestamp = %r.timestamp,
                "request intercepted"
            ),
        }
    }
}
