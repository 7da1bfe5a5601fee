use std::fmt;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::services::audit::record::{AuditContext, AuditOutcome, AuditRecord, LogEvent};
use crate::services::audit::sink::LogSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditStage {
    Request,
    Response,
}

impl fmt::Display for AuditStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Response => f.write_str("response"),
        }
    }
}

/// A payload could not be encoded for the audit trail.
#[derive(Debug, Error)]
#[error("failed to serialize audit {stage} payload")]
pub struct AuditError {
    pub stage: AuditStage,
    #[source]
    source: serde_json::Error,
}

impl AuditError {
    fn at(stage: AuditStage) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self { stage, source }
    }
}

/// Wraps privileged operations with a before/after audit log pair.
#[derive(Debug, Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn LogSink>,
}

impl AuditRecorder {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Log `body`, run `op`, log its result.
    ///
    /// Errors from `op` are returned untouched and leave only the request record.
    /// A payload that cannot be serialized surfaces as `E::from(AuditError)`;
    /// for the request payload this happens before `op` is polled.
    pub async fn record<B, T, E, F>(
        &self,
        ctx: &AuditContext,
        body: Option<&B>,
        op: F,
    ) -> Result<T, E>
    where
        B: Serialize + ?Sized,
        T: Serialize,
        E: From<AuditError>,
        F: Future<Output = Result<T, E>>,
    {
        let request_body = body
            .map(|b| serde_json::to_string(b))
            .transpose()
            .map_err(AuditError::at(AuditStage::Request))?;

        self.sink.emit(LogEvent::AuditRequest(AuditRecord {
            user_id: ctx.user_id,
            user_role: ctx.user_role,
            url: ctx.url.clone(),
            request_body,
            timestamp: Utc::now(),
        }));

        let result = op.await?;

        let response_body =
            serde_json::to_string(&result).map_err(AuditError::at(AuditStage::Response))?;

        self.sink.emit(LogEvent::AuditResponse(AuditOutcome {
            user_id: ctx.user_id,
            url: ctx.url.clone(),
            response_body,
            timestamp: Utc::now(),
        }));

        Ok(result)
    }
}
