/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - codec: ClaimsCodec, policy: PathPolicy, recorder: AuditRecorder, log_sink
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - 起動後は read-only (request 毎の状態は extensions に置く)
 */
use std::sync::Arc;

use crate::middleware::auth::PathPolicy;
use crate::services::audit::{AuditRecorder, LogSink};
use crate::services::auth::ClaimsCodec;

#[derive(Clone, Debug)]
pub struct AppState {
    pub codec: Arc<ClaimsCodec>,
    pub policy: Arc<PathPolicy>,
    pub recorder: Arc<AuditRecorder>,
    pub log_sink: Arc<dyn LogSink>,
}

impl AppState {
    pub fn new(codec: Arc<ClaimsCodec>, policy: PathPolicy, log_sink: Arc<dyn LogSink>) -> Self {
        let recorder = Arc::new(AuditRecorder::new(log_sink.clone()));
        Self {
            codec,
            policy: Arc::new(policy),
            recorder,
            log_sink,
        }
    }
}
