//! Audit trail for privileged operations and the per-request access log.
//!
//! Both write through [`LogSink`]; the log backend itself is not owned here.

pub mod record;
pub mod recorder;
pub mod sink;

pub use record::{AccessRecord, AuditContext, AuditOutcome, AuditRecord, LogEvent};
pub use recorder::{AuditError, AuditRecorder, AuditStage};
pub use sink::{LogSink, TracingLogSink};
