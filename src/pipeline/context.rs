//! Attempt context management.
//!
//! Every network call gets its own attempt id for log correlation.

use chrono::{DateTime, Utc};

use crate::logging::structured::{short_id, LogContext};

/// What a network attempt is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptKind {
    Report,
    Registration,
}

impl AttemptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptKind::Report => "report",
            AttemptKind::Registration => "register",
        }
    }
}

/// Context for a single submit or register call.
#[derive(Debug, Clone)]
pub struct AttemptContext {
    pub attempt_id: String,
    pub kind: AttemptKind,
    pub started_at: DateTime<Utc>,
    log_ctx: LogContext,
}

impl AttemptContext {
    pub fn new(session: &LogContext, kind: AttemptKind) -> Self {
        let attempt_id = format!("{}-{}", kind.as_str(), short_id());
        Self {
            log_ctx: session.with_attempt(&attempt_id),
            attempt_id,
            kind,
            started_at: Utc::now(),
        }
    }

    pub fn log_context(&self) -> &LogContext {
        &self.log_ctx
    }

    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}
