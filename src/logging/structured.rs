//! Structured logging utilities.
//!
//! Provides context-aware logging with session_id and attempt_id included
//! in every log message.

use std::fmt;

use uuid::Uuid;

/// Logging context for one app session and, optionally, one network attempt.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub session_id: String,
    pub attempt_id: Option<String>,
}

impl LogContext {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            attempt_id: None,
        }
    }

    /// Fresh session context with a short random id.
    pub fn session() -> Self {
        Self::new(&format!("session-{}", short_id()))
    }

    pub fn with_attempt(&self, attempt_id: &str) -> Self {
        Self {
            session_id: self.session_id.clone(),
            attempt_id: Some(attempt_id.to_string()),
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attempt_id {
            Some(aid) => write!(f, "[session={}] [attempt={}]", self.session_id, aid),
            None => write!(f, "[session={}]", self.session_id),
        }
    }
}

/// First eight hex characters of a v4 UUID.
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Log an info message with context.
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),* $(,)?) => {
        log::info!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*), $($value),*)
        );
    };
}

/// Log a warning message with context.
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),* $(,)?) => {
        log::warn!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*), $($value),*)
        );
    };
}

/// Log a debug message with context.
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),* $(,)?) => {
        log::debug!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*), $($value),*)
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_context_display() {
        let ctx = LogContext::new("session-123");
        assert_eq!(format!("{}", ctx), "[session=session-123]");

        let ctx_with_attempt = ctx.with_attempt("submit-456");
        assert_eq!(
            format!("{}", ctx_with_attempt),
            "[session=session-123] [attempt=submit-456]"
        );
    }

    #[test]
    fn test_session_ids_are_short_and_distinct() {
        let a = LogContext::session();
        let b = LogContext::session();
        assert_eq!(a.session_id.len(), "session-".len() + 8);
        assert_ne!(a.session_id, b.session_id);
    }

    #[test]
    fn test_macros_accept_several_pairs() {
        let ctx = LogContext::new("session-1").with_attempt("report-1");
        crate::log_info!(ctx, "REPORT_SUBMIT_START", postal_code = "12345", bytes = 210);
        crate::log_warn!(ctx, "REPORT_SUBMIT_COMPLETE", outcome = "network_error");
        crate::log_debug!(ctx, "NOTHING_TO_ADD",);
    }
}
