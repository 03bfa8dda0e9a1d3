//! Shared error taxonomy for the coaching pipeline.
//!
//! The data path never propagates errors as control flow (spec §7): every
//! component converts its own failures into a [`CoachError`], classifies it
//! with [`CoachError::kind`] and [`CoachError::severity`], and reports it to
//! an observability channel rather than aborting the pipeline.

use std::fmt;

/// Error taxonomy kinds, matching the five kinds in the coaching
/// pipeline's error handling design (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Simulator connection lost, network timeout, file lock, recovered
    /// locally with backoff, never surfaced past the component.
    TransientIo,
    /// Schema violation, unit out of range, non-monotonic timestamp.
    DataIntegrity,
    /// A record violates a structural invariant (negative lap time,
    /// sector-sum mismatch beyond tolerance).
    InvariantViolation,
    /// A rate limit or budget was exhausted; handled by graceful
    /// degradation.
    BudgetExhausted,
    /// Unrecoverable corruption; the component disables the affected
    /// capability for the session and notifies the supervisor.
    Fatal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::TransientIo => "transient_io",
            ErrorKind::DataIntegrity => "data_integrity",
            ErrorKind::InvariantViolation => "invariant_violation",
            ErrorKind::BudgetExhausted => "budget_exhausted",
            ErrorKind::Fatal => "fatal",
        };
        write!(f, "{s}")
    }
}

/// Severity level, ordered so `>=` comparisons make sense for escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl ErrorKind {
    /// Default severity for this kind, absent a more specific judgment at
    /// the call site.
    pub fn default_severity(self) -> Severity {
        match self {
            ErrorKind::TransientIo => Severity::Warning,
            ErrorKind::DataIntegrity => Severity::Warning,
            ErrorKind::InvariantViolation => Severity::Error,
            ErrorKind::BudgetExhausted => Severity::Info,
            ErrorKind::Fatal => Severity::Critical,
        }
    }
}

/// Additional key/value context attached to an error, rendered into log
/// events rather than into control flow.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub operation: String,
    pub fields: Vec<(String, String)>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation: {}", self.operation)?;
        for (k, v) in &self.fields {
            write!(f, ", {k}: {v}")?;
        }
        Ok(())
    }
}

/// Unified error type returned by coaching-pipeline components.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}{}", context.as_ref().map(|c| format!(" ({c})")).unwrap_or_default())]
pub struct CoachError {
    kind: ErrorKind,
    severity: Severity,
    message: String,
    context: Option<ErrorContext>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl CoachError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            severity: kind.default_severity(),
            kind,
            message: message.into(),
            context: None,
            source: None,
        }
    }

    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn transient_io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransientIo, message)
    }

    pub fn data_integrity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataIntegrity, message)
    }

    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvariantViolation, message)
    }

    pub fn budget_exhausted(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BudgetExhausted, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fatal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// An error is recoverable if its severity never reached `Critical`.
    pub fn is_recoverable(&self) -> bool {
        self.severity < Severity::Critical
    }
}

impl From<std::io::Error> for CoachError {
    fn from(e: std::io::Error) -> Self {
        CoachError::transient_io(e.to_string()).with_source(e)
    }
}

impl From<serde_json::Error> for CoachError {
    fn from(e: serde_json::Error) -> Self {
        CoachError::data_integrity(e.to_string()).with_source(e)
    }
}

pub type Result<T> = std::result::Result<T, CoachError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Critical > Severity::Error);
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn default_severities_match_taxonomy() {
        assert_eq!(ErrorKind::Fatal.default_severity(), Severity::Critical);
        assert_eq!(
            ErrorKind::InvariantViolation.default_severity(),
            Severity::Error
        );
    }

    #[test]
    fn is_recoverable_below_critical() {
        let err = CoachError::data_integrity("bad sample");
        assert!(err.is_recoverable());
        let fatal = CoachError::fatal("disk gone");
        assert!(!fatal.is_recoverable());
    }

    #[test]
    fn context_renders_in_display() {
        let err = CoachError::invariant_violation("sector sum mismatch")
            .with_context(ErrorContext::new("lap_complete").with("lap", "12"));
        let rendered = err.to_string();
        assert!(rendered.contains("lap_complete"));
        assert!(rendered.contains("lap: 12"));
    }
}
