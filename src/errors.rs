// src/errors.rs

use thiserror::Error;

/// Failure of a single step. Steps never panic or raise across the
/// orchestrator boundary; every outcome becomes one of these variants or a
/// tolerated skip.
#[derive(Debug, Error)]
pub enum StepError {
    /// The underlying platform call failed.
    #[error(transparent)]
    Adapter(#[from] anyhow::Error),

    /// The step's target must exist and did not.
    #[error("{target} was not found")]
    TargetMissing { target: String },

    /// An external command ran to completion but reported failure.
    #[error("`{program}` exited with code {code}")]
    CommandFailed { program: String, code: i32 },
}

/// One recorded failure, named after the step that produced it. Steps inside
/// a nested batch carry the sub-batch title as a prefix for traceability.
#[derive(Debug)]
pub struct FailureRecord {
    pub step: String,
    pub error: StepError,
}

/// Outcome of one `Orchestrator::execute` call. A batch either ran to
/// completion (possibly with recorded failures) or was cancelled; steps not
/// yet started when cancellation hit are omitted, not marked failed.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub failures: Vec<FailureRecord>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn success(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_displays_program_and_code() {
        let err = StepError::CommandFailed {
            program: "winget".to_string(),
            code: 3,
        };
        assert_eq!(err.to_string(), "`winget` exited with code 3");
    }

    #[test]
    fn target_missing_displays_target() {
        let err = StepError::TargetMissing {
            target: "scheduled task `\\Foo\\Bar`".to_string(),
        };
        assert_eq!(err.to_string(), "scheduled task `\\Foo\\Bar` was not found");
    }

    #[test]
    fn empty_report_is_success() {
        assert!(BatchReport::default().success());
        let cancelled = BatchReport {
            failures: Vec::new(),
            cancelled: true,
        };
        assert!(!cancelled.success());
    }
}
