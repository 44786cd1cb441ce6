// src/form/steps.rs
//! Per-step bookkeeping for a submission attempt. A step may fail without
//! ending the attempt; the log keeps what happened to each one.

use serde::Serialize;
use std::fmt;

use super::fields::ProfileField;
use crate::app_log;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum Step {
    Fill(ProfileField),
    Upload,
    Submit,
    CaptureProof,
    Snapshot,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Fill(field) => write!(f, "fill {}", field),
            Step::Upload => f.write_str("upload"),
            Step::Submit => f.write_str("submit"),
            Step::CaptureProof => f.write_str("capture proof"),
            Step::Snapshot => f.write_str("snapshot"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum StepStatus {
    Completed(String),
    /// Nothing on the page to act on.
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: Step,
    #[serde(flatten)]
    pub status: StepStatus,
}

impl StepReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, StepStatus::Completed(_))
    }
}

#[derive(Debug, Default)]
pub struct StepLog {
    reports: Vec<StepReport>,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of a step and report whether it completed. Errors are
    /// logged and kept as `Failed`, never propagated.
    pub fn record(&mut self, step: Step, result: anyhow::Result<StepStatus>) -> bool {
        let status = match result {
            Ok(status) => status,
            Err(e) => StepStatus::Failed(format!("{:#}", e)),
        };

        match &status {
            StepStatus::Completed(detail) => app_log!(info, "Step '{}' completed: {}", step, detail),
            StepStatus::Skipped(reason) => app_log!(info, "Step '{}' skipped: {}", step, reason),
            StepStatus::Failed(reason) => app_log!(warn, "Step '{}' failed: {}", step, reason),
        }

        let completed = matches!(status, StepStatus::Completed(_));
        self.reports.push(StepReport { step, status });
        completed
    }

    pub fn status_of(&self, step: Step) -> Option<&StepStatus> {
        self.reports
            .iter()
            .rev()
            .find(|r| r.step == step)
            .map(|r| &r.status)
    }

    pub fn into_reports(self) -> Vec<StepReport> {
        self.reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_record_keeps_failures_without_propagating() {
        let mut log = StepLog::new();

        assert!(log.record(
            Step::Fill(ProfileField::Email),
            Ok(StepStatus::Completed("<input> \"Email\"".to_string()))
        ));
        assert!(!log.record(Step::Upload, Err(anyhow!("element detached"))));
        assert!(!log.record(Step::Submit, Ok(StepStatus::Skipped("no submit control".to_string()))));

        assert_eq!(
            log.status_of(Step::Upload),
            Some(&StepStatus::Failed("element detached".to_string()))
        );
        assert!(log.status_of(Step::CaptureProof).is_none());
        assert_eq!(log.into_reports().len(), 3);
    }

    #[test]
    fn test_report_serialization() {
        let report = StepReport {
            step: Step::Fill(ProfileField::FullName),
            status: StepStatus::Completed("filled".to_string()),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["step"]["kind"], "fill");
        assert_eq!(json["step"]["field"], "full_name");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["detail"], "filled");

        let upload = StepReport {
            step: Step::Upload,
            status: StepStatus::Skipped("nothing to attach to".to_string()),
        };
        let json = serde_json::to_value(&upload).unwrap();
        assert_eq!(json["step"]["kind"], "upload");
        assert_eq!(json["status"], "skipped");
    }

    #[test]
    fn test_step_display() {
        assert_eq!(Step::Fill(ProfileField::Phone).to_string(), "fill phone");
        assert_eq!(Step::CaptureProof.to_string(), "capture proof");
    }
}
