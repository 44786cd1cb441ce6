// src/form/mod.rs
//! Form interaction: find fields on an unknown page, fill them, attach the CV,
//! submit and keep a screenshot.

pub mod controls;
pub mod engine;
pub mod fields;
pub mod session;
pub mod snapshot;
pub mod steps;
#[cfg(test)]
pub mod testing;

pub use controls::FormControl;
pub use engine::{FormEngine, SubmissionTarget};
pub use fields::{FieldTable, InteractionPatterns, LabelRule, ProfileField};
pub use session::{FormSession, SessionLauncher, ViewportSize};
pub use steps::{Step, StepReport, StepStatus};
