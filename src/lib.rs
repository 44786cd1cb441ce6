// src/lib.rs
//! Job-application worker: renders a tailored CV and submits it through an
//! unknown web form, keeping a screenshot as proof of every attempt.

pub mod browser;
pub mod cli;
pub mod core;
pub mod environment;
pub mod error;
pub mod form;
pub mod generator;
pub mod inspect;
pub mod profile_store;
pub mod render;
pub mod service;
pub mod types;
pub mod utils;
pub mod web;

pub use environment::AppConfig;
pub use error::ApplyError;
pub use form::{FormEngine, SubmissionTarget};
pub use generator::DocumentGenerator;
pub use profile_store::ProfileStore;
pub use service::ApplicationService;
pub use types::profile::{Experience, Profile};
pub use types::response::{ApplyRequest, ApplyResponse, Document, SubmissionOutcome};
pub use web::start_web_server;

/// Log through `tracing` with the level given as the first token.
#[macro_export]
macro_rules! app_log {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!($($arg)+)
    };
}

/// Open an info-level span; fields follow the `tracing` field syntax.
#[macro_export]
macro_rules! app_span {
    ($name:expr) => {
        ::tracing::info_span!($name)
    };
    ($name:expr, $($fields:tt)+) => {
        ::tracing::info_span!($name, $($fields)+)
    };
}
