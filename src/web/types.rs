// src/web/types.rs
use rocket::serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct InspectRequest {
    pub url: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    pub error_code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, error_code: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            error_code: error_code.into(),
        }
    }
}
