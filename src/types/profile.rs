// src/types/profile.rs
//! Applicant profile, in the camelCase JSON shape profiles are stored in.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default)]
    pub experience: Vec<Experience>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

impl Profile {
    /// Placeholder identity used when a requested profile is not stored.
    pub fn placeholder() -> Self {
        Self {
            full_name: "Alex Applicant".to_string(),
            email: "alex.applicant@example.com".to_string(),
            phone: "+1 555 010 0100".to_string(),
            location: Some("Remote".to_string()),
            headline: Some("Operations & Customer Success".to_string()),
            experience: vec![Experience {
                title: "Operations Lead".to_string(),
                company: "Example Corp".to_string(),
                start: "2019".to_string(),
                end: "2024".to_string(),
                bullets: vec![
                    "Ran regional onboarding for new merchant accounts.".to_string(),
                    "Cut average ticket resolution time by a third.".to_string(),
                ],
            }],
        }
    }
}
