// src/form/fields.rs
//! Label patterns that tie visible form controls to profile attributes.

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::environment::{EngineConfig, FieldRuleConfig};
use crate::types::profile::Profile;

const UPLOAD_INVITATION: &str = "upload|choose file|browse";
const SUBMIT_INTENT: &str = "submit|apply|send";
const STANDARD_RULES: &[(ProfileField, &str)] = &[
    (ProfileField::FullName, "full name|name"),
    (ProfileField::Email, "email"),
    (ProfileField::Phone, "phone|mobile"),
];

// Compiled once; the built-in patterns are constants.
static STANDARD_PATTERNS: LazyLock<InteractionPatterns> = LazyLock::new(|| {
    InteractionPatterns::compile(&FieldTable::standard_rules(), UPLOAD_INVITATION, SUBMIT_INTENT)
        .expect("built-in interaction patterns")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    FullName,
    Email,
    Phone,
    Location,
    Headline,
}

impl ProfileField {
    pub fn value<'p>(&self, profile: &'p Profile) -> Option<&'p str> {
        match self {
            ProfileField::FullName => Some(profile.full_name.as_str()),
            ProfileField::Email => Some(profile.email.as_str()),
            ProfileField::Phone => Some(profile.phone.as_str()),
            ProfileField::Location => profile.location.as_deref(),
            ProfileField::Headline => profile.headline.as_deref(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::FullName => "full_name",
            ProfileField::Email => "email",
            ProfileField::Phone => "phone",
            ProfileField::Location => "location",
            ProfileField::Headline => "headline",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .with_context(|| format!("Invalid pattern: {}", pattern))
}

/// One row of the label table.
#[derive(Debug, Clone)]
pub struct LabelRule {
    pub field: ProfileField,
    pattern: Regex,
}

impl LabelRule {
    pub fn new(field: ProfileField, pattern: &str) -> Result<Self> {
        Ok(Self {
            field,
            pattern: case_insensitive(pattern)?,
        })
    }

    pub fn matches(&self, label: &str) -> bool {
        self.pattern.is_match(label)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Ordered (pattern, attribute) table. Rules are tried in order, one fill per rule.
#[derive(Debug, Clone)]
pub struct FieldTable {
    rules: Vec<LabelRule>,
}

impl FieldTable {
    pub fn standard() -> Self {
        STANDARD_PATTERNS.fields.clone()
    }

    fn standard_rules() -> Vec<FieldRuleConfig> {
        STANDARD_RULES
            .iter()
            .map(|(field, pattern)| FieldRuleConfig {
                field: *field,
                pattern: pattern.to_string(),
            })
            .collect()
    }

    pub fn from_config(rules: &[FieldRuleConfig]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| LabelRule::new(rule.field, &rule.pattern))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn with_rule(mut self, rule: LabelRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[LabelRule] {
        &self.rules
    }
}

/// Everything the engine matches against: the label table plus the upload and
/// submit vocabularies.
#[derive(Debug, Clone)]
pub struct InteractionPatterns {
    pub fields: FieldTable,
    pub upload_invitation: Regex,
    pub submit_intent: Regex,
}

impl InteractionPatterns {
    pub fn standard() -> Self {
        STANDARD_PATTERNS.clone()
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let fields = match &config.field_rules {
            Some(rules) => FieldTable::from_config(rules)?,
            None => FieldTable::standard(),
        };

        Ok(Self {
            fields,
            upload_invitation: case_insensitive(
                config.upload_pattern.as_deref().unwrap_or(UPLOAD_INVITATION),
            )?,
            submit_intent: case_insensitive(
                config.submit_pattern.as_deref().unwrap_or(SUBMIT_INTENT),
            )?,
        })
    }

    fn compile(rules: &[FieldRuleConfig], upload: &str, submit: &str) -> Result<Self> {
        Ok(Self {
            fields: FieldTable::from_config(rules)?,
            upload_invitation: case_insensitive(upload)?,
            submit_intent: case_insensitive(submit)?,
        })
    }
}
