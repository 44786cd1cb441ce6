// src/form/controls.rs
//! Inventory of interactive elements on a page and the rules for picking one.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::fields::LabelRule;

/// Attribute the inventory stamps on every element it reports, so later
/// actions can address the exact same node.
pub const REF_ATTRIBUTE: &str = "data-apply-ref";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormControl {
    #[serde(rename = "ref")]
    pub reference: u32,
    pub tag: String,
    #[serde(default)]
    pub input_type: Option<String>,
    /// Accessible label: aria-labelledby, aria-label, then associated `<label>`s.
    #[serde(default)]
    pub label: Option<String>,
    /// Accessible name, as used for buttons.
    #[serde(default)]
    pub name: Option<String>,
    /// Text directly inside the element, children excluded.
    #[serde(default)]
    pub text: Option<String>,
    pub visible: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub text_entry: bool,
    #[serde(default)]
    pub file_input: bool,
    #[serde(default)]
    pub button: bool,
}

impl FormControl {
    pub fn selector(&self) -> String {
        format!("[{}=\"{}\"]", REF_ATTRIBUTE, self.reference)
    }

    /// Short human description for step reports and logs.
    pub fn describe(&self) -> String {
        let mut description = match &self.input_type {
            Some(kind) => format!("<{} type={}>", self.tag, kind),
            None => format!("<{}>", self.tag),
        };
        if let Some(caption) = self
            .label
            .as_deref()
            .or(self.name.as_deref())
            .or(self.text.as_deref())
        {
            description.push_str(&format!(" \"{}\"", caption));
        }
        description
    }
}

/// First visible text-entry control whose label matches the rule.
pub fn fill_target<'c>(controls: &'c [FormControl], rule: &LabelRule) -> Option<&'c FormControl> {
    controls
        .iter()
        .filter(|c| c.text_entry && c.visible)
        .find(|c| c.label.as_deref().is_some_and(|label| rule.matches(label)))
}

/// First native file input. Visibility is ignored: styled upload widgets
/// usually hide the real input.
pub fn file_input(controls: &[FormControl]) -> Option<&FormControl> {
    controls.iter().find(|c| c.file_input)
}

/// First visible element whose own text invites an upload, falling back to
/// buttons whose accessible name does.
pub fn upload_invitation<'c>(controls: &'c [FormControl], pattern: &Regex) -> Option<&'c FormControl> {
    let visible = || controls.iter().filter(|c| c.visible && !c.file_input);

    visible()
        .find(|c| c.text.as_deref().is_some_and(|text| pattern.is_match(text)))
        .or_else(|| {
            visible()
                .filter(|c| c.button)
                .find(|c| c.name.as_deref().is_some_and(|name| pattern.is_match(name)))
        })
}

/// First visible, enabled button whose accessible name signals submission.
pub fn submit_control<'c>(controls: &'c [FormControl], pattern: &Regex) -> Option<&'c FormControl> {
    controls
        .iter()
        .filter(|c| c.button && c.visible && !c.disabled)
        .find(|c| c.name.as_deref().is_some_and(|name| pattern.is_match(name)))
}
