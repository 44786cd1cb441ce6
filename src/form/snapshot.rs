// src/form/snapshot.rs
//! Control inventory computed from static markup. Mirrors the in-page
//! inventory script, minus anything that needs layout.

use scraper::{ElementRef, Html};
use std::collections::HashMap;

use super::controls::FormControl;

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];
const TEXT_INPUT_TYPES: &[&str] = &["text", "email", "tel", "url", "search", "number", "password"];
const BUTTON_INPUT_TYPES: &[&str] = &["submit", "button", "reset", "image"];
const MAX_TEXT_CHARS: usize = 200;

/// Every interactive element and every element carrying its own text, in
/// document order. References are assigned sequentially from zero.
pub fn controls_from_html(html: &str) -> Vec<FormControl> {
    let document = Html::parse_document(html);
    let index = LabelIndex::build(&document);

    let mut controls = Vec::new();
    for node in document.root_element().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        if !inside_body(element) {
            continue;
        }
        if let Some(control) = describe(element, &index, controls.len() as u32) {
            controls.push(control);
        }
    }
    controls
}

struct LabelIndex {
    by_id: HashMap<String, String>,
    by_for: HashMap<String, String>,
}

impl LabelIndex {
    fn build(document: &Html) -> Self {
        let mut by_id: HashMap<String, String> = HashMap::new();
        let mut by_for: HashMap<String, String> = HashMap::new();

        for node in document.root_element().descendants() {
            let Some(element) = ElementRef::wrap(node) else {
                continue;
            };
            let text = collapse(element.text());
            if let Some(id) = element.value().id() {
                by_id.insert(id.to_string(), text.clone());
            }
            if element.value().name() == "label" {
                if let Some(target) = element.value().attr("for") {
                    match by_for.get_mut(target) {
                        Some(existing) => {
                            existing.push(' ');
                            existing.push_str(&text);
                        }
                        None => {
                            by_for.insert(target.to_string(), text);
                        }
                    }
                }
            }
        }

        Self { by_id, by_for }
    }
}

fn describe(element: ElementRef<'_>, index: &LabelIndex, reference: u32) -> Option<FormControl> {
    let el = element.value();
    let tag = el.name().to_ascii_lowercase();
    if SKIPPED_TAGS.contains(&tag.as_str()) || has_skipped_ancestor(element) {
        return None;
    }

    let input_type = (tag == "input").then(|| {
        el.attr("type")
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_else(|| "text".to_string())
    });
    let role = el.attr("role").map(|r| r.to_ascii_lowercase());

    let text_entry = match tag.as_str() {
        "textarea" => true,
        "input" => input_type
            .as_deref()
            .is_some_and(|t| TEXT_INPUT_TYPES.contains(&t)),
        _ => role.as_deref() == Some("textbox") || el.attr("contenteditable") == Some("true"),
    };
    let file_input = input_type.as_deref() == Some("file");
    let button = tag == "button"
        || role.as_deref() == Some("button")
        || input_type
            .as_deref()
            .is_some_and(|t| BUTTON_INPUT_TYPES.contains(&t));
    let interactive = text_entry || file_input || button || tag == "select" || tag == "input";

    let text = own_text(element);
    if !interactive && text.is_none() {
        return None;
    }

    let label = if interactive { label_of(element, index) } else { None };
    let name = if button {
        label
            .clone()
            .or_else(|| non_empty(collapse(element.text())))
            .or_else(|| el.attr("value").and_then(|v| non_empty(collapse([v]))))
            .or_else(|| el.attr("title").and_then(|v| non_empty(collapse([v]))))
            .or_else(|| (input_type.as_deref() == Some("submit")).then(|| "Submit".to_string()))
    } else {
        label.clone()
    };

    Some(FormControl {
        reference,
        tag,
        input_type,
        label,
        name,
        text,
        visible: is_visible(element),
        disabled: el.attr("disabled").is_some() || el.attr("aria-disabled") == Some("true"),
        text_entry,
        file_input,
        button,
    })
}

fn label_of(element: ElementRef<'_>, index: &LabelIndex) -> Option<String> {
    let el = element.value();

    if let Some(ids) = el.attr("aria-labelledby") {
        let joined = ids
            .split_whitespace()
            .filter_map(|id| index.by_id.get(id))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(label) = non_empty(joined) {
            return Some(label);
        }
    }

    if let Some(label) = el.attr("aria-label").and_then(|l| non_empty(collapse([l]))) {
        return Some(label);
    }

    if let Some(label) = el
        .id()
        .and_then(|id| index.by_for.get(id))
        .and_then(|l| non_empty(l.clone()))
    {
        return Some(label);
    }

    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "label")
        .and_then(|label| non_empty(collapse(label.text())))
}

fn own_text(element: ElementRef<'_>) -> Option<String> {
    let pieces = element
        .children()
        .filter_map(|child| child.value().as_text().map(|t| &**t));
    let text = collapse(pieces);
    non_empty(text.chars().take(MAX_TEXT_CHARS).collect())
}

fn is_visible(element: ElementRef<'_>) -> bool {
    let el = element.value();
    if el.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden")) {
        return false;
    }
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .all(|e| !hidden_by_markup(e))
}

fn hidden_by_markup(element: ElementRef<'_>) -> bool {
    let el = element.value();
    if el.attr("hidden").is_some() {
        return true;
    }
    el.attr("style").is_some_and(|style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        compact.contains("display:none") || compact.contains("visibility:hidden")
    })
}

fn inside_body(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| a.value().name() == "body")
}

fn has_skipped_ancestor(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| SKIPPED_TAGS.contains(&a.value().name()))
}

fn collapse<'a>(pieces: impl IntoIterator<Item = &'a str>) -> String {
    pieces
        .into_iter()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'c>(controls: &'c [FormControl], tag: &str, label: &str) -> &'c FormControl {
        controls
            .iter()
            .find(|c| c.tag == tag && c.label.as_deref() == Some(label))
            .unwrap_or_else(|| panic!("no <{}> labelled {:?} in {:#?}", tag, label, controls))
    }

    #[test]
    fn test_label_sources_in_precedence_order() {
        let html = r#"<html><body><form>
            <span id="given">Given</span><span id="family">name</span>
            <input id="a" aria-labelledby="given family" aria-label="ignored">
            <input id="b" aria-label="Email address">
            <label for="c">Phone</label><input id="c" type="tel">
            <label>Mobile <input type="tel" name="mobile"></label>
            <textarea id="d"></textarea>
        </form></body></html>"#;

        let controls = controls_from_html(html);
        assert!(find(&controls, "input", "Given name").text_entry);
        assert!(find(&controls, "input", "Email address").text_entry);
        assert_eq!(
            find(&controls, "input", "Phone").input_type.as_deref(),
            Some("tel")
        );
        assert!(find(&controls, "input", "Mobile").visible);

        let textarea = controls.iter().find(|c| c.tag == "textarea").unwrap();
        assert!(textarea.text_entry);
        assert!(textarea.label.is_none());
    }

    #[test]
    fn test_visibility_from_markup() {
        let html = r#"<body>
            <div style="display: none"><label>Name <input></label></div>
            <input type="hidden" name="csrf" value="x">
            <input hidden aria-label="Email">
            <label for="p">Phone</label><input id="p" style="visibility:hidden">
            <label for="f">CV</label><input id="f" type="file" style="opacity:0">
        </body>"#;

        let controls = controls_from_html(html);
        assert!(!find(&controls, "input", "Name").visible);
        assert!(!find(&controls, "input", "Email").visible);
        assert!(!find(&controls, "input", "Phone").visible);

        let file = find(&controls, "input", "CV");
        assert!(file.file_input);
        assert!(file.visible);

        let csrf = controls
            .iter()
            .find(|c| c.input_type.as_deref() == Some("hidden"))
            .unwrap();
        assert!(!csrf.visible);
        assert!(!csrf.text_entry);
    }

    #[test]
    fn test_button_names_and_text_elements() {
        let html = r#"<body>
            <p>Please <b>upload</b> your resume</p>
            <div role="button" aria-label="Browse files"></div>
            <button type="submit"><span>Send application</span></button>
            <input type="submit">
            <input type="button" value="Cancel" disabled>
            <script>var submit = "not a control";</script>
        </body>"#;

        let controls = controls_from_html(html);

        let paragraph = controls.iter().find(|c| c.tag == "p").unwrap();
        assert_eq!(paragraph.text.as_deref(), Some("Please your resume"));
        assert!(controls.iter().any(|c| c.tag == "b" && c.text.as_deref() == Some("upload")));

        let browse = controls.iter().find(|c| c.tag == "div").unwrap();
        assert!(browse.button);
        assert_eq!(browse.name.as_deref(), Some("Browse files"));

        let send = controls.iter().find(|c| c.tag == "button").unwrap();
        assert_eq!(send.name.as_deref(), Some("Send application"));

        let names: Vec<_> = controls
            .iter()
            .filter(|c| c.tag == "input")
            .map(|c| (c.name.as_deref(), c.disabled))
            .collect();
        assert_eq!(names, vec![(Some("Submit"), false), (Some("Cancel"), true)]);

        assert!(controls.iter().all(|c| c.tag != "script"));
    }

    #[test]
    fn test_references_follow_document_order() {
        let html = r#"<body><h1>Apply</h1><input aria-label="Name"><button>Go</button></body>"#;
        let controls = controls_from_html(html);
        let refs: Vec<_> = controls.iter().map(|c| (c.reference, c.tag.as_str())).collect();
        assert_eq!(refs, vec![(0, "h1"), (1, "input"), (2, "button")]);
    }
}
