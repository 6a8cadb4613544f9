use crate::results::DetailRecord;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

static LABEL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("strong").unwrap());
static DESCRIPTION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)description").unwrap());
static TAGS_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)tags").unwrap());

/// Labelled sections of a detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Description,
    Tags,
}

impl Label {
    fn pattern(&self) -> &'static Regex {
        match self {
            Label::Description => &DESCRIPTION_LABEL,
            Label::Tags => &TAGS_LABEL,
        }
    }
}

/// Extracts description and tags from the inner HTML of a detail page's content container.
///
/// Missing labels fall back to the defaults of [`DetailRecord`]; this never fails.
pub fn extract(fragment_html: &str) -> DetailRecord {
    let fragment = Html::parse_fragment(fragment_html);
    let mut record = DetailRecord::default();

    if let Some(description) = description(&fragment) {
        record.description = description;
    }
    record.tags = tags(&fragment);

    ::log::debug!(
        "Detail extractor found {} tags, description of {} chars",
        record.tags.len(),
        record.description.len()
    );
    record
}

/// First `<strong>` whose text matches the label
fn find_label<'a>(fragment: &'a Html, label: Label) -> Option<ElementRef<'a>> {
    fragment
        .select(&LABEL_SELECTOR)
        .find(|el| label.pattern().is_match(&el.text().collect::<String>()))
}

/// Siblings after `<strong>` and `<br>` end a labelled section
fn is_boundary(node: &Node) -> bool {
    matches!(node, Node::Element(el) if el.name() == "strong" || el.name() == "br")
}

/// Text following the label word inside the label itself, e.g. `<strong>Description: x</strong>`
fn inline_remainder(label_el: ElementRef<'_>, label: Label) -> Option<String> {
    let text = label_el.text().collect::<String>();
    let found = label.pattern().find(&text)?;
    let rest = text[found.end()..]
        .trim_start_matches(|c: char| c == ':' || c.is_whitespace())
        .trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

fn description(fragment: &Html) -> Option<String> {
    let label_el = find_label(fragment, Label::Description)?;
    let mut parts: Vec<String> = inline_remainder(label_el, Label::Description)
        .into_iter()
        .collect();

    for sibling in label_el.next_siblings() {
        if is_boundary(sibling.value()) {
            break;
        }
        let part = match sibling.value() {
            Node::Text(text) => text.trim().to_string(),
            Node::Element(_) => ElementRef::wrap(sibling)
                .map(|el| {
                    el.text()
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default(),
            _ => continue,
        };
        if !part.is_empty() {
            parts.push(part);
        }
    }

    Some(parts.join(" "))
}

fn tags(fragment: &Html) -> Vec<String> {
    let Some(label_el) = find_label(fragment, Label::Tags) else {
        return Vec::new();
    };

    let mut tags = Vec::new();
    for sibling in label_el.next_siblings() {
        if is_boundary(sibling.value()) {
            break;
        }
        if let Some(link) = ElementRef::wrap(sibling).filter(|el| el.value().name() == "a") {
            tags.push(link.text().map(str::trim).collect::<String>());
        }
    }
    tags
}
