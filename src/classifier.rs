use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::models::StatusLabel;

pub const IN_STOCK_PHRASES: &[&str] = &[
    "in stock",
    "add to cart",
    "add to bag",
    "add to basket",
    "add to trolley",
    "available now",
    "available to buy",
    "available",
    "buy now",
    "add",
];

pub const ANTICIPATED_PHRASES: &[&str] = &[
    "pre-order",
    "preorder",
    "pre order",
    "coming soon",
    "available soon",
    "available for pre-order",
    "expected",
    "back in stock",
    "restock",
    "notify me",
    "release date",
    "available from",
];

pub const OUT_OF_STOCK_PHRASES: &[&str] = &[
    "out of stock",
    "sold out",
    "currently unavailable",
    "unavailable",
    "not available",
];

/// Phrase lists for the full-document keyword pass, in precedence order.
const DOCUMENT_TIERS: &[(&[&str], StatusLabel)] = &[
    (IN_STOCK_PHRASES, StatusLabel::InStock),
    (ANTICIPATED_PHRASES, StatusLabel::Anticipated),
    (OUT_OF_STOCK_PHRASES, StatusLabel::OutOfStock),
];

/// Buttons and links never report out of stock.
const ELEMENT_TIERS: &[(&[&str], StatusLabel)] = &[
    (IN_STOCK_PHRASES, StatusLabel::InStock),
    (ANTICIPATED_PHRASES, StatusLabel::Anticipated),
];

/// Maps a product page to an availability status.
///
/// Evaluation stops at the first pass that yields a status:
///
/// 1. schema.org offers embedded as JSON-LD
/// 2. keyword search over the lower-cased raw markup
/// 3. keyword search over the text and attributes of `button`, `a` and `input` elements
///
/// Pages that match nothing are [`StatusLabel::Unknown`].
pub struct AvailabilityClassifier {
    json_ld_regex: Regex,
    interactive_selector: Selector,
}

impl Default for AvailabilityClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl AvailabilityClassifier {
    pub fn new() -> Self {
        AvailabilityClassifier {
            json_ld_regex: Regex::new(
                r#"(?is)<script[^>]+type=["']application/ld\+json["'][^>]*>(.*?)</script>"#,
            )
            .expect("JSON-LD pattern is valid"),
            interactive_selector: Selector::parse("button, a, input")
                .expect("interactive element selector is valid"),
        }
    }

    /// Classify a fetched document. `None` means the fetch failed.
    pub fn classify(&self, html: Option<&str>) -> StatusLabel {
        let html = match html {
            Some(html) if !html.is_empty() => html,
            _ => return StatusLabel::Unknown,
        };

        if let Some(status) = self.structured_data_status(html) {
            return status;
        }

        if let Some(status) = match_phrases(&html.to_lowercase(), DOCUMENT_TIERS) {
            return status;
        }

        self.interactive_element_status(html)
            .unwrap_or(StatusLabel::Unknown)
    }

    fn structured_data_status(&self, html: &str) -> Option<StatusLabel> {
        for captures in self.json_ld_regex.captures_iter(html) {
            let Some(body) = captures.get(1) else {
                continue;
            };
            let Some(data) = try_parse_json(body.as_str()) else {
                tracing::debug!("Skipping unparseable JSON-LD block");
                continue;
            };

            for node in one_or_many(&data) {
                if let Some(status) = offers_status(node) {
                    return Some(status);
                }
            }
        }

        None
    }

    fn interactive_element_status(&self, html: &str) -> Option<StatusLabel> {
        let document = Html::parse_document(html);

        document
            .select(&self.interactive_selector)
            .find_map(|element| {
                let text = element.text().collect::<String>();
                let attributes = element
                    .value()
                    .attrs()
                    .map(|(_, value)| value)
                    .collect::<Vec<_>>()
                    .join(" ");

                let haystack = format!("{} {}", text, attributes).to_lowercase();
                match_phrases(&haystack, ELEMENT_TIERS)
            })
    }
}

/// Parse a JSON-LD block, treating malformed content as absent.
pub fn try_parse_json(text: &str) -> Option<Value> {
    serde_json::from_str(text.trim()).ok()
}

/// Fields such as `offers` hold either a single value or a list of them.
pub fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    }
}

fn offers_status(node: &Value) -> Option<StatusLabel> {
    let offers = node.as_object()?.get("offers").filter(|v| is_truthy(v))?;

    one_or_many(offers).into_iter().find_map(|offer| {
        let offer = offer.as_object()?;
        let availability = offer
            .get("availability")
            .filter(|v| is_truthy(v))
            .or_else(|| offer.get("Availability"))?
            .as_str()?
            .to_lowercase();

        if availability.contains("instock") {
            Some(StatusLabel::InStock)
        } else if availability.contains("outofstock") {
            Some(StatusLabel::OutOfStock)
        } else {
            None
        }
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn match_phrases(haystack: &str, tiers: &[(&[&str], StatusLabel)]) -> Option<StatusLabel> {
    tiers.iter().find_map(|(phrases, status)| {
        phrases
            .iter()
            .any(|phrase| haystack.contains(phrase))
            .then_some(*status)
    })
}
