use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

use crate::operations::normalize::{ExtractionResult, parse_amount_text};

/// Anything that can turn free text into structured fields.
pub trait Extractor {
    fn extract(&self, text: &str) -> ExtractionResult;
}

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("date pattern is valid"));
static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:[01]?\d|2[0-3]):[0-5]\d(?:\s?[ap]m)?\b").expect("time pattern is valid")
});
static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,3}(?:,\d{3})+|\d+)(\.\d+)?\s?([km])?\b").expect("amount pattern is valid")
});

const CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("photo", "Photography"),
    ("video", "Photography"),
    ("venue", "Venue"),
    ("hall", "Venue"),
    ("hotel", "Venue"),
    ("saree", "Attire"),
    ("dress", "Attire"),
    ("suit", "Attire"),
    ("cake", "Cake"),
    ("flower", "Decor"),
    ("decor", "Decor"),
    ("band", "Music"),
    ("dj", "Music"),
    ("invitation", "Invitations"),
    ("ring", "Jewellery"),
    ("jewel", "Jewellery"),
    ("catering", "Catering"),
    ("food", "Catering"),
    ("car", "Transport"),
];

const SOURCE_KEYWORDS: &[(&str, &str)] = &[
    ("salary", "Salary"),
    ("gift", "Gift"),
    ("paypal", "PayPal"),
    ("freelance", "Freelance"),
];

/// Offline extractor: dates, times and amounts by pattern, labels by keyword.
///
/// Notes are left empty so the normalizer keeps the raw text.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedExtractor;

impl Extractor for RuleBasedExtractor {
    fn extract(&self, text: &str) -> ExtractionResult {
        let date = DATE_PATTERN.find(text).map(|m| m.as_str().to_string());
        let time = TIME_PATTERN.find(text).map(|m| m.as_str().to_string());

        // Blank out dates and times so their digits are not read as amounts.
        let without_dates = DATE_PATTERN.replace_all(text, " ");
        let remainder = TIME_PATTERN.replace_all(&without_dates, " ");
        let amount = largest_amount(&remainder);

        let words = words(text);
        ExtractionResult {
            date,
            time,
            amount,
            category: keyword_label(&words, CATEGORY_KEYWORDS),
            source: keyword_label(&words, SOURCE_KEYWORDS),
            notes: None,
        }
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn keyword_label(words: &[String], table: &[(&str, &str)]) -> Option<String> {
    words.iter().find_map(|word| {
        table
            .iter()
            .find(|(keyword, _)| word.starts_with(keyword))
            .map(|(_, label)| label.to_string())
    })
}

fn largest_amount(text: &str) -> Option<Decimal> {
    AMOUNT_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(1)?.as_str();
            let fraction = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let base = parse_amount_text(&format!("{}{}", whole, fraction))?;
            let multiplier = match caps.get(3).map(|m| m.as_str().to_ascii_lowercase()) {
                Some(suffix) if suffix == "k" => Decimal::new(1_000, 0),
                Some(suffix) if suffix == "m" => Decimal::new(1_000_000, 0),
                _ => Decimal::ONE,
            };
            base.checked_mul(multiplier)
        })
        .max()
}

/// Adapts an external extraction service that answers with JSON.
///
/// `ask` sends the text and returns the raw reply, or `None` when the service
/// could not be reached; either way the result is a usable extraction.
pub struct JsonReplyExtractor<F> {
    ask: F,
}

impl<F> JsonReplyExtractor<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(ask: F) -> Self {
        Self { ask }
    }
}

impl<F> Extractor for JsonReplyExtractor<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn extract(&self, text: &str) -> ExtractionResult {
        match (self.ask)(text) {
            Some(reply) => ExtractionResult::from_json(&reply),
            None => ExtractionResult::default(),
        }
    }
}
