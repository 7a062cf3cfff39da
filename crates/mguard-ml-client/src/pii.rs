//! Personal-details rules over extracted text.
//!
//! Any single rule firing marks the text as containing contact details.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Entity, TextExtraction};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(https?://\S+|www\.\S+|[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}(?:/\S*)?)")
        .unwrap()
});

static TLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[a-zA-Z]{2,}").unwrap());

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\s\-()]{7,}\d").unwrap());

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]+\b").unwrap());

const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
    "hundred", "thousand", "million", "billion",
];

/// Entity labels that indicate a place or address.
const ADDRESS_ENTITIES: &[&str] = &["GPE", "LOC", "FAC"];

/// Rule set, parameterized by the platform's own domain.
#[derive(Debug, Clone)]
pub struct PersonalInfoRules {
    platform_domain: Option<String>,
    number_words: HashSet<&'static str>,
}

impl Default for PersonalInfoRules {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PersonalInfoRules {
    /// Links and digits next to `platform_domain` are allowed.
    pub fn new(platform_domain: Option<String>) -> Self {
        Self {
            platform_domain: platform_domain.filter(|d| !d.trim().is_empty()),
            number_words: NUMBER_WORDS.iter().copied().collect(),
        }
    }

    pub fn platform_domain(&self) -> Option<&str> {
        self.platform_domain.as_deref()
    }

    fn mentions_platform(&self, text: &str) -> bool {
        self.platform_domain
            .as_deref()
            .is_some_and(|domain| text.contains(domain))
    }

    pub fn has_forbidden_url(&self, text: &str) -> bool {
        URL.find_iter(text).any(|m| {
            let url = m.as_str().trim_end_matches(['.', ',', '!', '?']);
            TLD.is_match(url) && !self.mentions_platform(url)
        })
    }

    pub fn has_email(&self, text: &str) -> bool {
        EMAIL.is_match(text)
    }

    pub fn has_phone_number(&self, text: &str) -> bool {
        PHONE.is_match(text)
    }

    pub fn has_number_words(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        WORD.find_iter(&lower)
            .any(|w| self.number_words.contains(w.as_str()))
    }

    /// Any digit, unless the text mentions the platform domain.
    pub fn has_digit(&self, text: &str) -> bool {
        !self.mentions_platform(text) && text.chars().any(|c| c.is_ascii_digit())
    }

    /// Every text rule except the entity check.
    pub fn text_matches(&self, text: &str) -> bool {
        self.has_forbidden_url(text)
            || self.has_email(text)
            || self.has_phone_number(text)
            || self.has_number_words(text)
            || self.has_digit(text)
    }

    /// Evaluate OCR text, its entities and every QR payload.
    pub fn evaluate(&self, extraction: &TextExtraction) -> bool {
        let text = extraction.text.trim();
        if !text.is_empty() && self.text_matches(text) {
            return true;
        }

        if has_address_entity(&extraction.entities) {
            return true;
        }

        extraction
            .qr_payloads
            .iter()
            .any(|payload| self.text_matches(payload))
            || has_address_entity(&extraction.qr_entities)
    }
}

fn has_address_entity(entities: &[Entity]) -> bool {
    entities
        .iter()
        .any(|e| ADDRESS_ENTITIES.contains(&e.label.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> PersonalInfoRules {
        PersonalInfoRules::new(Some("example-vault.com".to_string()))
    }

    #[test]
    fn test_clean_text() {
        assert!(!rules().text_matches("Happy birthday from all of us"));
    }

    #[test]
    fn test_email() {
        assert!(rules().has_email("write me at jane.doe@mail.org"));
        assert!(rules().text_matches("jane@mail.org"));
    }

    #[test]
    fn test_urls() {
        let r = rules();
        assert!(r.has_forbidden_url("visit www.other-site.net/me"));
        assert!(r.has_forbidden_url("https://t.me/handle"));
        assert!(!r.has_forbidden_url("see example-vault.com/profile"));
        assert!(!r.has_forbidden_url("no links here"));
    }

    #[test]
    fn test_phone_and_digits() {
        let r = rules();
        assert!(r.has_phone_number("call +1 (555) 123-4567"));
        assert!(!r.has_phone_number("room 12"));
        assert!(r.has_digit("room 12"));
        assert!(!r.has_digit("example-vault.com/u/42"));
    }

    #[test]
    fn test_number_words() {
        let r = rules();
        assert!(r.has_number_words("Call me at FIVE five five"));
        assert!(!r.has_number_words("someone online"));
    }

    #[test]
    fn test_without_platform_domain() {
        let r = PersonalInfoRules::new(Some("  ".to_string()));
        assert!(r.platform_domain().is_none());
        assert!(r.has_forbidden_url("example-vault.com"));
    }

    #[test]
    fn test_evaluate_sources() {
        let r = rules();

        assert!(!r.evaluate(&TextExtraction::default()));

        let qr = TextExtraction {
            qr_payloads: vec!["https://wa.me/123".to_string()],
            ..Default::default()
        };
        assert!(r.evaluate(&qr));

        let place = TextExtraction {
            text: "Meet me at the harbour".to_string(),
            entities: vec![Entity {
                text: "the harbour".to_string(),
                label: "FAC".to_string(),
            }],
            ..Default::default()
        };
        assert!(r.evaluate(&place));

        let person = TextExtraction {
            text: "Love, Maria".to_string(),
            entities: vec![Entity {
                text: "Maria".to_string(),
                label: "PERSON".to_string(),
            }],
            ..Default::default()
        };
        assert!(!r.evaluate(&person));
    }

    #[test]
    fn test_address_in_qr_payload() {
        let r = rules();

        let qr_address = TextExtraction {
            qr_payloads: vec!["12 Harbour Road, Lisbon".to_string()],
            qr_entities: vec![Entity {
                text: "Lisbon".to_string(),
                label: "GPE".to_string(),
            }],
            ..Default::default()
        };
        assert!(r.evaluate(&qr_address));

        let qr_person = TextExtraction {
            qr_payloads: vec!["from Maria".to_string()],
            qr_entities: vec![Entity {
                text: "Maria".to_string(),
                label: "PERSON".to_string(),
            }],
            ..Default::default()
        };
        assert!(!r.evaluate(&qr_person));
    }
}
