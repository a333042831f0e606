//! News text relevance and normalization

use std::sync::OnceLock;

use regex::Regex;

/// Headline keywords that mark a story as palm-oil related
pub const PALM_OIL_KEYWORDS: &[&str] = &[
    "palm oil",
    "oil palm",
    "fcpo",
    "plantation",
    "crude palm oil",
    "cpo",
    "kernel",
    "fresh fruit bunch",
    "palm",
    "oilpalm",
    "palmoil",
];

/// Case-insensitive substring match against [`PALM_OIL_KEYWORDS`]
pub fn contains_relevant_keyword(text: &str) -> bool {
    let text = text.to_lowercase();
    PALM_OIL_KEYWORDS.iter().any(|k| text.contains(k))
}

struct Patterns {
    glued_word: Regex,
    palm_camel: Regex,
    oil_camel: Regex,
    palm_oil: Regex,
    sentence_start: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        glued_word: Regex::new(r"(?i)\bpalmoil\b").expect("valid regex"),
        palm_camel: Regex::new(r"(?i)palm([A-Z])").expect("valid regex"),
        oil_camel: Regex::new(r"(?i)oil([A-Z])").expect("valid regex"),
        palm_oil: Regex::new(r"(?i)palm\s?oil").expect("valid regex"),
        sentence_start: Regex::new(r"(?i)(^|\.\s+)palm").expect("valid regex"),
    })
}

/// Tidy spacing and capitalization around "palm oil" in scraped text
pub fn format_description(text: &str) -> String {
    let p = patterns();
    let text = p.glued_word.replace_all(text, "palm oil");
    let text = p.palm_camel.replace_all(&text, "palm ${1}");
    let text = p.oil_camel.replace_all(&text, "oil ${1}");
    let text = p.palm_oil.replace_all(&text, "palm oil");
    let text = p.sentence_start.replace_all(&text, "${1}Palm");
    text.into_owned()
}
