//! Text tokenizer shared by indexing and query processing
//!
//! Pipeline: lowercase → word joiners become spaces → strip remaining
//!           punctuation (currency sign kept) → split on whitespace
//!           → drop tokens shorter than 3 characters

/// Minimum token length in characters
pub const MIN_TOKEN_LEN: usize = 3;

/// Characters that separate words rather than belonging to one
#[inline]
fn is_joiner(c: char) -> bool {
    matches!(c, '-' | '/' | '|' | '_')
}

/// Tokenize text into searchable terms.
///
/// `$1,199` survives as `$1199` so prices stay matchable; `220V-rated` splits
/// into `220v` and `rated`.
///
/// # Example
///
/// ```
/// use sift_core::tokenizer::tokenize;
///
/// let tokens = tokenize("220V Heating-Element, $1,199!");
/// assert_eq!(tokens, vec!["220v", "heating", "element", "$1199"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    clean(text)
        .split_whitespace()
        .filter(|s| s.chars().count() >= MIN_TOKEN_LEN)
        .map(String::from)
        .collect()
}

/// Normalize text for phrase containment checks and cache keys.
///
/// Same character rules as [`tokenize`], but short words are kept and the
/// result is a single space-separated string.
///
/// # Example
///
/// ```
/// use sift_core::tokenizer::normalize;
///
/// assert_eq!(normalize("  10-Gallon   Model?! "), "10 gallon model");
/// ```
pub fn normalize(text: &str) -> String {
    clean(text).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-word phrase containment over text produced by [`normalize`].
///
/// A trailing plural `s` on the last word of the haystack match is tolerated,
/// so `gallon` matches `15 gallons`.
///
/// # Example
///
/// ```
/// use sift_core::tokenizer::contains_phrase;
///
/// assert!(contains_phrase("15 gallons copper", "gallon"));
/// assert!(!contains_phrase("solid copper", "lid"));
/// ```
pub fn contains_phrase(normalized_haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let padded = format!(" {} ", normalized_haystack);
    padded.contains(&format!(" {} ", phrase)) || padded.contains(&format!(" {}s ", phrase))
}

fn clean(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() || is_joiner(c) {
                Some(' ')
            } else if c.is_alphanumeric() || c == '$' {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

/// Tokenize and deduplicate for query processing, keeping first-seen order.
///
/// # Example
///
/// ```
/// use sift_core::tokenizer::tokenize_unique;
///
/// let tokens = tokenize_unique("price PRICE price list");
/// assert_eq!(tokens, vec!["price", "list"]);
/// ```
pub fn tokenize_unique(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
