//! Per-request query representation

use crate::tokenizer::{normalize, tokenize};

/// A tokenized query, created per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Query exactly as the caller supplied it
    pub raw: String,
    /// Tokens in query order (duplicates kept)
    pub tokens: Vec<String>,
    normalized: String,
}

impl Query {
    /// Tokenize a raw query string
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let tokens = tokenize(&raw);
        let normalized = normalize(&raw);
        Query {
            raw,
            tokens,
            normalized,
        }
    }

    /// True when no token survived tokenization
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Normalized raw text, short words included
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Tokens with duplicates removed, first occurrence order
    pub fn unique_tokens(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            if !out.contains(&token.as_str()) {
                out.push(token);
            }
        }
        out
    }
}
