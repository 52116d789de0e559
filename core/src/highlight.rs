use crate::tokenizer::tokenize;
use regex::{Captures, Regex, RegexBuilder};

/// Marks occurrences of a query's terms in result text.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    /// One case-insensitive alternation over the query's normalized terms, each word-bounded on
    /// the sides that end in a word character.
    pub fn new(query: &str) -> Self {
        let mut terms: Vec<String> = tokenize(query).collect();
        terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        terms.dedup();
        if terms.is_empty() {
            return Self { pattern: None };
        }
        let alternation = terms.iter().map(|t| bounded(t)).collect::<Vec<_>>().join("|");
        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .map_err(|e| tracing::warn!(error = %e, "highlight pattern rejected"))
            .ok();
        Self { pattern }
    }

    pub fn is_empty(&self) -> bool { self.pattern.is_none() }

    /// Wrap every match in `open` .. `close`.
    pub fn highlight(&self, text: &str, open: &str, close: &str) -> String {
        match &self.pattern {
            Some(re) => re.replace_all(text, |caps: &Captures| format!("{open}{}{close}", &caps[0])).into_owned(),
            None => text.to_string(),
        }
    }

    /// Up to `max_chars` characters around the first match, or from the start without one.
    pub fn snippet(&self, text: &str, max_chars: usize) -> String {
        let match_at = self.pattern.as_ref().and_then(|re| re.find(text)).map_or(0, |m| m.start());
        let lead = max_chars / 3;
        let first = text[..match_at].chars().count().saturating_sub(lead);
        text.chars().skip(first).take(max_chars).collect()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// `\b` only holds next to a word character, so terms like `dog.` get no boundary after the dot.
fn bounded(term: &str) -> String {
    let start = if term.chars().next().is_some_and(is_word_char) { r"\b" } else { "" };
    let end = if term.chars().next_back().is_some_and(is_word_char) { r"\b" } else { "" };
    format!("{start}{}{end}", regex::escape(term))
}
