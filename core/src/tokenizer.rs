use std::str::SplitWhitespace;

/// Lazy stream of normalized terms over a piece of text.
///
/// A clone replays the remaining terms; call [`tokenize`] again for a fresh pass.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    words: SplitWhitespace<'a>,
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.words.by_ref().find_map(normalize)
    }
}

/// Tokenize text by whitespace, lowercase, strip ASCII punctuation from both ends and drop a
/// trailing possessive `'s`. Tokens left empty are discarded.
///
/// Documents and queries must both go through this function.
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens { words: text.split_whitespace() }
}

/// Normalize a single whitespace-delimited word.
pub fn normalize(word: &str) -> Option<String> {
    let lowered = word.to_lowercase();
    let stripped = lowered.trim_matches(|c: char| c.is_ascii_punctuation());
    let term = stripped.strip_suffix("'s").unwrap_or(stripped);
    if term.is_empty() {
        None
    } else {
        Some(term.to_string())
    }
}
