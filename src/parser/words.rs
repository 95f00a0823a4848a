use lazy_static::lazy_static;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

lazy_static! {
    // Letters with internal apostrophes (contractions), no other punctuation.
    static ref WORD: Regex = Regex::new(r"[A-Za-z]+(?:'[A-Za-z]+)*").unwrap();
}

/// A token matched inside one checkable region. Indices are region-local
/// byte offsets; callers add the region's `start_offset` before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCandidate {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Tokenize one region's text. Pure function of its input.
pub fn extract_words(text: &str) -> Vec<WordCandidate> {
    WORD.find_iter(text)
        .map(|m| WordCandidate {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

/// Convert an absolute byte offset to a 1-indexed (line, column) pair.
pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset.min(text.len())];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(idx) => offset - idx,
        None => offset + 1,
    };
    (line, column)
}

/// A short snippet of text around a word, truncated on grapheme boundaries
/// so multi-byte characters never get split.
pub fn context_snippet(text: &str, start: usize, end: usize) -> String {
    let graphemes: Vec<(usize, &str)> = text.grapheme_indices(true).collect();

    let word_first = graphemes.iter().position(|(i, _)| *i >= start).unwrap_or(0);
    let word_last = graphemes
        .iter()
        .position(|(i, g)| *i + g.len() >= end)
        .unwrap_or_else(|| graphemes.len().saturating_sub(1));

    let from = word_first.saturating_sub(20);
    let to = (word_last + 21).min(graphemes.len());

    let snippet: String = graphemes[from..to].iter().map(|(_, g)| *g).collect();
    let snippet = snippet.replace('\n', " ");

    match (from > 0, to < graphemes.len()) {
        (true, true) => format!("...{}...", snippet),
        (true, false) => format!("...{}", snippet),
        (false, true) => format!("{}...", snippet),
        (false, false) => snippet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extraction() {
        let words = extract_words(" The qick brown fox.");
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["The", "qick", "brown", "fox"]);
    }

    #[test]
    fn test_indices_are_region_local() {
        let words = extract_words("ab cd");
        assert_eq!(words[0].start, 0);
        assert_eq!(words[0].end, 2);
        assert_eq!(words[1].start, 3);
        assert_eq!(words[1].end, 5);
    }

    #[test]
    fn test_contractions_stay_whole() {
        let words = extract_words("don't stop, it's fine");
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["don't", "stop", "it's", "fine"]);
    }

    #[test]
    fn test_leading_apostrophe_not_included() {
        let words = extract_words("'quoted'");
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "quoted");
    }

    #[test]
    fn test_punctuation_splits_tokens() {
        let words = extract_words("one,two;three");
        assert_eq!(words.len(), 3);
    }

    #[test]
    fn test_line_col() {
        let text = "first\nsecond line\nthird";
        assert_eq!(line_col(text, 0), (1, 1));
        assert_eq!(line_col(text, 6), (2, 1));
        assert_eq!(line_col(text, 13), (2, 8));
        assert_eq!(line_col(text, 18), (3, 1));
    }

    #[test]
    fn test_context_snippet_short_text() {
        let text = "the qick fox";
        assert_eq!(context_snippet(text, 4, 8), "the qick fox");
    }

    #[test]
    fn test_context_snippet_truncates() {
        let text = "a".repeat(30) + " word " + &"b".repeat(30);
        let snippet = context_snippet(&text, 31, 35);
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
        assert!(snippet.contains("word"));
    }

    #[test]
    fn test_context_snippet_multibyte_safe() {
        let text = "é".repeat(25) + "word" + &"ü".repeat(25);
        let start = "é".repeat(25).len();
        let snippet = context_snippet(&text, start, start + 4);
        assert!(snippet.contains("word"));
    }
}
