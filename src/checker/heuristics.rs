use aho_corasick::{AhoCorasick, MatchKind};
use lazy_static::lazy_static;

// Frequent English affixes; a word carrying one with a non-trivial stem is
// assumed well-formed while no dictionary is available.
const COMMON_SUFFIXES: &[&str] = &[
    "ing", "ed", "tion", "sion", "ment", "ness", "able", "ible", "ful", "less", "ous", "ive",
    "ize", "ise", "ism", "ist", "ity", "ly", "er", "est",
];

const COMMON_PREFIXES: &[&str] = &[
    "un", "re", "inter", "neuro", "pre", "non", "anti", "dis", "over", "under", "micro", "macro",
    "multi", "semi", "sub", "super", "trans", "bio", "photo", "electro",
];

// Well-known misspellings rejected even in degraded mode.
const KNOWN_MISSPELLINGS: &[&str] = &[
    "teh", "adn", "seperate", "seperately", "occured", "occurence", "recieve", "recieved",
    "definately", "wich", "hte", "taht", "becuase", "untill", "wierd", "accomodate",
    "neccessary", "publically", "tommorow", "existance", "alot",
];

lazy_static! {
    static ref MISSPELLING_MATCHER: AhoCorasick = AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(KNOWN_MISSPELLINGS)
        .unwrap();
}

fn is_known_misspelling(word: &str) -> bool {
    MISSPELLING_MATCHER
        .find(word)
        .map(|m| m.start() == 0 && m.end() == word.len())
        .unwrap_or(false)
}

fn has_common_affix(word: &str) -> bool {
    let suffix_hit = COMMON_SUFFIXES
        .iter()
        .any(|s| word.ends_with(s) && word.len() >= s.len() + 3);
    let prefix_hit = COMMON_PREFIXES
        .iter()
        .any(|p| word.starts_with(p) && word.len() >= p.len() + 3);
    suffix_hit || prefix_hit
}

/// Fallback verdict while the dictionary is loading or after it failed to
/// load. Expects a lower-cased word.
pub fn plausible(word: &str) -> bool {
    if is_known_misspelling(word) {
        return false;
    }
    if has_common_affix(word) {
        return true;
    }
    // Accept by default: false negatives beat flooding the editor with
    // flags before real data is available.
    true
}
