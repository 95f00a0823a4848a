use crate::checker::dictionary::Dictionary;

/// Generate spelling suggestions: cheap prefix candidates first, then
/// single-edit transformations looked up directly.
pub fn generate(word: &str, dictionary: &Dictionary, max_suggestions: usize) -> Vec<String> {
    let mut suggestions = Vec::new();

    if word.len() >= 3 {
        let prefix = &word[..3];
        let mut prefix_matches = dictionary.words_with_prefix(prefix);
        prefix_matches.sort_by_key(|w| edit_distance(word, w));

        for candidate in prefix_matches {
            if edit_distance(word, &candidate) <= 2 && !suggestions.contains(&candidate) {
                suggestions.push(candidate);
                if suggestions.len() >= max_suggestions {
                    return suggestions;
                }
            }
        }
    }

    for transform in transformations(word) {
        if dictionary.contains(&transform) && !suggestions.contains(&transform) {
            suggestions.push(transform);
            if suggestions.len() >= max_suggestions {
                return suggestions;
            }
        }
    }

    // Shorter prefix as a fallback for misspellings in the first letters.
    if suggestions.len() < max_suggestions && word.len() >= 2 {
        let prefix = &word[..2];
        let mut prefix_matches = dictionary.words_with_prefix(prefix);
        prefix_matches.sort_by_key(|w| edit_distance(word, w));

        for candidate in prefix_matches {
            if edit_distance(word, &candidate) <= 3 && !suggestions.contains(&candidate) {
                suggestions.push(candidate);
                if suggestions.len() >= max_suggestions {
                    break;
                }
            }
        }
    }

    suggestions
}

/// Levenshtein distance.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = if a_char == b_char { 0 } else { 1 };
            current[j + 1] = (prev[j + 1] + 1).min(current[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[b_chars.len()]
}

/// Single-edit variants of a word: deletions, insertions, adjacent
/// transpositions, and a few common letter confusions.
fn transformations(word: &str) -> Vec<String> {
    let mut variants = Vec::new();
    let chars: Vec<char> = word.chars().collect();

    for i in 0..chars.len() {
        let mut new_word = chars.clone();
        new_word.remove(i);
        variants.push(new_word.iter().collect());
    }

    for i in 0..=chars.len() {
        for letter in 'a'..='z' {
            let mut new_word = chars.clone();
            new_word.insert(i, letter);
            variants.push(new_word.iter().collect());
        }
    }

    for i in 0..chars.len().saturating_sub(1) {
        let mut new_word = chars.clone();
        new_word.swap(i, i + 1);
        variants.push(new_word.iter().collect());
    }

    let confusions = [
        ('a', 'e'),
        ('e', 'i'),
        ('i', 'o'),
        ('o', 'u'),
        ('c', 'k'),
        ('s', 'z'),
        ('t', 'd'),
    ];

    for (i, &ch) in chars.iter().enumerate() {
        for &(from, to) in &confusions {
            if ch == from {
                let mut new_word = chars.clone();
                new_word[i] = to;
                variants.push(new_word.iter().collect());
            }
        }
    }

    variants
}
