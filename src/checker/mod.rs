pub mod dictionary;
pub mod heuristics;
pub mod orchestrator;
pub mod suggestions;

use crate::config::{Config, SpellCheckConfig};
use crate::parser::{self, words};
use crate::storage::ClientStore;
use crate::{CheckResult, SpellError};
use anyhow::{Context, Result};
use dashmap::DashMap;
use dialoguer::Select;
use dictionary::{Dictionary, DictionaryHandle, DictionaryState};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A misspelled word with absolute document offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Misspelling {
    pub word: String,
    pub start: usize,
    pub end: usize,
}

/// Classifies single words. Holds the (possibly still loading) dictionary,
/// the user's custom dictionary and the session-lifetime verdict cache.
pub struct WordChecker {
    dictionary: DictionaryHandle,
    custom: HashSet<String>,
    cache: DashMap<String, bool>,
}

impl WordChecker {
    pub fn new(dictionary: DictionaryHandle) -> Self {
        Self {
            dictionary,
            custom: HashSet::new(),
            cache: DashMap::new(),
        }
    }

    pub fn with_custom_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.custom.insert(word.as_ref().to_lowercase());
        }
        self
    }

    /// Drive a pending dictionary load. True once, when it becomes ready.
    pub fn poll_dictionary(&mut self) -> bool {
        self.dictionary.poll()
    }

    pub fn wait_for_dictionary(&mut self) {
        self.dictionary.wait();
    }

    pub fn dictionary_state(&self) -> DictionaryState {
        self.dictionary.state()
    }

    pub fn dictionary(&self) -> Option<&Dictionary> {
        self.dictionary.get()
    }

    /// Add a word to the custom dictionary and force its cache entry
    /// correct. Returns the stored (lower-cased) form.
    pub fn add_custom_word(&mut self, word: &str) -> String {
        let lower = word.to_lowercase();
        self.custom.insert(lower.clone());
        self.cache.insert(lower.clone(), true);
        lower
    }

    /// The custom dictionary set, sorted for stable persistence.
    pub fn custom_words(&self) -> Vec<String> {
        let mut words: Vec<String> = self.custom.iter().cloned().collect();
        words.sort();
        words
    }

    /// Decide correctness of a single word. First matching rule wins.
    pub fn is_word_correct(&self, word: &str) -> bool {
        // Short tokens (articles, abbreviations) are never flagged.
        if word.chars().count() <= 2 {
            return true;
        }

        // Proper-noun heuristic: leading capital, lowercase tail.
        if is_simple_capitalized(word) {
            return true;
        }

        let lower = word.to_lowercase();

        if self.custom.contains(&lower) {
            return true;
        }

        if let Some(cached) = self.cache.get(&lower) {
            return *cached;
        }

        // Tokens with digits ("figure1", "2020") pass.
        if word.chars().any(|c| c.is_ascii_digit()) {
            return true;
        }

        // Hyphenated compounds are accepted wholesale, even when a part
        // would fail on its own. Known-loose policy, kept as-is.
        if word.contains('-') {
            return true;
        }

        match self.dictionary.get() {
            Some(dict) => {
                let correct = dict.contains(&lower);
                self.cache.insert(lower, correct);
                correct
            }
            // Heuristic mode while the dictionary loads or after it failed.
            None => heuristics::plausible(&lower),
        }
    }
}

/// Region pass plus word checks over a whole document: the shared core of
/// the CLI checker and the editor orchestrator.
pub fn find_misspellings(
    checker: &WordChecker,
    config: &SpellCheckConfig,
    content: &str,
) -> Vec<Misspelling> {
    let mut found = Vec::new();

    for region in parser::checkable_regions(content, config) {
        for word in words::extract_words(&region.text) {
            if checker.is_word_correct(&word.text) {
                continue;
            }
            found.push(Misspelling {
                word: word.text,
                start: region.start_offset + word.start,
                end: region.start_offset + word.end,
            });
        }
    }

    found
}

fn is_simple_capitalized(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => chars.all(|c| c.is_lowercase()),
        _ => false,
    }
}

/// File-level spell checking for the CLI: LaTeX region pass, word checks,
/// suggestions, fixes.
pub struct SpellChecker {
    checker: WordChecker,
    spellcheck: SpellCheckConfig,
    max_suggestions: usize,
}

impl SpellChecker {
    pub fn new(config: &Config, store: &ClientStore) -> Result<Self> {
        let mut handle = DictionaryHandle::load_in_background(&config.language);
        // The CLI checks synchronously, so block here; the editor session
        // keeps the load in the background instead.
        handle.wait();

        let mut checker = WordChecker::new(handle).with_custom_words(store.custom_dictionary());
        if let Some(seed) = &config.spellcheck.custom_dictionary {
            checker = checker.with_custom_words(seed);
        }

        Ok(Self {
            checker,
            spellcheck: config.spellcheck.clone(),
            max_suggestions: config.max_suggestions,
        })
    }

    pub fn with_parts(checker: WordChecker, spellcheck: SpellCheckConfig, max_suggestions: usize) -> Self {
        Self {
            checker,
            spellcheck,
            max_suggestions,
        }
    }

    pub fn word_checker(&self) -> &WordChecker {
        &self.checker
    }

    /// Region pass plus word checks over a whole document.
    pub fn misspellings(&self, content: &str) -> Vec<Misspelling> {
        find_misspellings(&self.checker, &self.spellcheck, content)
    }

    fn errors_for(&self, content: &str) -> Vec<SpellError> {
        self.misspellings(content)
            .into_iter()
            .map(|m| {
                let (line, column) = words::line_col(content, m.start);
                let suggestions = match self.checker.dictionary() {
                    Some(dict) => {
                        suggestions::generate(&m.word.to_lowercase(), dict, self.max_suggestions)
                    }
                    None => Vec::new(),
                };
                SpellError {
                    context: words::context_snippet(content, m.start, m.end),
                    word: m.word,
                    line,
                    column,
                    suggestions,
                }
            })
            .collect()
    }

    pub fn check(&self, file_path: &Path) -> Result<CheckResult> {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let errors = self.errors_for(&content);
        Ok(CheckResult {
            error_count: errors.len(),
            fixed_count: 0,
            errors,
        })
    }

    /// Replace every misspelling with its top suggestion, in place.
    pub fn fix_auto(&self, file_path: &Path) -> Result<CheckResult> {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let mut replacements = Vec::new();
        for m in self.misspellings(&content) {
            let suggestions = match self.checker.dictionary() {
                Some(dict) => suggestions::generate(&m.word.to_lowercase(), dict, 1),
                None => Vec::new(),
            };
            if let Some(top) = suggestions.into_iter().next() {
                replacements.push((m.start, m.end, top));
            }
        }

        let fixed_count = replacements.len();
        if fixed_count > 0 {
            let new_content = apply_replacements(&content, replacements);
            fs::write(file_path, new_content)
                .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
        }

        Ok(CheckResult {
            error_count: 0,
            fixed_count,
            errors: Vec::new(),
        })
    }

    /// Prompt per misspelling: replace, skip, or add to the custom
    /// dictionary (persisted through the store).
    pub fn fix_interactive(
        &mut self,
        file_path: &Path,
        store: &mut ClientStore,
    ) -> Result<CheckResult> {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let mut replacements = Vec::new();
        let mut added_any = false;

        for m in self.misspellings(&content) {
            let suggestions = match self.checker.dictionary() {
                Some(dict) => {
                    suggestions::generate(&m.word.to_lowercase(), dict, self.max_suggestions)
                }
                None => Vec::new(),
            };

            let (line, column) = words::line_col(&content, m.start);
            println!(
                "\n{}:{}:{} {}",
                file_path.display(),
                line,
                column,
                console::style(&m.word).red().bold()
            );
            println!("  {}", words::context_snippet(&content, m.start, m.end));

            let mut items: Vec<String> = suggestions.clone();
            items.push("Skip".to_string());
            items.push("Add to dictionary".to_string());

            let choice = Select::new()
                .with_prompt("Correction")
                .items(&items)
                .default(0)
                .interact()
                .context("Interactive prompt failed")?;

            if choice < suggestions.len() {
                replacements.push((m.start, m.end, suggestions[choice].clone()));
            } else if choice == suggestions.len() + 1 {
                self.checker.add_custom_word(&m.word);
                added_any = true;
            }
        }

        if added_any {
            store.set_custom_dictionary(&self.checker.custom_words());
        }

        let fixed_count = replacements.len();
        if fixed_count > 0 {
            let new_content = apply_replacements(&content, replacements);
            fs::write(file_path, new_content)
                .with_context(|| format!("Failed to write file: {}", file_path.display()))?;
        }

        Ok(CheckResult {
            error_count: 0,
            fixed_count,
            errors: Vec::new(),
        })
    }
}

/// Apply byte-range replacements back to front so earlier offsets stay valid.
fn apply_replacements(content: &str, mut replacements: Vec<(usize, usize, String)>) -> String {
    replacements.sort_by_key(|(start, _, _)| *start);

    let mut result = content.to_string();
    for (start, end, replacement) in replacements.into_iter().rev() {
        result.replace_range(start..end, &replacement);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_checker(words: &[&str]) -> WordChecker {
        let dict = Dictionary::from_words(words.iter().copied()).unwrap();
        WordChecker::new(DictionaryHandle::ready(dict))
    }

    #[test]
    fn test_short_words_always_pass() {
        let checker = loaded_checker(&[]);
        assert!(checker.is_word_correct("a"));
        assert!(checker.is_word_correct("of"));
    }

    #[test]
    fn test_capitalized_words_pass() {
        let checker = loaded_checker(&[]);
        assert!(checker.is_word_correct("Heisenberg"));
        // All-caps and mixed case fall through to the dictionary.
        assert!(!checker.is_word_correct("DNAzzz"));
    }

    #[test]
    fn test_digits_and_hyphens_pass() {
        let checker = loaded_checker(&[]);
        assert!(checker.is_word_correct("figure1"));
        assert!(checker.is_word_correct("state-of-the-art"));
        assert!(checker.is_word_correct("xzqj-vvv"));
    }

    #[test]
    fn test_custom_dictionary_is_case_insensitive() {
        let checker = loaded_checker(&[]).with_custom_words(["Navier"]);
        assert!(checker.is_word_correct("navier"));
        assert!(checker.is_word_correct("NAVIER"));
    }

    #[test]
    fn test_dictionary_verdicts_are_cached() {
        let checker = loaded_checker(&["brown"]);
        assert!(checker.is_word_correct("brown"));
        assert!(!checker.is_word_correct("qick"));

        // Determinism: the cached verdict matches the first call.
        assert_eq!(checker.cache.get("brown").map(|v| *v), Some(true));
        assert_eq!(checker.cache.get("qick").map(|v| *v), Some(false));
        assert!(checker.is_word_correct("brown"));
        assert!(!checker.is_word_correct("qick"));
    }

    #[test]
    fn test_add_custom_word_overrides_cached_verdict() {
        let mut checker = loaded_checker(&[]);
        assert!(!checker.is_word_correct("qick"));
        checker.add_custom_word("qick");
        assert!(checker.is_word_correct("qick"));
    }

    #[test]
    fn test_degraded_mode_uses_heuristics() {
        let checker = WordChecker::new(DictionaryHandle::unavailable());
        assert!(!checker.is_word_correct("teh"));
        assert!(checker.is_word_correct("whatever"));
    }

    #[test]
    fn test_spec_example_scenario() {
        let dict = Dictionary::from_words(["the", "brown", "fox"]).unwrap();
        let checker = WordChecker::new(DictionaryHandle::ready(dict));
        let spell = SpellChecker::with_parts(checker, SpellCheckConfig::default(), 5);

        let found = spell.misspellings("\\cite{foo} The qick brown fox.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].word, "qick");
        assert_eq!(found[0].start, 15);
        assert_eq!(found[0].end, 19);
    }

    #[test]
    fn test_apply_replacements_back_to_front() {
        let content = "aa bb cc";
        let result = apply_replacements(
            content,
            vec![(0, 2, "xxx".to_string()), (6, 8, "y".to_string())],
        );
        assert_eq!(result, "xxx bb y");
    }
}
