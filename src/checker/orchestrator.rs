use crate::checker::{find_misspellings, WordChecker};
use crate::config::SpellCheckConfig;
use crate::editor::debounce::Debouncer;
use crate::editor::decorations::{self, Decoration, DecorationSet};
use crate::storage::ClientStore;
use std::time::{Duration, Instant};

pub const CHECK_DEBOUNCE: Duration = Duration::from_millis(500);

/// Owns spell-check enable/disable state, debounces re-checks on document
/// edits, and coordinates the parser, word checker and decoration set.
///
/// Each check pass recomputes the full decoration batch and swaps it in
/// atomically. Passes carry a monotonic id so that a slow pass finishing
/// late is dropped instead of overwriting a newer result.
pub struct SpellCheckOrchestrator {
    enabled: bool,
    config: SpellCheckConfig,
    checker: WordChecker,
    debounce: Debouncer,
    pass_seq: u64,
    applied_pass: u64,
    decorations: DecorationSet,
}

impl SpellCheckOrchestrator {
    pub fn new(config: SpellCheckConfig, checker: WordChecker) -> Self {
        Self {
            enabled: false,
            config,
            checker,
            debounce: Debouncer::new(CHECK_DEBOUNCE),
            pass_seq: 0,
            applied_pass: 0,
            decorations: DecorationSet::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn checking on and run one immediate pass. The pass may run in
    /// degraded mode if the dictionary has not finished loading; `poll`
    /// re-checks once loading completes.
    pub fn enable(&mut self, text: &str) {
        self.enabled = true;
        self.run_check(text);
    }

    /// Turn checking off and clear all decorations.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.debounce.cancel();
        self.decorations.clear();
    }

    /// Record a document content change; the re-check runs after the
    /// debounce quiet period.
    pub fn document_changed(&mut self, now: Instant) {
        if self.enabled {
            self.debounce.note(now);
        }
    }

    /// Drive pending work: the dictionary load transition triggers a full
    /// re-check, and an elapsed debounce runs the deferred one. Returns
    /// true when the decoration set changed.
    pub fn poll(&mut self, text: &str, now: Instant) -> bool {
        let dictionary_ready = self.checker.poll_dictionary();
        if !self.enabled {
            return false;
        }

        let mut changed = false;
        if dictionary_ready {
            self.run_check(text);
            changed = true;
        }
        if self.debounce.fire(now) {
            self.run_check(text);
            changed = true;
        }
        changed
    }

    /// One full synchronous check pass.
    pub fn run_check(&mut self, text: &str) {
        let pass = self.begin_pass();
        let decorations = self.compute_decorations(text);
        self.apply_pass(pass, decorations);
    }

    /// Allocate a pass id for a check whose result is applied later.
    pub fn begin_pass(&mut self) -> u64 {
        self.pass_seq += 1;
        self.pass_seq
    }

    /// Region parse, word extraction and word checks for the whole text.
    pub fn compute_decorations(&self, text: &str) -> Vec<Decoration> {
        decorations::render(&find_misspellings(&self.checker, &self.config, text))
    }

    /// Swap in a pass's decoration batch. Stale passes (an older id
    /// finishing after a newer one applied) are dropped.
    pub fn apply_pass(&mut self, pass: u64, decorations: Vec<Decoration>) -> bool {
        if !self.enabled || pass < self.applied_pass {
            return false;
        }
        self.applied_pass = pass;
        self.decorations.replace_all(decorations);
        true
    }

    /// Add a word to the custom dictionary, persist the set, and re-check
    /// immediately so the resolved decoration disappears.
    pub fn add_to_custom_dictionary(&mut self, word: &str, store: &mut ClientStore, text: &str) {
        self.checker.add_custom_word(word);
        store.set_custom_dictionary(&self.checker.custom_words());
        if self.enabled {
            self.run_check(text);
        }
    }

    pub fn decorations(&self) -> &[Decoration] {
        self.decorations.all()
    }

    pub fn checker(&self) -> &WordChecker {
        &self.checker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::dictionary::{Dictionary, DictionaryHandle};

    const TEXT: &str = "\\cite{foo} The qick brown fox.";

    fn orchestrator(words: &[&str]) -> SpellCheckOrchestrator {
        let dict = Dictionary::from_words(words.iter().copied()).unwrap();
        let checker = WordChecker::new(DictionaryHandle::ready(dict));
        SpellCheckOrchestrator::new(SpellCheckConfig::default(), checker)
    }

    #[test]
    fn test_enable_runs_immediate_check() {
        let mut orch = orchestrator(&["the", "brown", "fox"]);
        orch.enable(TEXT);

        let decorations = orch.decorations();
        assert_eq!(decorations.len(), 1);
        assert_eq!(decorations[0].word, "qick");
        assert_eq!(decorations[0].start, 15);
        assert_eq!(decorations[0].end, 19);
    }

    #[test]
    fn test_disable_clears_decorations_and_stops_checks() {
        let now = Instant::now();
        let mut orch = orchestrator(&["the", "brown", "fox"]);
        orch.enable(TEXT);
        assert!(!orch.decorations().is_empty());

        orch.disable();
        assert!(orch.decorations().is_empty());

        orch.document_changed(now);
        assert!(!orch.poll(TEXT, now + Duration::from_secs(10)));
        assert!(orch.decorations().is_empty());
    }

    #[test]
    fn test_edits_are_debounced() {
        let now = Instant::now();
        let mut orch = orchestrator(&["the", "brown", "fox"]);
        orch.enable("");

        orch.document_changed(now);
        orch.document_changed(now + Duration::from_millis(300));

        assert!(!orch.poll(TEXT, now + Duration::from_millis(700)));
        assert!(orch.poll(TEXT, now + Duration::from_millis(800)));
        assert_eq!(orch.decorations().len(), 1);
    }

    #[test]
    fn test_custom_dictionary_add_clears_decoration() {
        let mut store = ClientStore::in_memory();
        let mut orch = orchestrator(&["the", "brown", "fox"]);
        orch.enable(TEXT);
        assert_eq!(orch.decorations().len(), 1);

        orch.add_to_custom_dictionary("qick", &mut store, TEXT);
        assert!(orch.decorations().is_empty());
        assert_eq!(store.custom_dictionary(), vec!["qick".to_string()]);
    }

    #[test]
    fn test_stale_pass_is_dropped() {
        let mut orch = orchestrator(&["the", "brown", "fox"]);
        orch.enable("");

        let old_pass = orch.begin_pass();
        let old_result = orch.compute_decorations(TEXT);

        let new_pass = orch.begin_pass();
        assert!(orch.apply_pass(new_pass, Vec::new()));

        // The slower, older pass finishes afterwards and must not win.
        assert!(!orch.apply_pass(old_pass, old_result));
        assert!(orch.decorations().is_empty());
    }

    #[test]
    fn test_dictionary_completion_triggers_recheck() {
        use std::sync::mpsc;

        // A checker stuck in loading mode accepts "qick" heuristically.
        let (tx, rx) = mpsc::channel();
        let handle = DictionaryHandle::loading_for_tests(rx);
        let checker = WordChecker::new(handle);
        let mut orch = SpellCheckOrchestrator::new(SpellCheckConfig::default(), checker);

        orch.enable(TEXT);
        assert!(orch.decorations().is_empty());

        // Once the dictionary arrives, poll re-checks and flags it.
        tx.send(Dictionary::from_words(["the", "brown", "fox"]))
            .unwrap();
        let now = Instant::now();
        assert!(orch.poll(TEXT, now));
        assert_eq!(orch.decorations().len(), 1);
        assert_eq!(orch.decorations()[0].word, "qick");
    }
}
