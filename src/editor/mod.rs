pub mod debounce;
pub mod decorations;
pub mod scheduler;
pub mod viewer;

use crate::checker::dictionary::DictionaryHandle;
use crate::checker::orchestrator::SpellCheckOrchestrator;
use crate::checker::WordChecker;
use crate::config::Config;
use crate::editor::decorations::Decoration;
use crate::editor::scheduler::{SyncAction, SyncScheduler};
use crate::editor::viewer::ViewerState;
use crate::storage::{ClientStore, KEY_AUTO_PREVIEW, KEY_EDITOR_FONT_SIZE};
use std::collections::BTreeMap;
use std::time::Instant;

pub const FONT_SIZE_MIN: u32 = 8;
pub const FONT_SIZE_MAX: u32 = 32;
pub const FONT_SIZE_DEFAULT: u32 = 14;

/// Editor preferences persisted in the client store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorPrefs {
    font_size: u32,
    auto_preview: bool,
}

impl Default for EditorPrefs {
    fn default() -> Self {
        Self {
            font_size: FONT_SIZE_DEFAULT,
            auto_preview: true,
        }
    }
}

impl EditorPrefs {
    pub fn load(store: &ClientStore) -> Self {
        Self {
            font_size: store
                .get::<u32>(KEY_EDITOR_FONT_SIZE)
                .map(|size| size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX))
                .unwrap_or(FONT_SIZE_DEFAULT),
            auto_preview: store.get(KEY_AUTO_PREVIEW).unwrap_or(true),
        }
    }

    pub fn persist(&self, store: &mut ClientStore) {
        store.set(KEY_EDITOR_FONT_SIZE, &self.font_size);
        store.set(KEY_AUTO_PREVIEW, &self.auto_preview);
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.font_size = size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX);
    }

    pub fn auto_preview(&self) -> bool {
        self.auto_preview
    }

    pub fn set_auto_preview(&mut self, enabled: bool) {
        self.auto_preview = enabled;
    }
}

/// What a `poll` produced: due sync actions and whether the decoration set
/// was rebuilt.
#[derive(Debug, Default)]
pub struct SessionUpdate {
    pub sync_actions: Vec<SyncAction>,
    pub decorations_changed: bool,
}

/// Explicit per-session state: section contents, scheduler, spell-check
/// orchestrator, viewer state and preferences. Replaces ambient globals.
pub struct EditorSession {
    sections: BTreeMap<String, String>,
    active_section: Option<String>,
    scheduler: SyncScheduler,
    orchestrator: SpellCheckOrchestrator,
    viewer: ViewerState,
    prefs: EditorPrefs,
    store: ClientStore,
}

impl EditorSession {
    /// Build a session; the dictionary load starts in the background and
    /// spell checking runs degraded until it completes.
    pub fn new(config: &Config, store: ClientStore) -> Self {
        let handle = DictionaryHandle::load_in_background(&config.language);
        Self::with_dictionary(config, store, handle)
    }

    pub fn with_dictionary(config: &Config, store: ClientStore, handle: DictionaryHandle) -> Self {
        let mut checker = WordChecker::new(handle).with_custom_words(store.custom_dictionary());
        if let Some(seed) = &config.spellcheck.custom_dictionary {
            checker = checker.with_custom_words(seed);
        }

        let mut orchestrator = SpellCheckOrchestrator::new(config.spellcheck.clone(), checker);
        if config.spellcheck.enabled {
            orchestrator.enable("");
        }

        Self {
            sections: BTreeMap::new(),
            active_section: None,
            scheduler: SyncScheduler::new(),
            orchestrator,
            viewer: ViewerState::load(&store),
            prefs: EditorPrefs::load(&store),
            store,
        }
    }

    /// Replace section contents programmatically (project open, section
    /// switch). The loading guard keeps save/compile timers quiet.
    pub fn load_sections(&mut self, sections: BTreeMap<String, String>) {
        self.scheduler.begin_loading();
        self.sections = sections;
        self.active_section = self.sections.keys().next().cloned();
        self.scheduler.end_loading();

        let text = self.active_text().map(str::to_string);
        if let Some(text) = text {
            if self.orchestrator.is_enabled() {
                self.orchestrator.run_check(&text);
            }
        }
    }

    /// A user keystroke: update content and feed both debounce streams.
    pub fn apply_edit(&mut self, section: &str, content: String, now: Instant) {
        self.sections.insert(section.to_string(), content);
        self.active_section = Some(section.to_string());
        self.scheduler.record_edit(section, now);
        self.orchestrator.document_changed(now);
    }

    pub fn set_active_section(&mut self, section: &str) {
        if self.sections.contains_key(section) {
            self.active_section = Some(section.to_string());
        }
    }

    pub fn active_text(&self) -> Option<&str> {
        self.active_section
            .as_ref()
            .and_then(|name| self.sections.get(name))
            .map(String::as_str)
    }

    /// Drive timers and the spell-check pipeline.
    pub fn poll(&mut self, now: Instant) -> SessionUpdate {
        let sync_actions = self.scheduler.poll(now);
        let text = self.active_text().unwrap_or("").to_string();
        let decorations_changed = self.orchestrator.poll(&text, now);

        SessionUpdate {
            sync_actions,
            decorations_changed,
        }
    }

    /// The non-empty sections, as posted to the save endpoint.
    pub fn save_payload(&self) -> BTreeMap<String, String> {
        self.sections
            .iter()
            .filter(|(_, content)| !content.trim().is_empty())
            .map(|(name, content)| (name.clone(), content.clone()))
            .collect()
    }

    pub fn add_to_custom_dictionary(&mut self, word: &str) {
        let text = self.active_text().unwrap_or("").to_string();
        self.orchestrator
            .add_to_custom_dictionary(word, &mut self.store, &text);
    }

    pub fn enable_spellcheck(&mut self) {
        let text = self.active_text().unwrap_or("").to_string();
        self.orchestrator.enable(&text);
    }

    pub fn disable_spellcheck(&mut self) {
        self.orchestrator.disable();
    }

    pub fn decorations(&self) -> &[Decoration] {
        self.orchestrator.decorations()
    }

    pub fn viewer(&self) -> &ViewerState {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut ViewerState {
        &mut self.viewer
    }

    pub fn prefs(&self) -> &EditorPrefs {
        &self.prefs
    }

    pub fn prefs_mut(&mut self) -> &mut EditorPrefs {
        &mut self.prefs
    }

    /// Persist viewer state and preferences in one go.
    pub fn persist_view_state(&mut self) {
        self.viewer.persist(&mut self.store);
        self.prefs.persist(&mut self.store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::dictionary::{Dictionary, DictionaryHandle};
    use std::time::Duration;

    fn session(words: &[&str]) -> EditorSession {
        let dict = Dictionary::from_words(words.iter().copied()).unwrap();
        EditorSession::with_dictionary(
            &Config::default(),
            ClientStore::in_memory(),
            DictionaryHandle::ready(dict),
        )
    }

    #[test]
    fn test_edit_then_quiet_period_produces_one_save_one_compile() {
        let now = Instant::now();
        let mut session = session(&["the", "brown", "fox"]);

        for i in 0..5 {
            session.apply_edit(
                "intro",
                format!("draft {}", i),
                now + Duration::from_millis(i * 100),
            );
        }

        let update = session.poll(now + Duration::from_secs(30));
        assert_eq!(update.sync_actions.len(), 2);
        assert!(matches!(
            update.sync_actions[0],
            SyncAction::CompilePreview { ref section } if section == "intro"
        ));
        assert_eq!(update.sync_actions[1], SyncAction::SaveSections);

        // The same burst never fires twice.
        assert!(session.poll(now + Duration::from_secs(60)).sync_actions.is_empty());
    }

    #[test]
    fn test_loading_sections_schedules_nothing() {
        let now = Instant::now();
        let mut session = session(&["the", "brown", "fox"]);

        let mut sections = BTreeMap::new();
        sections.insert("intro".to_string(), "The brown fox.".to_string());
        session.load_sections(sections);

        let update = session.poll(now + Duration::from_secs(30));
        assert!(update.sync_actions.is_empty());
    }

    #[test]
    fn test_load_sections_checks_immediately() {
        let mut session = session(&["the", "brown", "fox"]);

        let mut sections = BTreeMap::new();
        sections.insert("intro".to_string(), "The qick fox.".to_string());
        session.load_sections(sections);

        assert_eq!(session.decorations().len(), 1);
        assert_eq!(session.decorations()[0].word, "qick");
    }

    #[test]
    fn test_save_payload_drops_empty_sections() {
        let now = Instant::now();
        let mut session = session(&[]);
        session.apply_edit("intro", "Some prose".to_string(), now);
        session.apply_edit("methods", "   ".to_string(), now);

        let payload = session.save_payload();
        assert_eq!(payload.len(), 1);
        assert!(payload.contains_key("intro"));
    }

    #[test]
    fn test_custom_dictionary_add_round_trip() {
        let now = Instant::now();
        let mut session = session(&["the", "fox"]);

        session.apply_edit("intro", "The qick fox.".to_string(), now);
        let update = session.poll(now + Duration::from_secs(1));
        assert!(update.decorations_changed);
        assert_eq!(session.decorations().len(), 1);

        session.add_to_custom_dictionary("qick");
        assert!(session.decorations().is_empty());
    }

    #[test]
    fn test_prefs_clamping_and_persistence() {
        let mut store = ClientStore::in_memory();
        let mut prefs = EditorPrefs::default();
        prefs.set_font_size(100);
        assert_eq!(prefs.font_size(), FONT_SIZE_MAX);
        prefs.set_auto_preview(false);
        prefs.persist(&mut store);

        let restored = EditorPrefs::load(&store);
        assert_eq!(restored, prefs);
    }
}
