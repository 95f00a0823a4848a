use crate::editor::debounce::Debouncer;
use std::time::{Duration, Instant};

/// Save fires after a longer pause than preview compilation.
pub const SAVE_DEBOUNCE: Duration = Duration::from_secs(5);
pub const PREVIEW_DEBOUNCE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Post all non-empty section contents to the backend in one request.
    SaveSections,
    /// Trigger a preview compilation scoped to the edited section.
    CompilePreview { section: String },
}

/// Two independent debounce timers over the same edit stream. The loading
/// flag suppresses scheduling entirely while content is being loaded
/// programmatically, as opposed to user-typed.
#[derive(Debug)]
pub struct SyncScheduler {
    save: Debouncer,
    preview: Debouncer,
    loading: bool,
    edited_section: Option<String>,
}

impl Default for SyncScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncScheduler {
    pub fn new() -> Self {
        Self {
            save: Debouncer::new(SAVE_DEBOUNCE),
            preview: Debouncer::new(PREVIEW_DEBOUNCE),
            loading: false,
            edited_section: None,
        }
    }

    pub fn record_edit(&mut self, section: &str, now: Instant) {
        if self.loading {
            return;
        }
        self.save.note(now);
        self.preview.note(now);
        self.edited_section = Some(section.to_string());
    }

    pub fn begin_loading(&mut self) {
        self.loading = true;
        // Anything already pending belongs to the previous content.
        self.save.cancel();
        self.preview.cancel();
    }

    pub fn end_loading(&mut self) {
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Collect the actions whose quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Vec<SyncAction> {
        let mut actions = Vec::new();

        if self.preview.fire(now) {
            actions.push(SyncAction::CompilePreview {
                section: self.edited_section.clone().unwrap_or_default(),
            });
        }
        if self.save.fire(now) {
            actions.push(SyncAction::SaveSections);
        }

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_burst_of_edits_yields_one_save_and_one_compile() {
        let start = Instant::now();
        let mut scheduler = SyncScheduler::new();

        for i in 0..20 {
            scheduler.record_edit("methods", start + i * 100 * MS);
        }
        let last_edit = start + 1900 * MS;

        assert!(scheduler.poll(last_edit + 1000 * MS).is_empty());

        let after_preview = scheduler.poll(last_edit + 2000 * MS);
        assert_eq!(
            after_preview,
            vec![SyncAction::CompilePreview {
                section: "methods".to_string()
            }]
        );

        let after_save = scheduler.poll(last_edit + 5000 * MS);
        assert_eq!(after_save, vec![SyncAction::SaveSections]);

        // Nothing fires twice for the same burst.
        assert!(scheduler.poll(last_edit + 60_000 * MS).is_empty());
    }

    #[test]
    fn test_preview_fires_before_save() {
        let start = Instant::now();
        let mut scheduler = SyncScheduler::new();

        scheduler.record_edit("intro", start);
        let actions = scheduler.poll(start + 6000 * MS);
        assert_eq!(actions.len(), 2);
        assert!(matches!(actions[0], SyncAction::CompilePreview { .. }));
        assert_eq!(actions[1], SyncAction::SaveSections);
    }

    #[test]
    fn test_loading_guard_suppresses_scheduling() {
        let start = Instant::now();
        let mut scheduler = SyncScheduler::new();

        scheduler.begin_loading();
        scheduler.record_edit("intro", start);
        scheduler.end_loading();

        assert!(scheduler.poll(start + 10_000 * MS).is_empty());
    }

    #[test]
    fn test_begin_loading_cancels_pending_timers() {
        let start = Instant::now();
        let mut scheduler = SyncScheduler::new();

        scheduler.record_edit("intro", start);
        scheduler.begin_loading();
        scheduler.end_loading();

        assert!(scheduler.poll(start + 10_000 * MS).is_empty());
    }

    #[test]
    fn test_compile_scoped_to_latest_edited_section() {
        let start = Instant::now();
        let mut scheduler = SyncScheduler::new();

        scheduler.record_edit("intro", start);
        scheduler.record_edit("results", start + 100 * MS);

        let actions = scheduler.poll(start + 2200 * MS);
        assert_eq!(
            actions,
            vec![SyncAction::CompilePreview {
                section: "results".to_string()
            }]
        );
    }
}
