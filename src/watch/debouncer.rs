//! Pure debouncer: timing and event deduplication only.
//!
//! Business logic (which stage a path belongs to) lives in the watch actor.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::utils::path::normalize_path;

pub(super) const DEBOUNCE_MS: u64 = 300;
pub(super) const REBUILD_COOLDOWN_MS: u64 = 800;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

pub(super) struct Debouncer {
    /// Path → ChangeKind (dedup is free via HashMap key uniqueness)
    changes: FxHashMap<PathBuf, ChangeKind>,
    last_event: Option<std::time::Instant>,
    last_trigger: Option<std::time::Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
            last_trigger: None,
        }
    }

    /// Add a notify event, applying dedup rules:
    /// - Removed + Created/Modified → Created/Modified (file was restored)
    /// - Modified + Removed → Removed (file was deleted)
    /// - Created + Removed → discard (appeared then vanished)
    /// - Same type events: first event wins
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Modify(modify) => {
                // Ignore metadata-only changes (mtime/atime/chmod noise)
                // may trigger endless rebuild loops
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
                ChangeKind::Modified
            }
            _ => return,
        };

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }

            let path = normalize_path(path);

            if let Some(&existing) = self.changes.get(&path) {
                match (existing, kind) {
                    (ChangeKind::Removed, ChangeKind::Created | ChangeKind::Modified) => {
                        self.changes.insert(path, kind);
                    }
                    (ChangeKind::Modified, ChangeKind::Removed) => {
                        self.changes.insert(path, ChangeKind::Removed);
                    }
                    (ChangeKind::Created, ChangeKind::Removed) => {
                        self.changes.remove(&path);
                    }
                    _ => continue,
                }
                self.last_event = Some(std::time::Instant::now());
                continue;
            }

            crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
            self.changes.insert(path, kind);
            self.last_event = Some(std::time::Instant::now());
        }
    }

    /// Take raw events if debounce + cooldown elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }

        let changes = std::mem::take(&mut self.changes);
        self.last_event = None;

        if changes.is_empty() {
            return None;
        }

        self.last_trigger = Some(std::time::Instant::now());
        Some(changes)
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };

        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return false;
        }

        if let Some(last_trigger) = self.last_trigger
            && last_trigger.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS)
        {
            return false;
        }

        !self.changes.is_empty()
    }

    /// Precise sleep duration until next possible ready time.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        let debounce_remaining =
            Duration::from_millis(DEBOUNCE_MS).saturating_sub(last_event.elapsed());

        let cooldown_remaining = self
            .last_trigger
            .map(|t| Duration::from_millis(REBUILD_COOLDOWN_MS).saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO);

        debounce_remaining
            .max(cooldown_remaining)
            .max(Duration::from_millis(1))
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
        notify::Event {
            kind,
            paths: paths.into_iter().map(PathBuf::from).collect(),
            attrs: Default::default(),
        }
    }

    fn modify_kind() -> notify::EventKind {
        notify::EventKind::Modify(notify::event::ModifyKind::Data(
            notify::event::DataChange::Any,
        ))
    }

    fn create_kind() -> notify::EventKind {
        notify::EventKind::Create(notify::event::CreateKind::File)
    }

    fn remove_kind() -> notify::EventKind {
        notify::EventKind::Remove(notify::event::RemoveKind::File)
    }

    #[test]
    fn test_debouncer_empty() {
        let debouncer = Debouncer::new();
        assert!(!debouncer.is_ready());
    }

    #[test]
    fn test_debouncer_not_ready_within_window() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&make_event(vec!["/tmp/main.css"], modify_kind()));
        // Within the debounce window: not ready yet.
        assert!(!debouncer.is_ready());
        assert!(debouncer.take_if_ready().is_none());
    }

    #[test]
    fn test_debouncer_dedups_same_path() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&make_event(vec!["/tmp/main.css"], modify_kind()));
        debouncer.add_event(&make_event(vec!["/tmp/main.css"], modify_kind()));
        assert_eq!(debouncer.changes.len(), 1);
    }

    #[test]
    fn test_created_then_removed_discards() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&make_event(vec!["/tmp/new.css"], create_kind()));
        debouncer.add_event(&make_event(vec!["/tmp/new.css"], remove_kind()));
        assert!(debouncer.changes.is_empty());
    }

    #[test]
    fn test_modified_then_removed_upgrades() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&make_event(vec!["/tmp/main.css"], modify_kind()));
        debouncer.add_event(&make_event(vec!["/tmp/main.css"], remove_kind()));
        assert_eq!(
            debouncer.changes.values().next(),
            Some(&ChangeKind::Removed)
        );
    }

    #[test]
    fn test_metadata_changes_ignored() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&make_event(
            vec!["/tmp/main.css"],
            notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
                notify::event::MetadataKind::Any,
            )),
        ));
        assert!(debouncer.changes.is_empty());
    }

    #[test]
    fn test_temp_files_skipped() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&make_event(vec!["/tmp/.main.css.swp"], modify_kind()));
        debouncer.add_event(&make_event(vec!["/tmp/main.css~"], modify_kind()));
        assert!(debouncer.changes.is_empty());
    }
}
