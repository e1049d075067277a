use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use regex::RegexSet;
use rustc_hash::FxHashMap;

use super::types::{ChangeBatch, ChangeKind};

/// Timing and deduplication of raw notify events.
pub(super) struct Debouncer {
    /// Path → ChangeKind (dedup is free via HashMap key uniqueness)
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
    pub(super) last_release: Option<Instant>,
    debounce: Duration,
    cooldown: Duration,
    root: PathBuf,
    ignore: RegexSet,
}

impl Debouncer {
    pub(super) fn new(root: PathBuf, debounce: Duration, cooldown: Duration, ignore: RegexSet) -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
            last_release: None,
            debounce,
            cooldown,
            root,
            ignore,
        }
    }

    /// Add a notify event, applying dedup rules:
    /// - Remove + Create/Modify → Create/Modify (file was restored)
    /// - Modify + Remove → Remove (file was deleted)
    /// - Create + Remove → dropped
    /// - otherwise the first event wins
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Modify(modify) => {
                // mtime/atime/chmod noise
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
                ChangeKind::Modified
            }
            _ => return,
        };

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for path in &event.paths {
            if is_temp_file(path) || self.is_ignored(path) {
                continue;
            }

            if let Some(&existing) = self.changes.get(path) {
                match (existing, kind) {
                    (ChangeKind::Removed, ChangeKind::Created | ChangeKind::Modified) => {
                        crate::debug!("watch"; "restore {}->{}: {}", existing.label(), kind.label(), path.display());
                        self.changes.insert(path.clone(), kind);
                    }
                    (ChangeKind::Modified, ChangeKind::Removed) => {
                        crate::debug!("watch"; "upgrade modified->removed: {}", path.display());
                        self.changes.insert(path.clone(), ChangeKind::Removed);
                    }
                    (ChangeKind::Created, ChangeKind::Removed) => {
                        crate::debug!("watch"; "discard created+removed: {}", path.display());
                        self.changes.remove(path);
                    }
                    _ => continue,
                }
                self.last_event = Some(Instant::now());
                continue;
            }

            crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
            self.changes.insert(path.clone(), kind);
            self.last_event = Some(Instant::now());
        }
    }

    /// Take the pending batch if debounce and cooldown have elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<ChangeBatch> {
        if !self.is_ready() {
            return None;
        }

        let changes = std::mem::take(&mut self.changes);
        self.last_event = None;

        if changes.is_empty() {
            return None;
        }

        self.last_release = Some(Instant::now());
        Some(ChangeBatch::new(changes.into_iter().collect()))
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };

        if last_event.elapsed() < self.debounce {
            return false;
        }

        if let Some(last_release) = self.last_release
            && last_release.elapsed() < self.cooldown
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

        let debounce_remaining = self.debounce.saturating_sub(last_event.elapsed());

        let cooldown_remaining = self
            .last_release
            .map(|t| self.cooldown.saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO);

        debounce_remaining
            .max(cooldown_remaining)
            .max(Duration::from_millis(1))
    }

    /// Match `watch.ignore` patterns against the root-relative path.
    fn is_ignored(&self, path: &Path) -> bool {
        if self.ignore.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let relative = relative.to_string_lossy().replace('\\', "/");
        self.ignore.is_match(&relative)
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
