use std::path::{Path, PathBuf};

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// One debounced batch of file changes, sorted by path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBatch(Vec<(PathBuf, ChangeKind)>);

impl ChangeBatch {
    pub fn new(mut changes: Vec<(PathBuf, ChangeKind)>) -> Self {
        changes.sort_by(|a, b| a.0.cmp(&b.0));
        Self(changes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, ChangeKind)> {
        self.0.iter().map(|(p, k)| (p.as_path(), *k))
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, path: &Path) -> bool {
        self.0.iter().any(|(p, _)| p == path)
    }

    /// One-line description, relative to `root`.
    pub fn summary(&self, root: &Path) -> String {
        match self.0.as_slice() {
            [] => "no changes".into(),
            [(path, kind)] => {
                let rel = path.strip_prefix(root).unwrap_or(path);
                format!("{}: {}", kind.label(), rel.display())
            }
            changes => format!("{} files changed", changes.len()),
        }
    }
}
