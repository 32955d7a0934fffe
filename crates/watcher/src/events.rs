//! Change batches derived from raw notifications
//!
//! Only events that can leave a new name in the directory are kept. The
//! rename pass rescans the whole directory, so a batch carries paths purely
//! for pre-filtering.

use notify::event::{ModifyKind, RenameMode};
use notify::{Event as NotifyEvent, EventKind};
use std::path::{Path, PathBuf};

/// Paths that appeared in the watched directory in one notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBatch {
    paths: Vec<PathBuf>,
}

impl ChangeBatch {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Convert a notification, returning `None` when nothing relevant changed
    pub fn from_notify(event: &NotifyEvent) -> Option<Self> {
        let paths: Vec<PathBuf> = match event.kind {
            EventKind::Create(_) => event.paths.clone(),
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event.paths.clone(),
            // [from, to]
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                event.paths.get(1).cloned().into_iter().collect()
            }
            // Some backends can't tell the two halves of a rename apart.
            EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => event
                .paths
                .iter()
                .filter(|path| path_exists(path))
                .cloned()
                .collect(),
            _ => Vec::new(),
        };

        if paths.is_empty() {
            None
        } else {
            Some(Self { paths })
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Final path components that are valid UTF-8
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.paths
            .iter()
            .filter_map(|path| path.file_name())
            .filter_map(|name| name.to_str())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn path_exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, RemoveKind};
    use tempfile::TempDir;

    fn event(kind: EventKind, paths: &[&str]) -> NotifyEvent {
        paths
            .iter()
            .fold(NotifyEvent::new(kind), |event, path| {
                event.add_path(PathBuf::from(path))
            })
    }

    #[test]
    fn test_create_is_relevant() {
        let batch = ChangeBatch::from_notify(&event(
            EventKind::Create(CreateKind::File),
            &["/shots/Screenshot 2024-01-15 at 1.23.45 PM.png"],
        ))
        .expect("create should produce a batch");

        assert_eq!(
            batch.file_names().collect::<Vec<_>>(),
            vec!["Screenshot 2024-01-15 at 1.23.45 PM.png"]
        );
    }

    #[test]
    fn test_rename_both_keeps_destination() {
        let batch = ChangeBatch::from_notify(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/shots/.tmp-capture", "/shots/Screenshot 2024-01-15 at 1.23.45 PM.png"],
        ))
        .expect("rename should produce a batch");

        assert_eq!(
            batch.paths(),
            &[PathBuf::from(
                "/shots/Screenshot 2024-01-15 at 1.23.45 PM.png"
            )]
        );
    }

    #[test]
    fn test_rename_to_is_relevant() {
        let batch = ChangeBatch::from_notify(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &["/shots/a.png"],
        ));
        assert_eq!(batch.map(|b| b.len()), Some(1));
    }

    #[test]
    fn test_irrelevant_kinds_are_dropped() {
        let kinds = [
            EventKind::Remove(RemoveKind::File),
            EventKind::Access(AccessKind::Any),
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
        ];

        for kind in kinds {
            assert!(
                ChangeBatch::from_notify(&event(kind, &["/shots/a.png"])).is_none(),
                "{kind:?} should be ignored"
            );
        }
    }

    #[test]
    fn test_ambiguous_rename_requires_existing_path() {
        let dir = TempDir::new().expect("test setup failed");
        let present = dir.path().join("present.png");
        std::fs::write(&present, b"x").expect("test setup failed");
        let gone = dir.path().join("gone.png");

        let notify_event = NotifyEvent::new(EventKind::Modify(ModifyKind::Name(RenameMode::Any)))
            .add_path(gone)
            .add_path(present.clone());

        let batch = ChangeBatch::from_notify(&notify_event).expect("present path should remain");
        assert_eq!(batch.paths(), &[present]);
    }

    #[test]
    fn test_event_without_paths_is_dropped() {
        assert!(ChangeBatch::from_notify(&event(EventKind::Create(CreateKind::Any), &[])).is_none());
    }
}
