//! Pre-filtering of change batches before they reach the debouncer

use crate::events::ChangeBatch;
use shotrename_core::FilenameGrammar;
use tracing::trace;

/// Decides whether a batch may lead to a rename
///
/// A batch is relevant when at least one of its names is visible and not yet
/// canonical. Names produced by the watcher's own renames are canonical, so
/// they never schedule another pass.
///
/// This uses [`FilenameGrammar::needs_rename`] rather than a plain grammar
/// match: a name that matches but is already canonical is dropped here.
pub(crate) struct BatchFilter {
    grammar: FilenameGrammar,
}

impl BatchFilter {
    pub(crate) fn new(grammar: FilenameGrammar) -> Self {
        Self { grammar }
    }

    pub(crate) fn is_relevant(&self, batch: &ChangeBatch) -> bool {
        batch.file_names().any(|name| {
            if is_hidden(name) {
                trace!("Ignoring hidden file: {}", name);
                return false;
            }
            self.grammar.needs_rename(name)
        })
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn filter() -> BatchFilter {
        BatchFilter::new(FilenameGrammar::compile("Screenshot").expect("test setup failed"))
    }

    fn batch(names: &[&str]) -> ChangeBatch {
        ChangeBatch::new(
            names
                .iter()
                .map(|name| PathBuf::from("/shots").join(name))
                .collect(),
        )
    }

    #[test]
    fn test_matching_screenshot_is_relevant() {
        assert!(filter().is_relevant(&batch(&["Screenshot 2024-01-15 at 1.23.45 PM.png"])));
    }

    #[test]
    fn test_canonical_name_is_not_relevant() {
        assert!(!filter().is_relevant(&batch(&["screenshot 2024-01-15 at 13.23.45.png"])));
    }

    #[test]
    fn test_hidden_and_unrelated_names_are_not_relevant() {
        assert!(!filter().is_relevant(&batch(&[
            ".Screenshot 2024-01-15 at 1.23.45 PM.png",
            "notes.txt",
        ])));
    }

    #[test]
    fn test_any_relevant_name_wins() {
        assert!(filter().is_relevant(&batch(&[
            "notes.txt",
            "Screenshot 2024-01-15 at 9.20.55 AM (2).png",
        ])));
    }
}
