//! Scan-and-rename pass over a screenshot directory
//!
//! A pass validates the directory, snapshots its entries, and renames every
//! matching screenshot to its canonical name. Problems with individual files
//! are collected in the [`RenameOutcome`] instead of aborting the pass.

use crate::error::{Error, Result, ResultExt};
use crate::grammar::{FilenameGrammar, ParsedMatch};
use crate::settings::Settings;
use crate::validator::PathValidator;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Highest sequence number tried before falling back to a timestamp
pub const MAX_SEQUENCE: u32 = 999;

/// Destination lookups per file when another process keeps taking the name
const RENAME_ATTEMPTS: u32 = 3;

/// Summary of a single rename pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameOutcome {
    scanned: usize,
    renamed: usize,
    failures: Vec<String>,
}

impl RenameOutcome {
    /// Number of regular, non-hidden files looked at
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Number of files renamed
    pub fn renamed(&self) -> usize {
        self.renamed
    }

    /// Per-file failures, in the order they happened
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// One-line summary of the counts
    pub fn summary(&self) -> String {
        format!(
            "Scanned {} files, renamed {} screenshots",
            self.scanned, self.renamed
        )
    }

    /// Summary followed by every failure, one per line
    pub fn detailed_summary(&self) -> String {
        let mut result = self.summary();
        if self.has_failures() {
            result.push_str("\n\nErrors:\n");
            result.push_str(&self.failures.join("\n"));
        }
        result
    }
}

/// Renames screenshots in one directory to their canonical names
#[derive(Debug, Clone)]
pub struct RenameEngine {
    settings: Settings,
    grammar: FilenameGrammar,
    validator: PathValidator,
}

impl RenameEngine {
    /// Create an engine for `settings` with no whitelist
    pub fn new(settings: Settings) -> Result<Self> {
        let grammar = FilenameGrammar::compile(&settings.prefix)?;
        Ok(Self {
            settings,
            grammar,
            validator: PathValidator::new(),
        })
    }

    /// Restrict the engine to directories inside `whitelist`
    pub fn with_whitelist(mut self, whitelist: Vec<PathBuf>) -> Self {
        self.validator = PathValidator::with_whitelist(whitelist);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn grammar(&self) -> &FilenameGrammar {
        &self.grammar
    }

    /// Run one pass over the configured directory
    ///
    /// Only directory validation and listing failures are returned as errors;
    /// nothing is renamed in that case.
    pub fn run(&self) -> Result<RenameOutcome> {
        let directory = self.validator.validate_directory(&self.settings.directory)?;

        // Snapshot first so renamed entries are not listed a second time.
        let entries: Vec<_> = fs::read_dir(&directory)
            .context(format!("Failed to list {}", directory.display()))?
            .collect();

        let mut outcome = RenameOutcome::default();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    outcome.failures.push(format!("<unreadable entry>: {e}"));
                    continue;
                }
            };

            let file_name = entry.file_name();
            let display_name = file_name.to_string_lossy();
            if display_name.starts_with('.') {
                continue;
            }

            match entry.file_type() {
                Ok(file_type) if file_type.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    outcome.failures.push(format!("{display_name}: {e}"));
                    continue;
                }
            }

            outcome.scanned += 1;

            let Some(filename) = file_name.to_str() else {
                trace!("Skipping non UTF-8 filename: {:?}", file_name);
                continue;
            };

            let Some(parsed) = self.grammar.parse(filename) else {
                continue;
            };

            match self.rename_entry(&directory, filename, &parsed) {
                Ok(Some(new_name)) => {
                    info!("Renamed: {} -> {}", filename, new_name);
                    outcome.renamed += 1;
                }
                Ok(None) => {
                    trace!("Already canonical: {}", filename);
                }
                Err(e) => {
                    error!("Error renaming {}: {}", filename, e);
                    outcome.failures.push(format!("{filename}: {e}"));
                }
            }
        }

        debug!(
            scanned = outcome.scanned,
            renamed = outcome.renamed,
            failures = outcome.failures.len(),
            "Rename pass finished for {}",
            directory.display()
        );
        Ok(outcome)
    }

    /// Run a pass on the blocking thread pool
    pub async fn run_async(self: Arc<Self>) -> Result<RenameOutcome> {
        tokio::task::spawn_blocking(move || self.run())
            .await
            .map_err(|e| Error::with_context("Rename task failed", e))?
    }

    /// Rename one matched file, returning the new name or `None` when the
    /// file is already canonical
    fn rename_entry(
        &self,
        directory: &Path,
        filename: &str,
        parsed: &ParsedMatch,
    ) -> Result<Option<String>> {
        PathValidator::sanitize_filename(filename)?;

        let canonical = parsed.build_name(&self.settings.prefix);
        if canonical == filename {
            return Ok(None);
        }
        PathValidator::sanitize_filename(&canonical)?;

        let source = directory.join(filename);
        PathValidator::validate_within_directory(&source, directory)?;

        // A case-only rename on a case-insensitive volume sees its own target.
        if canonical.to_lowercase() == filename.to_lowercase()
            && is_same_file(&source, &directory.join(&canonical))
        {
            fs::rename(&source, directory.join(&canonical))
                .context(format!("Failed to rename to {canonical}"))?;
            return Ok(Some(canonical));
        }

        for attempt in 1..=RENAME_ATTEMPTS {
            let final_name = resolve_available_name(directory, &canonical)?;
            PathValidator::sanitize_filename(&final_name)?;

            match rename_no_replace(&source, &directory.join(&final_name)) {
                Ok(()) => return Ok(Some(final_name)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(
                        "{} appeared before rename (attempt {}/{})",
                        final_name, attempt, RENAME_ATTEMPTS
                    );
                }
                Err(e) => {
                    return Err(Error::with_context(
                        format!("Failed to rename to {final_name}"),
                        e,
                    ))
                }
            }
        }

        Err(Error::CollisionExhausted(canonical))
    }
}

/// Find a name in `directory` that is not taken, starting from `desired`
///
/// Taken names get ` 1` through ` 999` inserted before the extension, using a
/// single snapshot of the directory. Past that the current Unix timestamp is
/// used, with `-N` appended if the timestamp name is taken too.
pub fn resolve_available_name(directory: &Path, desired: &str) -> Result<String> {
    if !path_exists(&directory.join(desired)) {
        return Ok(desired.to_string());
    }

    let existing: HashSet<String> = fs::read_dir(directory)
        .context(format!("Failed to list {}", directory.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();

    let (stem, extension) = split_extension(desired);

    for i in 1..=MAX_SEQUENCE {
        let candidate = with_suffix(stem, extension, &i.to_string());
        if !existing.contains(&candidate) {
            debug!("Found available filename with sequence: {}", candidate);
            return Ok(candidate);
        }
    }

    let timestamp = chrono::Utc::now().timestamp();
    let is_free = |candidate: &String| {
        !existing.contains(candidate) && !path_exists(&directory.join(candidate))
    };

    let candidate = with_suffix(stem, extension, &timestamp.to_string());
    if is_free(&candidate) {
        info!("Using timestamp fallback for filename: {}", candidate);
        return Ok(candidate);
    }

    for n in 1..=MAX_SEQUENCE {
        let candidate = with_suffix(stem, extension, &format!("{timestamp}-{n}"));
        if is_free(&candidate) {
            info!("Using timestamp fallback for filename: {}", candidate);
            return Ok(candidate);
        }
    }

    Err(Error::CollisionExhausted(desired.to_string()))
}

/// Split at the last dot; names without one have no extension
fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, extension)) => (stem, Some(extension)),
        None => (filename, None),
    }
}

fn with_suffix(stem: &str, extension: Option<&str>, suffix: &str) -> String {
    match extension {
        Some(extension) => format!("{stem} {suffix}.{extension}"),
        None => format!("{stem} {suffix}"),
    }
}

/// Rename `from` to `to`, failing with `AlreadyExists` instead of replacing `to`
fn rename_no_replace(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    match renameat2_no_replace(from, to) {
        Ok(()) => return Ok(()),
        // Filesystems without RENAME_NOREPLACE support
        Err(e) if matches!(e.raw_os_error(), Some(libc::EINVAL) | Some(libc::ENOSYS)) => {}
        Err(e) => return Err(e),
    }

    link_then_unlink(from, to)
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
fn renameat2_no_replace(from: &Path, to: &Path) -> io::Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let from = CString::new(from.as_os_str().as_bytes())?;
    let to = CString::new(to.as_os_str().as_bytes())?;
    // SAFETY: both pointers are valid NUL-terminated strings for the duration of the call.
    let rc = unsafe {
        libc::renameat2(
            libc::AT_FDCWD,
            from.as_ptr(),
            libc::AT_FDCWD,
            to.as_ptr(),
            libc::RENAME_NOREPLACE,
        )
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// `link(2)` refuses an existing target, so link first and drop the old name
fn link_then_unlink(from: &Path, to: &Path) -> io::Result<()> {
    match fs::hard_link(from, to) {
        Ok(()) => fs::remove_file(from),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(e),
        Err(e) => {
            debug!("Hard link unavailable ({}), using checked rename", e);
            if path_exists(to) {
                Err(io::Error::from(ErrorKind::AlreadyExists))
            } else {
                fs::rename(from, to)
            }
        }
    }
}

/// Existence without following symlinks, so a dangling link still counts
fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

#[cfg(unix)]
fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::symlink_metadata(a), fs::symlink_metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(_a: &Path, _b: &Path) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), name).expect("test setup failed");
    }

    #[test]
    fn test_resolve_returns_desired_when_free() {
        let temp = TempDir::new().expect("test setup failed");
        let name = resolve_available_name(temp.path(), "shot.png").expect("should resolve");
        assert_eq!(name, "shot.png");
    }

    #[test]
    fn test_resolve_appends_first_free_sequence() {
        let temp = TempDir::new().expect("test setup failed");
        touch(temp.path(), "shot.png");
        touch(temp.path(), "shot 1.png");
        touch(temp.path(), "shot 3.png");

        let name = resolve_available_name(temp.path(), "shot.png").expect("should resolve");
        assert_eq!(name, "shot 2.png");
    }

    #[test]
    fn test_resolve_without_extension() {
        let temp = TempDir::new().expect("test setup failed");
        touch(temp.path(), "shot");

        let name = resolve_available_name(temp.path(), "shot").expect("should resolve");
        assert_eq!(name, "shot 1");
    }

    #[test]
    fn test_resolve_falls_back_to_timestamp() {
        let temp = TempDir::new().expect("test setup failed");
        touch(temp.path(), "shot.png");
        for i in 1..=MAX_SEQUENCE {
            touch(temp.path(), &format!("shot {i}.png"));
        }

        let before = chrono::Utc::now().timestamp();
        let name = resolve_available_name(temp.path(), "shot.png").expect("should resolve");
        let after = chrono::Utc::now().timestamp();

        let ts: i64 = name
            .strip_prefix("shot ")
            .and_then(|rest| rest.strip_suffix(".png"))
            .and_then(|ts| ts.parse().ok())
            .unwrap_or_else(|| panic!("unexpected fallback name {name}"));
        assert!(ts >= before && ts <= after);
        assert!(!temp.path().join(&name).exists());
    }

    #[test]
    fn test_resolve_never_returns_existing_name() {
        let temp = TempDir::new().expect("test setup failed");
        touch(temp.path(), "shot.png");
        for i in 1..=40 {
            if i % 7 != 0 {
                touch(temp.path(), &format!("shot {i}.png"));
            }
        }

        let name = resolve_available_name(temp.path(), "shot.png").expect("should resolve");
        assert_eq!(name, "shot 7.png");
        assert!(!temp.path().join(&name).exists());
    }

    #[test]
    fn test_rename_no_replace_moves_file() {
        let temp = TempDir::new().expect("test setup failed");
        touch(temp.path(), "from.png");

        rename_no_replace(&temp.path().join("from.png"), &temp.path().join("to.png"))
            .expect("rename should succeed");

        assert!(!temp.path().join("from.png").exists());
        assert_eq!(
            fs::read_to_string(temp.path().join("to.png")).expect("test read failed"),
            "from.png"
        );
    }

    #[test]
    fn test_rename_no_replace_keeps_existing_target() {
        let temp = TempDir::new().expect("test setup failed");
        touch(temp.path(), "from.png");
        touch(temp.path(), "to.png");

        let err = rename_no_replace(&temp.path().join("from.png"), &temp.path().join("to.png"))
            .expect_err("existing target must not be replaced");

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(
            fs::read_to_string(temp.path().join("from.png")).expect("test read failed"),
            "from.png"
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("to.png")).expect("test read failed"),
            "to.png"
        );
    }

    #[test]
    fn test_link_then_unlink_keeps_existing_target() {
        let temp = TempDir::new().expect("test setup failed");
        touch(temp.path(), "from.png");
        touch(temp.path(), "to.png");

        let err = link_then_unlink(&temp.path().join("from.png"), &temp.path().join("to.png"))
            .expect_err("existing target must not be replaced");

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert!(temp.path().join("from.png").exists());
    }

    #[test]
    fn test_split_extension_uses_last_dot() {
        assert_eq!(split_extension("a.tar.gz"), ("a.tar", Some("gz")));
        assert_eq!(split_extension("plain"), ("plain", None));
    }

    #[test]
    fn test_outcome_summaries() {
        let outcome = RenameOutcome {
            scanned: 4,
            renamed: 2,
            failures: vec!["a.png: boom".to_string(), "b.png: bang".to_string()],
        };
        assert_eq!(outcome.summary(), "Scanned 4 files, renamed 2 screenshots");
        assert_eq!(
            outcome.detailed_summary(),
            "Scanned 4 files, renamed 2 screenshots\n\nErrors:\na.png: boom\nb.png: bang"
        );

        let clean = RenameOutcome::default();
        assert!(!clean.has_failures());
        assert_eq!(clean.detailed_summary(), clean.summary());
    }
}
