//! Output directory synchronization
//!
//! Writes rendered files into the output directory, skipping files whose
//! bytes are unchanged, then removes every file the run did not produce.

use crate::emit::{RenderedFile, GENERATED_HEADER};
use crate::error::GenerateError;
use schemagen_core::Target;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the metadata file recording the target
pub const METADATA_FILE: &str = "config.json";

/// What a sync changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Files created or overwritten
    pub written: usize,

    /// Files already holding the rendered bytes
    pub unchanged: usize,

    /// Vestigial files deleted
    pub removed: usize,
}

/// Contents of the metadata file for a target
pub fn metadata_contents(target: Target) -> String {
    format!(
        "{}\n{}\n",
        GENERATED_HEADER,
        serde_json::json!({ "target": target.as_str() })
    )
}

/// One sync of an output directory
pub struct DirectorySync {
    root: PathBuf,
    initial: BTreeSet<PathBuf>,
    written: BTreeSet<PathBuf>,
    stats: SyncStats,
}

impl DirectorySync {
    /// Snapshot the files currently under `root`
    ///
    /// A missing directory yields an empty snapshot.
    pub fn snapshot(root: &Path) -> Result<Self, GenerateError> {
        let mut initial = BTreeSet::new();

        if root.exists() {
            for entry in WalkDir::new(root) {
                let entry = entry.map_err(|e| GenerateError::io(root, e))?;
                if entry.file_type().is_file() {
                    initial.insert(entry.into_path());
                }
            }
        }

        tracing::debug!(root = %root.display(), files = initial.len(), "Snapshot output directory");
        Ok(Self {
            root: root.to_path_buf(),
            initial,
            written: BTreeSet::new(),
            stats: SyncStats::default(),
        })
    }

    /// Files present when the snapshot was taken
    pub fn initial_files(&self) -> &BTreeSet<PathBuf> {
        &self.initial
    }

    /// Write a file relative to the root unless it already holds `contents`
    pub fn write(&mut self, relative: &Path, contents: &str) -> Result<(), GenerateError> {
        let path = self.root.join(relative);
        self.written.insert(path.clone());

        if std::fs::read(&path).ok().as_deref() == Some(contents.as_bytes()) {
            tracing::debug!(file = %relative.display(), "Unchanged");
            self.stats.unchanged += 1;
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GenerateError::io(parent, e))?;
        }
        std::fs::write(&path, contents).map_err(|e| GenerateError::io(&path, e))?;

        tracing::debug!(file = %relative.display(), "Wrote");
        self.stats.written += 1;
        Ok(())
    }

    pub fn write_all(&mut self, files: &[RenderedFile]) -> Result<(), GenerateError> {
        for file in files {
            self.write(&file.path, &file.contents)?;
        }
        Ok(())
    }

    /// Delete files not written by this sync and prune directories they leave
    /// empty
    pub fn finish(mut self) -> Result<SyncStats, GenerateError> {
        let vestigial: Vec<PathBuf> = self.initial.difference(&self.written).cloned().collect();

        for path in &vestigial {
            tracing::warn!(file = %path.display(), "Removing vestigial file");
            std::fs::remove_file(path).map_err(|e| GenerateError::io(path, e))?;
            self.stats.removed += 1;
            self.prune_parents(path)?;
        }

        Ok(self.stats)
    }

    fn prune_parents(&self, path: &Path) -> Result<(), GenerateError> {
        let mut dir = path.parent();

        while let Some(current) = dir {
            if current == self.root || !current.starts_with(&self.root) {
                break;
            }
            let is_empty = std::fs::read_dir(current)
                .map_err(|e| GenerateError::io(current, e))?
                .next()
                .is_none();
            if !is_empty {
                break;
            }
            std::fs::remove_dir(current).map_err(|e| GenerateError::io(current, e))?;
            dir = current.parent();
        }

        Ok(())
    }
}

/// Write generated and support files plus the metadata file, then remove
/// everything else under `root`
pub fn sync_output(
    root: &Path,
    files: &[RenderedFile],
    support: &[RenderedFile],
    target: Target,
) -> Result<SyncStats, GenerateError> {
    let mut sync = DirectorySync::snapshot(root)?;
    sync.write_all(files)?;
    sync.write_all(support)?;
    sync.write(Path::new(METADATA_FILE), &metadata_contents(target))?;

    let stats = sync.finish()?;
    tracing::info!(
        written = stats.written,
        unchanged = stats.unchanged,
        removed = stats.removed,
        "Synchronized output directory"
    );
    Ok(stats)
}
