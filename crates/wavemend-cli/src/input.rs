//! Discovery of audio files on disk.
//!
//! Files are recognized by extension (`.wav`/`.wave`, `.aif`/`.aiff`, any
//! case). Directory scans are recursive and return entries in sorted path
//! order so batch output is deterministic.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use wavemend_core::ContainerKind;

/// One file found during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A file whose extension names a supported container.
    Audio(AudioFile),
    /// Any other file.
    Skipped(PathBuf),
}

impl Entry {
    pub fn path(&self) -> &Path {
        match self {
            Entry::Audio(file) => &file.path,
            Entry::Skipped(path) => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    pub path: PathBuf,
    /// Container kind implied by the extension.
    pub kind: ContainerKind,
}

impl AudioFile {
    /// Classifies a path by extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        ContainerKind::from_path(path).map(|kind| Self {
            path: path.to_path_buf(),
            kind,
        })
    }
}

/// Recursively lists the files under `dir`, sorted by path.
pub fn scan_directory(dir: &Path) -> Vec<Entry> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();

    // Sort for deterministic output
    paths.sort();

    paths
        .into_iter()
        .map(|path| match AudioFile::from_path(&path) {
            Some(file) => Entry::Audio(file),
            None => Entry::Skipped(path),
        })
        .collect()
}

/// Path of `path` relative to `root`, or its file name when it is not below
/// `root`.
pub fn relative_to(path: &Path, root: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => path.file_name().map(PathBuf::from).unwrap_or_default(),
    }
}

/// Where a file found below `root` is restored to inside `destination`.
///
/// The relative path is kept; the extension changes when the file is
/// rewritten as another container, so the output is inspected as what it is.
pub fn destination_for(
    file: &AudioFile,
    root: &Path,
    destination: &Path,
    target: ContainerKind,
) -> PathBuf {
    let mut path = destination.join(relative_to(&file.path, root));
    if target != file.kind {
        path.set_extension(target.extensions()[0]);
    }
    path
}

/// File name for display, falling back to the whole path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
