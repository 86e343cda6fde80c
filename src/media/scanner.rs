use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use crate::media::mime::{classify, MediaKind};
use crate::vfs::{VfsTree, ROOT_ID};

/// Counts collected while populating the tree, for the summary line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub containers: usize,
    pub video: usize,
    pub audio: usize,
    pub image: usize,
    pub skipped: usize,
}

impl ScanStats {
    pub fn resources(&self) -> usize {
        self.video + self.audio + self.image
    }
}

/// Populate `tree` from the given directories. Each path becomes a container
/// under the root; sub-directories become nested containers and media files
/// become resources titled by their file stem. Entries are visited in file
/// name order. Missing or unreadable paths log a warning and are skipped.
pub fn scan(paths: &[PathBuf], tree: &mut VfsTree, follow_links: bool) -> ScanStats {
    let start = Instant::now();
    let mut stats = ScanStats::default();

    for root in paths {
        if !root.exists() {
            tracing::warn!("Scan path does not exist, skipping: {}", root.display());
            continue;
        }
        scan_root(root, tree, follow_links, &mut stats);
    }

    tracing::info!(
        "Scanned {} files ({} video, {} audio, {} image) in {} folders in {:.1}s",
        stats.resources(),
        stats.video,
        stats.audio,
        stats.image,
        stats.containers,
        start.elapsed().as_secs_f64()
    );
    stats
}

fn scan_root(root: &Path, tree: &mut VfsTree, follow_links: bool, stats: &mut ScanStats) {
    let mut folders: HashMap<PathBuf, u32> = HashMap::new();
    let walker = WalkDir::new(root)
        .follow_links(follow_links)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Cannot access entry: {}", e);
                stats.skipped += 1;
                continue;
            }
        };

        let parent = match entry.path().parent().and_then(|p| folders.get(p)) {
            Some(&id) => id,
            None if entry.depth() == 0 => ROOT_ID,
            None => {
                tracing::warn!("Orphaned entry, skipping: {}", entry.path().display());
                stats.skipped += 1;
                continue;
            }
        };

        if entry.file_type().is_dir() {
            let title = display_name(entry.path(), false);
            match tree.add_container(parent, &title) {
                Ok(id) => {
                    folders.insert(entry.path().to_path_buf(), id);
                    stats.containers += 1;
                }
                Err(e) => tracing::warn!("Cannot add folder {}: {}", entry.path().display(), e),
            }
        } else if entry.file_type().is_file() {
            add_file(entry.path(), parent, tree, stats);
        }
    }
}

fn add_file(path: &Path, parent: u32, tree: &mut VfsTree, stats: &mut ScanStats) {
    // Non-media files are silently ignored.
    let Some((kind, _format)) = classify(path) else {
        return;
    };

    let title = display_name(path, true);
    match tree.add_resource(parent, &title, path) {
        Ok(id) => {
            match kind {
                MediaKind::Video => stats.video += 1,
                MediaKind::Audio => stats.audio += 1,
                MediaKind::Image => stats.image += 1,
            }
            tracing::debug!("indexed {} -> {}", id, path.display());
        }
        Err(e) => {
            tracing::warn!("Cannot add {}: {}", path.display(), e);
            stats.skipped += 1;
        }
    }
}

/// Titles drop the extension for files; folders keep their full name.
fn display_name(path: &Path, strip_extension: bool) -> String {
    let name = if strip_extension {
        path.file_stem()
    } else {
        path.file_name()
    };
    name.map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
