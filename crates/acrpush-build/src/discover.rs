use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Files under `root` named `Dockerfile` or ending in `.dockerfile`,
/// sorted by path.
///
/// Unreadable directories are skipped; symlinks are not followed.
pub fn find_dockerfiles(root: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable path");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_dockerfile(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    found.sort();
    found
}

fn is_dockerfile(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == "Dockerfile")
        || path.extension().is_some_and(|ext| ext == "dockerfile")
}
