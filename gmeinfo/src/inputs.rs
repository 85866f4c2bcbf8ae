//! Input expansion and deduplication.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use gme_formats::GmeType;

/// Expand input patterns into a deduplicated, sorted list of music files.
///
/// Handles:
/// - Glob patterns (containing `*`, `?`, `[`)
/// - Plain file paths (taken as given, whatever the extension)
/// - Directories (recursive discovery by known extension)
pub fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            for entry in glob::glob(pattern)? {
                let path = entry?;
                if path.is_file() {
                    push_unique(path, &mut seen, &mut files);
                }
            }
        } else {
            let path = PathBuf::from(pattern);
            if path.is_dir() {
                for_each_music_file_in_dir(&path, &mut seen, &mut files);
            } else if path.is_file() {
                push_unique(path, &mut seen, &mut files);
            } else {
                anyhow::bail!("not a file or directory: {}", path.display());
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Check if a file path has a recognized music file extension.
pub fn has_music_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(GmeType::from_extension)
        .is_some()
}

fn push_unique(path: PathBuf, seen: &mut HashSet<PathBuf>, files: &mut Vec<PathBuf>) {
    if let Ok(canonical) = path.canonicalize() {
        if seen.insert(canonical) {
            files.push(path);
        }
    }
}

/// Recursively find music files in a directory.
fn for_each_music_file_in_dir(dir: &Path, seen: &mut HashSet<PathBuf>, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!("skipping {}: {e}", dir.display());
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            for_each_music_file_in_dir(&path, seen, files);
        } else if path.is_file() && has_music_extension(&path) {
            push_unique(path, seen, files);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn music_extensions() {
        assert!(has_music_extension(Path::new("smb3.nsf")));
        assert!(has_music_extension(Path::new("dir/Sonic.VGZ")));
        assert!(!has_music_extension(Path::new("cover.png")));
        assert!(!has_music_extension(Path::new("README")));
    }

    #[test]
    fn missing_path_is_an_error() {
        let err = expand_inputs(&["/definitely/not/here.nsf".to_string()]).unwrap_err();
        assert!(err.to_string().contains("not a file or directory"));
    }
}
