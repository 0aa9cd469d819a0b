//! Discovery of video files under a category root.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// A video file found under a category root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path as seen through the source mount.
    pub path: PathBuf,
    /// File name including extension.
    pub file_name: String,
    /// Extension including the leading dot, in its original case.
    pub extension: String,
    /// Name used for guessing: the top-level folder under the category root
    /// when nested, otherwise the file stem.
    pub raw_name: String,
    /// Whether the file sits inside a folder below the category root.
    pub nested: bool,
    pub size_bytes: u64,
}

/// Normalize configured extensions to lowercase without a leading dot.
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Recursively find video files under `root`.
///
/// Results are ordered by path so repeated scans see candidates in the same
/// order. Symlinked files are followed. Unreadable entries and paths that are
/// not valid UTF-8 (they cannot be keyed in state) are logged and skipped. A
/// missing root yields an empty list.
pub fn discover(root: &Path, extensions: &[String]) -> Vec<SourceFile> {
    if !root.is_dir() {
        debug!("Category root {} does not exist, nothing to scan", root.display());
        return Vec::new();
    }

    let extensions = normalize_extensions(extensions);
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.to_str().is_none() {
            warn!("Skipping non UTF-8 path {}", path.display());
            continue;
        }

        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !extensions.contains(&ext.to_lowercase()) {
            continue;
        }

        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let mut components = relative.components();
        let first = components
            .next()
            .map(|c| c.as_os_str().to_string_lossy().into_owned());
        let nested = components.next().is_some();

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let raw_name = match (nested, first) {
            (true, Some(folder)) => folder,
            _ => stem,
        };

        let size_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        files.push(SourceFile {
            path: path.to_path_buf(),
            file_name: entry.file_name().to_string_lossy().into_owned(),
            extension: format!(".{}", ext),
            raw_name,
            nested,
            size_bytes,
        });
    }

    debug!("Discovered {} video files under {}", files.len(), root.display());
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"video").unwrap();
    }

    fn exts() -> Vec<String> {
        vec!["mkv".to_string(), ".MP4".to_string()]
    }

    #[test]
    fn test_discover_filters_extensions() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Movie.2020.1080p.mkv");
        touch(temp.path(), "Other.2021.mp4");
        touch(temp.path(), "readme.txt");
        touch(temp.path(), "sample.nfo");

        let files = discover(temp.path(), &exts());
        let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["Movie.2020.1080p.mkv", "Other.2021.mp4"]);
        assert_eq!(files[1].extension, ".mp4");
    }

    #[test]
    fn test_discover_uppercase_extension() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "LOUD.MKV");

        let files = discover(temp.path(), &exts());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].extension, ".MKV");
        assert_eq!(files[0].raw_name, "LOUD");
    }

    #[test]
    fn test_discover_raw_name_is_top_level_folder() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Movie.2020.1080p.BluRay/Subs/Movie.mkv");
        touch(temp.path(), "Loose.Film.2019.mkv");

        let files = discover(temp.path(), &exts());
        assert_eq!(files.len(), 2);

        let loose = files.iter().find(|f| f.file_name == "Loose.Film.2019.mkv").unwrap();
        assert!(!loose.nested);
        assert_eq!(loose.raw_name, "Loose.Film.2019");

        let nested = files.iter().find(|f| f.file_name == "Movie.mkv").unwrap();
        assert!(nested.nested);
        assert_eq!(nested.raw_name, "Movie.2020.1080p.BluRay");
        assert_eq!(nested.size_bytes, 5);
    }

    #[test]
    fn test_discover_missing_root() {
        let temp = TempDir::new().unwrap();
        let files = discover(&temp.path().join("absent"), &exts());
        assert!(files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_follows_symlinked_files() {
        let temp = TempDir::new().unwrap();
        let store = TempDir::new().unwrap();
        touch(store.path(), "real.mkv");
        fs::create_dir_all(temp.path().join("Heat.1995.1080p")).unwrap();
        std::os::unix::fs::symlink(
            store.path().join("real.mkv"),
            temp.path().join("Heat.1995.1080p/heat.mkv"),
        )
        .unwrap();
        std::os::unix::fs::symlink(
            store.path().join("missing.mkv"),
            temp.path().join("Broken.mkv"),
        )
        .unwrap();

        let files = discover(temp.path(), &exts());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].raw_name, "Heat.1995.1080p");
        assert_eq!(files[0].size_bytes, 5);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_discover_skips_non_utf8_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Good.2020.mkv");
        let bad = temp.path().join(OsStr::from_bytes(b"Bad.\xff.2020.mkv"));
        fs::write(bad, b"video").unwrap();

        let files = discover(temp.path(), &exts());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "Good.2020.mkv");
    }

    #[test]
    fn test_normalize_extensions() {
        let normalized = normalize_extensions(&[" .MKV".to_string(), "".to_string()]);
        assert_eq!(normalized, vec!["mkv".to_string()]);
    }
}
