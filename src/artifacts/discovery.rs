use std::path::Path;
use std::time::{Duration, SystemTime};

use log::debug;
use walkdir::WalkDir;

use crate::artifacts::types::ArtifactFile;
use crate::error::{Result, TestLensError};

/// Recursively finds `.xml` files modified within the lookback window,
/// newest first.
pub fn discover_recent(directory: &Path, lookback_days: u32) -> Result<Vec<ArtifactFile>> {
    let cutoff = lookback_cutoff(SystemTime::now(), lookback_days);
    let mut artifacts: Vec<ArtifactFile> = scan(directory)?
        .into_iter()
        .filter(|artifact| artifact.modified >= cutoff)
        .collect();
    artifacts.sort_by(|a, b| b.modified.cmp(&a.modified));
    debug!(
        "{} artifacts within {lookback_days} days under {}",
        artifacts.len(),
        directory.display()
    );
    Ok(artifacts)
}

/// Recursively finds every `.xml` file, oldest first.
pub fn list_artifacts(directory: &Path) -> Result<Vec<ArtifactFile>> {
    let mut artifacts = scan(directory)?;
    artifacts.sort_by(|a, b| a.modified.cmp(&b.modified));
    Ok(artifacts)
}

fn scan(directory: &Path) -> Result<Vec<ArtifactFile>> {
    if !directory.is_dir() {
        return Err(TestLensError::DirectoryNotFound(directory.to_path_buf()));
    }

    let mut artifacts = Vec::new();
    for entry in WalkDir::new(directory) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() || !has_xml_extension(entry.path()) {
            continue;
        }
        let metadata = entry.metadata().map_err(std::io::Error::from)?;
        artifacts.push(ArtifactFile {
            path: entry.path().to_path_buf(),
            name: entry.file_name().to_string_lossy().into_owned(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            size_bytes: metadata.len(),
        });
    }
    Ok(artifacts)
}

fn lookback_cutoff(now: SystemTime, lookback_days: u32) -> SystemTime {
    let window = Duration::from_secs(u64::from(lookback_days) * 24 * 60 * 60);
    now.checked_sub(window).unwrap_or(SystemTime::UNIX_EPOCH)
}

fn has_xml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("xml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_with_mtime(path: &Path, content: &str, modified: SystemTime) {
        fs::write(path, content).unwrap();
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(modified).unwrap();
    }

    fn days_ago(days: u64) -> SystemTime {
        SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60)
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let result = discover_recent(&missing, 7);
        assert!(matches!(result, Err(TestLensError::DirectoryNotFound(_))));
    }

    #[test]
    fn test_finds_xml_recursively_and_case_insensitively() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.xml"), "<a/>").unwrap();
        fs::write(dir.path().join("nested/b.XML"), "<b/>").unwrap();
        fs::write(dir.path().join("c.txt"), "not xml").unwrap();

        let artifacts = list_artifacts(dir.path()).unwrap();
        assert_eq!(artifacts.len(), 2);
    }

    #[test]
    fn test_lookback_window_excludes_old_files() {
        let dir = tempdir().unwrap();
        write_with_mtime(&dir.path().join("old.xml"), "<a/>", days_ago(10));
        write_with_mtime(&dir.path().join("new.xml"), "<a/>", days_ago(1));

        let artifacts = discover_recent(dir.path(), 7).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].name, "new.xml");
    }

    #[test]
    fn test_zero_lookback_returns_empty() {
        let dir = tempdir().unwrap();
        write_with_mtime(&dir.path().join("a.xml"), "<a/>", days_ago(1));

        let artifacts = discover_recent(dir.path(), 0).unwrap();
        assert!(artifacts.is_empty());
    }

    #[test]
    fn test_recent_artifacts_sorted_newest_first() {
        let dir = tempdir().unwrap();
        write_with_mtime(&dir.path().join("oldest.xml"), "<a/>", days_ago(3));
        write_with_mtime(&dir.path().join("middle.xml"), "<a/>", days_ago(2));
        write_with_mtime(&dir.path().join("newest.xml"), "<a/>", days_ago(1));

        let names: Vec<String> = discover_recent(dir.path(), 7)
            .unwrap()
            .into_iter()
            .map(|artifact| artifact.name)
            .collect();
        assert_eq!(names, vec!["newest.xml", "middle.xml", "oldest.xml"]);
    }

    #[test]
    fn test_listing_sorted_oldest_first() {
        let dir = tempdir().unwrap();
        write_with_mtime(&dir.path().join("newest.xml"), "<a/>", days_ago(1));
        write_with_mtime(&dir.path().join("oldest.xml"), "<a/>", days_ago(3));

        let names: Vec<String> = list_artifacts(dir.path())
            .unwrap()
            .into_iter()
            .map(|artifact| artifact.name)
            .collect();
        assert_eq!(names, vec!["oldest.xml", "newest.xml"]);
    }

    #[test]
    fn test_artifact_fields_populated() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("run.xml"), "<run/>").unwrap();

        let artifacts = list_artifacts(dir.path()).unwrap();
        assert_eq!(artifacts[0].name, "run.xml");
        assert_eq!(artifacts[0].size_bytes, 6);
        assert!(artifacts[0].path.ends_with("run.xml"));
    }
}
