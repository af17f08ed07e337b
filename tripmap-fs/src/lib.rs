//! Capability-based file helpers for trip drafts and replay scripts.
//!
//! Every helper resolves its target to an ambient directory handle plus a
//! relative name and performs IO through `cap-std`, so paths are never
//! re-resolved after the directory has been opened.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io;
use std::path::Component;

/// Read a UTF-8 text file.
pub fn read_utf8_file(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.read_to_string(name.as_str())
}

/// Write `contents` to `path`, creating missing parent directories.
///
/// The data is written to a sibling temporary file first and renamed into
/// place, so readers never observe a partially written file.
pub fn write_utf8_file(path: &Utf8Path, contents: &str) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    let staging = format!(".{name}.partial");
    dir.write(staging.as_str(), contents)?;
    dir.rename(staging.as_str(), &dir, name.as_str())
        .inspect_err(|_| {
            if let Err(err) = dir.remove_file(staging.as_str()) {
                log::warn!("failed to remove staging file {staging}: {err}");
            }
        })
}

/// Open the parent directory of `path` and return it with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_string();
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Ensure the parent directory for `path` exists.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base_dir, relative) = base_dir_and_relative(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

/// Return whether a path exists and is a regular file.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    match dir.metadata(name.as_str()) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Split a directory path into an ambient anchor directory and the relative
/// remainder beneath it.
///
/// Absolute paths anchor at the root (or the drive prefix on Windows);
/// relative paths anchor at the current directory.
pub fn base_dir_and_relative(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_parent = parent.as_std_path();

    let (base, relative) = match std_parent.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_parent.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from parent path"))?
                .to_path_buf();
            (base, relative)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_parent
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), std_parent.to_path_buf()),
    };

    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative = Utf8PathBuf::from_path_buf(relative)
        .map_err(|_| io::Error::other("non-UTF-8 parent path"))?;

    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn workspace() -> (TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        (dir, root)
    }

    #[rstest]
    fn write_creates_parents_and_round_trips(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let target = root.join("trips/luxor/draft.json");

        write_utf8_file(&target, "{\"locations\":[]}").expect("write");

        assert!(file_is_file(&target).expect("stat"));
        assert_eq!(read_utf8_file(&target).expect("read"), "{\"locations\":[]}");
        assert!(!file_is_file(&root.join("trips/luxor/.draft.json.partial")).expect("stat"));
    }

    #[rstest]
    fn write_replaces_existing_content(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let target = root.join("draft.json");

        write_utf8_file(&target, "first").expect("write");
        write_utf8_file(&target, "second").expect("write");

        assert_eq!(read_utf8_file(&target).expect("read"), "second");
    }

    #[rstest]
    fn failed_rename_leaves_no_staging_file(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let target = root.join("draft.json");
        ensure_parent_dir(&target.join("occupied")).expect("mkdir");
        write_utf8_file(&target.join("occupied"), "keep").expect("write");

        assert!(write_utf8_file(&target, "{}").is_err());

        assert!(!file_is_file(&root.join(".draft.json.partial")).expect("stat"));
        assert_eq!(
            read_utf8_file(&target.join("occupied")).expect("read"),
            "keep"
        );
    }

    #[rstest]
    fn missing_file_is_not_a_file(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        assert!(!file_is_file(&root.join("absent.json")).expect("stat"));
    }

    #[rstest]
    fn directories_are_not_files(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        ensure_parent_dir(&root.join("nested/child/file.json")).expect("mkdir");
        assert!(!file_is_file(&root.join("nested/child")).expect("stat"));
    }

    #[rstest]
    fn path_without_file_name_is_rejected() {
        assert!(open_dir_and_file(Utf8Path::new("/")).is_err());
    }
}
