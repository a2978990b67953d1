//! Asset manager - the on-disk tree that holds every creature's assets
//!
//! All paths handed out by this module are descendants of the configured
//! storage root. Relative inputs are resolved lexically and anything that
//! would climb out of the root is rejected with [`AssetError::PathEscape`].
//! JSON artifacts and images are written with [`atomic_write`], so readers
//! see either the previous file or the complete new one.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::domain::value_objects::{ArtifactKind, AssetFolder};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Path '{0}' escapes the storage root")]
    PathEscape(String),
    #[error("'{0}' does not exist")]
    NotFound(String),
    #[error("Invalid file name '{0}'")]
    InvalidFileName(String),
    #[error("Artifact is not JSON serializable: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Blocking file task failed: {0}")]
    Join(String),
}

/// Resolve `relative` against `root` without touching the filesystem
///
/// `.` segments are dropped and `..` pops a previously pushed segment.
/// Absolute paths and any `..` that would leave `root` fail with `PathEscape`.
pub fn resolve_within(root: &Path, relative: &Path) -> Result<PathBuf, AssetError> {
    let escape = || AssetError::PathEscape(relative.display().to_string());
    let mut segments: Vec<&std::ffi::OsStr> = Vec::new();

    for component in relative.components() {
        match component {
            Component::Normal(part) => segments.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if segments.pop().is_none() {
                    return Err(escape());
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(escape()),
        }
    }

    let mut resolved = root.to_path_buf();
    resolved.extend(segments);
    Ok(resolved)
}

/// Make sure `relative` exists as a directory under `root`
///
/// With `create_if_missing` the root and any intermediate directories are
/// created; otherwise a missing directory is `NotFound`. Calling this twice
/// with the same arguments returns the same path and changes nothing.
pub async fn ensure_directory(
    root: &Path,
    relative: &Path,
    create_if_missing: bool,
) -> Result<PathBuf, AssetError> {
    let target = resolve_within(root, relative)?;

    if !tokio::fs::try_exists(root).await? {
        if create_if_missing {
            tokio::fs::create_dir_all(root).await?;
        } else {
            return Err(AssetError::NotFound("storage root".to_string()));
        }
    }

    if !tokio::fs::try_exists(&target).await? {
        if create_if_missing {
            tokio::fs::create_dir_all(&target).await?;
            debug!(path = %target.display(), "Created directory");
        } else {
            return Err(AssetError::NotFound(relative.display().to_string()));
        }
    } else if !tokio::fs::metadata(&target).await?.is_dir() {
        return Err(AssetError::NotFound(relative.display().to_string()));
    }

    // A symlink inside the tree could still point elsewhere
    let canonical_root = tokio::fs::canonicalize(root).await?;
    let canonical_target = tokio::fs::canonicalize(&target).await?;
    if !canonical_target.starts_with(&canonical_root) {
        return Err(AssetError::PathEscape(relative.display().to_string()));
    }

    Ok(target)
}

/// A file written to a temporary sibling and not yet moved into place
///
/// Dropping an uncommitted `StagedFile` removes the temporary file.
#[derive(Debug)]
pub struct StagedFile {
    temp_path: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedFile {
    /// Write `contents` next to `target` under a unique temporary name
    pub fn stage(target: &Path, contents: &[u8]) -> std::io::Result<Self> {
        let parent = target
            .parent()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent"))?;
        fs::create_dir_all(parent)?;

        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = parent.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        let mut file = fs::File::create(&temp_path)?;
        let staged = Self {
            temp_path,
            target: target.to_path_buf(),
            committed: false,
        };
        file.write_all(contents)?;
        file.sync_all()?;

        Ok(staged)
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Atomically replace the target with the staged contents
    pub fn commit(mut self) -> std::io::Result<PathBuf> {
        fs::rename(&self.temp_path, &self.target)?;
        self.committed = true;
        Ok(self.target.clone())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = fs::remove_file(&self.temp_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.temp_path.display(), error = %e, "Failed to remove staged file");
            }
        }
    }
}

/// Write `contents` to `target` via a temporary sibling and a rename
///
/// Runs on the blocking thread pool.
pub async fn atomic_write(target: PathBuf, contents: Vec<u8>) -> Result<PathBuf, AssetError> {
    tokio::task::spawn_blocking(move || StagedFile::stage(&target, &contents)?.commit())
        .await
        .map_err(|e| AssetError::Join(e.to_string()))?
        .map_err(AssetError::from)
}

/// File access scoped to the creature storage root
#[derive(Debug, Clone)]
pub struct AssetManager {
    root: PathBuf,
}

impl AssetManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_directory(
        &self,
        relative: &Path,
        create_if_missing: bool,
    ) -> Result<PathBuf, AssetError> {
        ensure_directory(&self.root, relative, create_if_missing).await
    }

    /// Validate a directory path read back from a record
    pub fn contain(&self, path: &Path) -> Result<PathBuf, AssetError> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| AssetError::PathEscape(path.display().to_string()))?;
        resolve_within(&self.root, relative)
    }

    /// Create `base/`, `animations/` and `data/` under a creature folder
    #[instrument(skip(self))]
    pub async fn ensure_required_folders(&self, folder: &str) -> Result<Vec<PathBuf>, AssetError> {
        let mut created = Vec::with_capacity(AssetFolder::REQUIRED.len());
        for sub in AssetFolder::REQUIRED {
            let relative = Path::new(folder).join(sub.as_str());
            created.push(self.ensure_directory(&relative, true).await?);
        }
        Ok(created)
    }

    /// Path of `filename` inside one of a creature's subfolders
    ///
    /// The file name must be a single plain path segment.
    pub fn file_path(
        &self,
        creature_dir: &Path,
        folder: AssetFolder,
        filename: &str,
    ) -> Result<PathBuf, AssetError> {
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(AssetError::InvalidFileName(filename.to_string())),
        }
        let dir = self.contain(creature_dir)?;
        Ok(dir.join(folder.as_str()).join(filename))
    }

    /// Serialize `value` as pretty JSON into the artifact's fixed location
    pub async fn write_artifact<T: Serialize + ?Sized>(
        &self,
        creature_dir: &Path,
        kind: &ArtifactKind,
        value: &T,
    ) -> Result<PathBuf, AssetError> {
        let mut json = serde_json::to_string_pretty(value)?;
        json.push('\n');
        let path = self.file_path(creature_dir, kind.folder(), &kind.file_name())?;
        atomic_write(path, json.into_bytes()).await
    }

    /// Store PNG bytes as `<name>.png` in the given subfolder
    pub async fn write_png(
        &self,
        creature_dir: &Path,
        folder: AssetFolder,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<PathBuf, AssetError> {
        let path = self.file_path(creature_dir, folder, &format!("{}.png", name))?;
        atomic_write(path, bytes).await
    }

    /// Store an uploaded file under its own name
    pub async fn write_upload(
        &self,
        creature_dir: &Path,
        folder: AssetFolder,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<PathBuf, AssetError> {
        let path = self.file_path(creature_dir, folder, filename)?;
        atomic_write(path, bytes).await
    }

    pub async fn read_text(
        &self,
        creature_dir: &Path,
        folder: AssetFolder,
        filename: &str,
    ) -> Result<String, AssetError> {
        let path = self.file_path(creature_dir, folder, filename)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AssetError::NotFound(format!("{}/{}", folder, filename)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// PNG file names in a subfolder, sorted
    pub async fn list_images(
        &self,
        creature_dir: &Path,
        folder: AssetFolder,
    ) -> Result<Vec<String>, AssetError> {
        let dir = self.contain(creature_dir)?.join(folder.as_str());
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AssetError::NotFound(folder.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut images = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_png = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("png"))
                .unwrap_or(false);
            if is_png && entry.file_type().await?.is_file() {
                if let Some(name) = path.file_name() {
                    images.push(name.to_string_lossy().into_owned());
                }
            }
        }
        images.sort();
        Ok(images)
    }

    /// Delete one file written into a creature's tree; missing is fine
    pub async fn remove_file(&self, path: &Path) -> Result<(), AssetError> {
        let path = self.contain(path)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a creature folder and everything below it; missing is fine
    pub async fn remove_tree(&self, creature_dir: &Path) -> Result<(), AssetError> {
        let dir = self.contain(creature_dir)?;
        if dir == self.root {
            return Err(AssetError::PathEscape(creature_dir.display().to_string()));
        }
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_within_accepts_descendants() {
        let root = Path::new("/srv/monsters");
        let cases = [
            ("pikachu_1", "/srv/monsters/pikachu_1"),
            ("pikachu_1/base", "/srv/monsters/pikachu_1/base"),
            ("./pikachu_1/./data", "/srv/monsters/pikachu_1/data"),
            ("pikachu_1/tmp/../animations", "/srv/monsters/pikachu_1/animations"),
        ];
        for (relative, expected) in cases {
            let resolved = resolve_within(root, Path::new(relative)).unwrap();
            assert_eq!(resolved, PathBuf::from(expected));
            assert!(resolved.starts_with(root));
        }
    }

    #[test]
    fn test_resolve_within_rejects_escapes() {
        let root = Path::new("/srv/monsters");
        for relative in ["..", "../etc", "pikachu_1/../../etc", "/etc/passwd", "a/../../b"] {
            let result = resolve_within(root, Path::new(relative));
            assert!(
                matches!(result, Err(AssetError::PathEscape(_))),
                "expected escape for {}",
                relative
            );
        }
    }

    #[tokio::test]
    async fn test_ensure_directory_creates_and_is_idempotent() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("monsters");

        let first = ensure_directory(&root, Path::new("pikachu_1/base"), true)
            .await
            .unwrap();
        let second = ensure_directory(&root, Path::new("pikachu_1/base"), true)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert!(first.is_dir());
        assert!(first.starts_with(&root));
        let entries: Vec<_> = fs::read_dir(root.join("pikachu_1")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_directory_without_create_is_not_found() {
        let tmp = tempdir().unwrap();
        let result = ensure_directory(tmp.path(), Path::new("missing_9"), false).await;
        assert!(matches!(result, Err(AssetError::NotFound(_))));
        assert!(!tmp.path().join("missing_9").exists());
    }

    #[tokio::test]
    async fn test_ensure_directory_rejects_escape_before_touching_disk() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("monsters");
        let result = ensure_directory(&root, Path::new("../outside"), true).await;
        assert!(matches!(result, Err(AssetError::PathEscape(_))));
        assert!(!tmp.path().join("outside").exists());
    }

    #[test]
    fn test_interrupted_write_leaves_previous_content() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("data").join("monster_data.json");
        StagedFile::stage(&target, b"{\"v\":1}").unwrap().commit().unwrap();

        // Abandoned between temp write and rename
        let staged = StagedFile::stage(&target, b"{\"v\":2,\"long\":\"payload\"}").unwrap();
        let temp_path = staged.temp_path().to_path_buf();
        assert!(temp_path.exists());
        drop(staged);

        assert_eq!(fs::read_to_string(&target).unwrap(), "{\"v\":1}");
        assert!(!temp_path.exists());
    }

    fn temp_files(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[tokio::test]
    async fn test_failed_commit_removes_temp_file() {
        let tmp = tempdir().unwrap();
        // A directory in the way makes the rename fail
        let target = tmp.path().join("animations").join("bolt.png");
        fs::create_dir_all(target.join("occupied")).unwrap();

        let result = atomic_write(target.clone(), vec![1, 2, 3]).await;
        assert!(matches!(result, Err(AssetError::Io(_))));
        assert!(target.is_dir());
        assert!(temp_files(target.parent().unwrap()).is_empty());
    }

    #[tokio::test]
    async fn test_atomic_write_replaces_whole_file() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("data").join("data_user.json");

        atomic_write(target.clone(), b"a much longer first version".to_vec())
            .await
            .unwrap();
        atomic_write(target.clone(), b"short".to_vec()).await.unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "short");
        assert!(temp_files(target.parent().unwrap()).is_empty());
    }

    #[tokio::test]
    async fn test_file_path_rejects_nested_names() {
        let tmp = tempdir().unwrap();
        let manager = AssetManager::new(tmp.path());
        let dir = manager
            .ensure_directory(Path::new("pikachu_1"), true)
            .await
            .unwrap();

        assert!(manager.file_path(&dir, AssetFolder::Data, "data_user.json").is_ok());
        for bad in ["../secret.json", "a/b.json", "..", "/etc/passwd", ""] {
            assert!(manager.file_path(&dir, AssetFolder::Data, bad).is_err(), "{}", bad);
        }
    }

    #[tokio::test]
    async fn test_contain_rejects_paths_outside_root() {
        let tmp = tempdir().unwrap();
        let manager = AssetManager::new(tmp.path().join("monsters"));
        let result = manager.contain(&tmp.path().join("elsewhere"));
        assert!(matches!(result, Err(AssetError::PathEscape(_))));
    }

    #[tokio::test]
    async fn test_list_images_only_returns_png_files() {
        let tmp = tempdir().unwrap();
        let manager = AssetManager::new(tmp.path());
        manager.ensure_required_folders("bolt_3").await.unwrap();
        let dir = tmp.path().join("bolt_3");

        manager
            .write_png(&dir, AssetFolder::Animations, "zap", vec![1, 2, 3])
            .await
            .unwrap();
        manager
            .write_png(&dir, AssetFolder::Animations, "dash", vec![4])
            .await
            .unwrap();
        manager
            .write_artifact(&dir, &ArtifactKind::Animation("zap".to_string()), &serde_json::json!({}))
            .await
            .unwrap();

        let images = manager.list_images(&dir, AssetFolder::Animations).await.unwrap();
        assert_eq!(images, vec!["dash.png".to_string(), "zap.png".to_string()]);
    }

    #[tokio::test]
    async fn test_remove_tree() {
        let tmp = tempdir().unwrap();
        let manager = AssetManager::new(tmp.path());
        let folders = manager.ensure_required_folders("gone_4").await.unwrap();
        assert_eq!(folders.len(), 3);

        let dir = tmp.path().join("gone_4");
        manager.remove_tree(&dir).await.unwrap();
        assert!(!dir.exists());
        // Already gone
        manager.remove_tree(&dir).await.unwrap();
        // Never the root itself
        assert!(manager.remove_tree(tmp.path()).await.is_err());
    }
}
