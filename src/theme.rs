use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use directories::ProjectDirs;

use crate::domain::Theme;
use crate::error::SeedsError;

pub trait ThemeStore {
    /// The persisted theme, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Theme>, SeedsError>;
    fn save(&self, theme: Theme) -> Result<(), SeedsError>;
}

/// Persists the theme as a single `light`/`dark` literal in a file.
#[derive(Debug, Clone)]
pub struct FileThemeStore {
    path: Utf8PathBuf,
}

impl FileThemeStore {
    pub fn new() -> Result<Self, SeedsError> {
        let dir = ProjectDirs::from("host", "bolt", "vulkanseeds")
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.config_dir().to_path_buf()).ok())
            .ok_or_else(|| {
                SeedsError::Filesystem("unable to resolve config directory".to_string())
            })?;
        Ok(Self {
            path: dir.join("theme"),
        })
    }

    pub fn with_path(path: Utf8PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl ThemeStore for FileThemeStore {
    fn load(&self) -> Result<Option<Theme>, SeedsError> {
        if !self.path.as_std_path().exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(self.path.as_std_path())
            .map_err(|err| SeedsError::Filesystem(format!("read {}: {err}", self.path)))?;
        content.parse::<Theme>().map(Some)
    }

    fn save(&self, theme: Theme) -> Result<(), SeedsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent.as_std_path())
                .map_err(|err| SeedsError::Filesystem(err.to_string()))?;
        }
        let tmp_path = self.path.with_extension("tmp");
        fs::write(tmp_path.as_std_path(), theme.to_string())
            .map_err(|err| SeedsError::Filesystem(err.to_string()))?;
        fs::rename(tmp_path.as_std_path(), self.path.as_std_path())
            .map_err(|err| SeedsError::Filesystem(err.to_string()))?;
        tracing::debug!(%theme, path = %self.path, "theme saved");
        Ok(())
    }
}

/// Startup theme: the saved one, or light when missing or unreadable.
pub fn load_or_default(store: &dyn ThemeStore) -> Theme {
    match store.load() {
        Ok(Some(theme)) => theme,
        Ok(None) => Theme::default(),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring saved theme");
            Theme::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_none() {
        let temp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("theme")).unwrap();
        let store = FileThemeStore::with_path(path);
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(load_or_default(&store), Theme::Light);
    }

    #[test]
    fn save_then_load() {
        let temp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("nested").join("theme")).unwrap();
        let store = FileThemeStore::with_path(path);
        store.save(Theme::Dark).unwrap();
        assert_eq!(store.load().unwrap(), Some(Theme::Dark));
    }

    #[test]
    fn garbage_falls_back_to_light() {
        let temp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("theme")).unwrap();
        fs::write(path.as_std_path(), "purple").unwrap();
        let store = FileThemeStore::with_path(path);
        assert!(store.load().is_err());
        assert_eq!(load_or_default(&store), Theme::Light);
    }
}
