use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use crate::system::traits::FileSystemInterface;

#[derive(Default)]
struct MockFsState {
    files: HashMap<PathBuf, (String, SystemTime)>,
    read_calls: Vec<PathBuf>,
    write_calls: Vec<(PathBuf, String)>,
    directory_creation_calls: Vec<PathBuf>,
    fail_read: bool,
    fail_write: bool,
    fail_create_dir: bool,
}

impl MockFsState {
    /// Files start at a fixed time and advance one second per write
    fn next_modified_time(&self, path: &Path) -> SystemTime {
        self.files
            .get(path)
            .map(|(_, modified)| *modified + Duration::from_secs(1))
            .unwrap_or(SystemTime::UNIX_EPOCH + Duration::from_secs(1000))
    }

    fn store(&mut self, path: &Path, content: String) {
        let modified = self.next_modified_time(path);
        self.files.insert(path.to_path_buf(), (content, modified));
    }
}

/// In-memory file system with recorded calls and switchable failures.
/// Clones share state.
#[derive(Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockFsState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockFsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create or overwrite a file, bumping its modified time
    pub fn add_file<P: AsRef<Path>>(&self, path: P, content: String) {
        self.state().store(path.as_ref(), content);
    }

    /// Bump a file's modified time without changing its content
    pub fn touch<P: AsRef<Path>>(&self, path: P) {
        let mut state = self.state();
        let modified = state.next_modified_time(path.as_ref());
        if let Some(file) = state.files.get_mut(path.as_ref()) {
            file.1 = modified;
        }
    }

    pub fn file_exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.state().files.contains_key(path.as_ref())
    }

    pub fn get_read_calls(&self) -> Vec<PathBuf> {
        self.state().read_calls.clone()
    }

    pub fn get_write_calls(&self) -> Vec<(PathBuf, String)> {
        self.state().write_calls.clone()
    }

    pub fn get_directory_creation_calls(&self) -> Vec<PathBuf> {
        self.state().directory_creation_calls.clone()
    }

    pub fn set_read_failure(&self, should_fail: bool) {
        self.state().fail_read = should_fail;
    }

    pub fn set_write_failure(&self, should_fail: bool) {
        self.state().fail_write = should_fail;
    }

    pub fn set_create_dir_failure(&self, should_fail: bool) {
        self.state().fail_create_dir = should_fail;
    }
}

impl FileSystemInterface for MockFileSystem {
    fn read_config_file(&self, path: &Path) -> Result<String> {
        let mut state = self.state();
        state.read_calls.push(path.to_path_buf());
        if state.fail_read {
            return Err(anyhow!("Mock read failure"));
        }
        state
            .files
            .get(path)
            .map(|(content, _)| content.clone())
            .ok_or_else(|| anyhow!("File not found: {}", path.display()))
    }

    fn write_config_file(&self, path: &Path, content: &str) -> Result<()> {
        let mut state = self.state();
        state
            .write_calls
            .push((path.to_path_buf(), content.to_string()));
        if state.fail_write {
            return Err(anyhow!("Mock write failure"));
        }
        state.store(path, content.to_string());
        Ok(())
    }

    fn config_file_exists(&self, path: &Path) -> bool {
        self.file_exists(path)
    }

    fn create_config_dir(&self, path: &Path) -> Result<()> {
        let mut state = self.state();
        state.directory_creation_calls.push(path.to_path_buf());
        if state.fail_create_dir {
            return Err(anyhow!("Mock create directory failure"));
        }
        Ok(())
    }

    fn get_config_modified_time(&self, path: &Path) -> Result<SystemTime> {
        self.state()
            .files
            .get(path)
            .map(|(_, modified)| *modified)
            .ok_or_else(|| anyhow!("File not found: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_advance_modified_time() {
        let fs = MockFileSystem::new();
        let path = Path::new("/test/config.toml");

        fs.write_config_file(path, "a = 1").unwrap();
        let first = fs.get_config_modified_time(path).unwrap();
        fs.add_file(path, "a = 2".to_string());
        let second = fs.get_config_modified_time(path).unwrap();

        assert!(second > first);
        assert_eq!(fs.read_config_file(path).unwrap(), "a = 2");
    }

    #[test]
    fn test_touching_missing_file_does_not_create_it() {
        let fs = MockFileSystem::new();
        fs.touch("/test/missing.toml");
        assert!(!fs.file_exists("/test/missing.toml"));
    }
}
