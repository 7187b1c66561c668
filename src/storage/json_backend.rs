use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::core::utils::{ensure_dir, PathResolver};
use crate::errors::BudgetError;

use super::{Result, StorageBackend};

const DOCUMENT_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// File-backed key-value store: each key lives in `<root>/<key>.json`.
/// Writes stage to a temporary sibling and rename over the target, so a
/// failed write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Opens (and creates) the store under `root`, or under the default data
    /// directory when `root` is `None`.
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = match root {
            Some(root) => root,
            None => PathResolver::data_dir_in(&PathResolver::base_dir()),
        };
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", canonical_key(key), DOCUMENT_EXTENSION))
    }
}

impl StorageBackend for JsonStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.document_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&self, key: &str, data: &str) -> Result<()> {
        let path = self.document_path(key);
        let tmp = tmp_path(&path);
        write_file(&tmp, data)?;
        fs::rename(&tmp, &path).map_err(|err| {
            BudgetError::StorageError(format!("failed to replace `{}`: {err}", path.display()))
        })
    }
}

fn canonical_key(key: &str) -> String {
    let sanitized: String = key
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "store".into()
    } else {
        sanitized
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonStorage::new(Some(temp.path().join("data"))).expect("json storage");
        (storage, temp)
    }

    #[test]
    fn write_then_read() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.write("budgets", r#"{"Transport":80.0}"#).unwrap();
        let raw = storage.read("budgets").unwrap();
        assert_eq!(raw.as_deref(), Some(r#"{"Transport":80.0}"#));
        assert!(storage.document_path("budgets").ends_with("budgets.json"));
    }

    #[test]
    fn missing_document_reads_as_none() {
        let (storage, _guard) = storage_with_temp_dir();
        assert!(storage.read("recurring").unwrap().is_none());
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let (storage, _guard) = storage_with_temp_dir();
        let path = storage.document_path("../Escape Me");
        assert_eq!(path.parent(), Some(storage.root()));
        assert!(path.ends_with("___escape_me.json"));
    }

    #[test]
    fn failed_write_preserves_previous_document() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.write("transactions", "[]").unwrap();
        let blocker = tmp_path(&storage.document_path("transactions"));
        fs::create_dir_all(&blocker).unwrap();

        assert!(storage.write("transactions", "[{}]").is_err());
        assert_eq!(storage.read("transactions").unwrap().as_deref(), Some("[]"));
    }
}
