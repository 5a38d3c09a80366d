//! Implements the `KeyValueStore` trait with one JSON file per key in a directory.

use crate::error::{ErrorType, IntoResult, Res, Result};
use crate::store::KeyValueStore;
use crate::utils;
use anyhow::bail;
use std::path::{Path, PathBuf};
use tracing::trace;

const EXTENSION: &str = "json";
const TMP_EXTENSION: &str = "json.tmp";

/// Stores the payload for key `k` in `<dir>/k.json`.
///
/// A write goes to `<dir>/k.json.tmp` first and is then renamed over `k.json`, so a crash mid-write
/// leaves the previous payload intact.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates `dir` if it does not exist and returns a store rooted there.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        utils::make_dir(&dir).await.pub_result(ErrorType::Storage)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str, extension: &str) -> Res<PathBuf> {
        check_key(key)?;
        Ok(self.dir.join(format!("{key}.{extension}")))
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Res<Option<String>> {
        let path = self.path(key, EXTENSION)?;
        trace!("get {key} from {}", path.display());
        utils::read_optional(&path).await
    }

    async fn set(&mut self, key: &str, value: &str) -> Res<()> {
        let path = self.path(key, EXTENSION)?;
        let tmp = self.path(key, TMP_EXTENSION)?;
        trace!("set {key} ({} bytes) at {}", value.len(), path.display());
        utils::write(&tmp, value).await?;
        utils::rename(&tmp, &path).await
    }
}

/// Keys become file names, so only a conservative set of characters is allowed.
fn check_key(key: &str) -> Res<()> {
    let ok = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if !ok {
        bail!("Invalid storage key '{key}'");
    }
    Ok(())
}
