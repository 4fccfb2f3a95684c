//! Local filesystem implementation of `KeyValueStore`.
//! Each key is one JSON document at `<root>/<key>.json`.

use anyhow::{bail, Context};
use async_trait::async_trait;
use domains::KeyValueStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub struct JsonFileKv {
    /// Data directory (e.g., "./data")
    root: PathBuf,
}

impl JsonFileKv {
    /// Creates the data directory if it does not exist yet.
    pub async fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("failed to create data dir {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Keys become file names, so only `[A-Za-z0-9_-]` is accepted.
    fn path_for(&self, key: &str) -> anyhow::Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            bail!("invalid storage key '{key}'");
        }
        Ok(self.root.join(format!("{key}.json")))
    }

    /// Writes to a sibling temp file; the caller renames it into place.
    async fn stage(&self, key: &str, value: &str) -> anyhow::Result<(PathBuf, PathBuf)> {
        let target = self.path_for(key)?;
        let temp = target.with_extension("json.tmp");
        fs::write(&temp, value)
            .await
            .with_context(|| format!("failed to write {}", temp.display()))?;
        Ok((temp, target))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileKv {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    async fn put(&self, key: &str, value: String) -> anyhow::Result<()> {
        let (temp, target) = self.stage(key, &value).await?;
        fs::rename(&temp, &target).await?;
        debug!(key, bytes = value.len(), "document written");
        Ok(())
    }

    /// Stages every document before renaming any, so a failed write leaves
    /// all previous documents in place.
    async fn put_many(&self, entries: Vec<(String, String)>) -> anyhow::Result<()> {
        let mut staged = Vec::with_capacity(entries.len());
        for (key, value) in &entries {
            match self.stage(key, value).await {
                Ok(paths) => staged.push(paths),
                Err(e) => {
                    for (temp, _) in &staged {
                        let _ = fs::remove_file(temp).await;
                    }
                    return Err(e);
                }
            }
        }
        for (temp, target) in staged {
            fs::rename(&temp, &target)
                .await
                .with_context(|| format!("failed to replace {}", target.display()))?;
        }
        debug!(documents = entries.len(), "batch written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                Err(e).with_context(|| format!("failed to delete {}", path.display()))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn documents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let kv = JsonFileKv::open(dir.path()).await.unwrap();
        kv.put("users", r#"[{"id":1}]"#.into()).await.unwrap();
        assert!(dir.path().join("users.json").exists());

        let reopened = JsonFileKv::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.get("users").await.unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );
        assert_eq!(reopened.get("boards").await.unwrap(), None);
    }

    #[tokio::test]
    async fn batch_writes_every_key_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let kv = JsonFileKv::open(dir.path().join("nested")).await.unwrap();
        kv.put_many(vec![
            ("users".into(), "[]".into()),
            ("transactions".into(), "[]".into()),
        ])
        .await
        .unwrap();

        let mut names: Vec<String> = std::fs::read_dir(kv.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["transactions.json", "users.json"]);
    }

    #[tokio::test]
    async fn invalid_key_fails_the_whole_batch() {
        let dir = tempfile::tempdir().unwrap();
        let kv = JsonFileKv::open(dir.path()).await.unwrap();
        let result = kv
            .put_many(vec![
                ("users".into(), "[]".into()),
                ("../escape".into(), "[]".into()),
            ])
            .await;
        assert!(result.is_err());
        assert_eq!(kv.get("users").await.unwrap(), None);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let kv = JsonFileKv::open(dir.path()).await.unwrap();
        kv.put("currentUser", "null".into()).await.unwrap();
        kv.delete("currentUser").await.unwrap();
        kv.delete("currentUser").await.unwrap();
        assert_eq!(kv.get("currentUser").await.unwrap(), None);
    }
}
