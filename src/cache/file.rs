use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use super::{Cache, expiry};

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    expires_at: Option<DateTime<Utc>>,
    value: Value,
}

/// 文件缓存：每个键对应 `directory/namespace/` 下的一个 JSON 文件
pub struct FileCache {
    root: PathBuf,
    default_lifetime: i64,
}

impl FileCache {
    pub fn new(directory: impl AsRef<Path>, namespace: &str, default_lifetime: i64) -> Self {
        let mut root = directory.as_ref().to_path_buf();
        if !namespace.is_empty() {
            root.push(namespace);
        }

        Self {
            root,
            default_lifetime,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(key.as_bytes()));
        self.root.join(format!("{}.json", digest))
    }

    async fn read_entry(&self, key: &str) -> Option<StoredEntry> {
        let path = self.path_for(key);
        let raw = tokio::fs::read(&path).await.ok()?;

        let entry: StoredEntry = match serde_json::from_slice(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("缓存文件损坏 {}: {}", path.display(), e);
                return None;
            }
        };

        if entry.expires_at.is_some_and(|at| Utc::now() >= at) {
            debug!("缓存已过期: {}", path.display());
            if let Err(e) = tokio::fs::remove_file(&path).await {
                debug!("删除过期缓存失败 {}: {}", path.display(), e);
            }
            return None;
        }

        Some(entry)
    }
}

#[async_trait]
impl Cache for FileCache {
    async fn has(&self, key: &str) -> bool {
        self.read_entry(key).await.is_some()
    }

    async fn get(&self, key: &str) -> Option<Value> {
        self.read_entry(key).await.map(|entry| entry.value)
    }

    async fn set(&self, key: &str, value: Value, ttl_seconds: Option<i64>) -> bool {
        let path = self.path_for(key);

        let Some(expires_at) = expiry(ttl_seconds, self.default_lifetime) else {
            return match tokio::fs::remove_file(&path).await {
                Ok(()) => true,
                Err(e) => e.kind() == std::io::ErrorKind::NotFound,
            };
        };

        if let Err(e) = tokio::fs::create_dir_all(&self.root).await {
            warn!("无法创建缓存目录 {}: {}", self.root.display(), e);
            return false;
        }

        let entry = StoredEntry { expires_at, value };
        let Ok(raw) = serde_json::to_vec(&entry) else {
            return false;
        };

        // 先写临时文件再改名，读者不会看到半截内容
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = tokio::fs::write(&tmp, raw).await {
            warn!("写入缓存文件失败 {}: {}", tmp.display(), e);
            return false;
        }
        match tokio::fs::rename(&tmp, &path).await {
            Ok(()) => true,
            Err(e) => {
                warn!("写入缓存文件失败 {}: {}", path.display(), e);
                false
            }
        }
    }
}
