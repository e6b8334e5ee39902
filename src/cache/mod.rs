//! 令牌缓存
//!
//! [`Cache`] 是一个简单的键值存储接口，过期由后端自己负责。
//! 内置两种实现：进程内的 [`MemoryCache`] 与落盘的 [`FileCache`]，
//! 也可以通过 [`CacheRegistry`] 按配置名称构造。

mod factory;
mod file;

pub use factory::{CacheConfig, CacheRegistry};
pub use file::FileCache;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// 缓存后端
///
/// `ttl_seconds` 为 `None` 时使用后端的默认时长；小于等于 0 表示条目立即过期并被删除。
#[async_trait]
pub trait Cache: Send + Sync {
    async fn has(&self, key: &str) -> bool;

    async fn get(&self, key: &str) -> Option<Value>;

    /// 写入成功返回 `true`
    async fn set(&self, key: &str, value: Value, ttl_seconds: Option<i64>) -> bool;
}

/// 有效 TTL 对应的过期时间，外层 `None` 表示条目应当删除，内层 `None` 表示永不过期
pub(crate) fn expiry(
    ttl_seconds: Option<i64>,
    default_lifetime: i64,
) -> Option<Option<DateTime<Utc>>> {
    match ttl_seconds {
        Some(ttl) if ttl <= 0 => None,
        Some(ttl) => Some(Some(Utc::now() + Duration::seconds(ttl))),
        None if default_lifetime > 0 => {
            Some(Some(Utc::now() + Duration::seconds(default_lifetime)))
        }
        None => Some(None),
    }
}

struct Entry {
    value: Value,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.expires_at.is_none_or(|at| Utc::now() < at)
    }
}

/// 进程内缓存
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
    default_lifetime: i64,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 未指定 TTL 时使用 `default_lifetime`，为 0 表示永不过期
    pub fn with_default_lifetime(default_lifetime: i64) -> Self {
        Self {
            entries: RwLock::default(),
            default_lifetime,
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.values().filter(|e| e.is_live()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn has(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    async fn get(&self, key: &str) -> Option<Value> {
        {
            let entries = self.entries.read().ok()?;
            match entries.get(key) {
                Some(entry) if entry.is_live() => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // 过期条目在读取时删除
        if let Ok(mut entries) = self.entries.write() {
            if entries.get(key).is_some_and(|entry| !entry.is_live()) {
                entries.remove(key);
            }
        }
        None
    }

    async fn set(&self, key: &str, value: Value, ttl_seconds: Option<i64>) -> bool {
        let Ok(mut entries) = self.entries.write() else {
            return false;
        };

        match expiry(ttl_seconds, self.default_lifetime) {
            Some(expires_at) => {
                entries.insert(key.to_string(), Entry { value, expires_at });
            }
            None => {
                entries.remove(key);
            }
        }
        true
    }
}
