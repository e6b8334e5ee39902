//! 客户端配置
//!
//! 可以直接构造，也可以从 JSON 映射、JSON 文件或环境变量加载：
//!
//! ```json
//! {
//!     "username": "user",
//!     "password": "secret",
//!     "cache": { "class": "file", "directory": "/tmp/bazhuayu", "namespace": "prod" }
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{Credentials, DATA_API_BASE_URI};
use crate::cache::{Cache, CacheConfig, CacheRegistry, MemoryCache};
use crate::client::CredentialsProvider;
use crate::error::{Error, Result};

pub const ENV_USERNAME: &str = "BAZHUAYU_USERNAME";
pub const ENV_PASSWORD: &str = "BAZHUAYU_PASSWORD";
pub const ENV_CACHE_DIR: &str = "BAZHUAYU_CACHE_DIR";
pub const ENV_BASE_URI: &str = "BAZHUAYU_BASE_URI";

/// 缓存来源：现成的实例，或交给 [`CacheRegistry`] 构造的配置
#[derive(Clone)]
pub enum CacheSetting {
    Instance(Arc<dyn Cache>),
    Config(CacheConfig),
}

impl fmt::Debug for CacheSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheSetting::Instance(_) => f.write_str("CacheSetting::Instance(..)"),
            CacheSetting::Config(config) => {
                f.debug_tuple("CacheSetting::Config").field(config).finish()
            }
        }
    }
}

impl Default for CacheSetting {
    fn default() -> Self {
        CacheSetting::Instance(Arc::new(MemoryCache::new()))
    }
}

impl CacheSetting {
    pub fn resolve(&self, registry: &CacheRegistry) -> Result<Arc<dyn Cache>> {
        match self {
            CacheSetting::Instance(cache) => Ok(cache.clone()),
            CacheSetting::Config(config) => registry.build(config),
        }
    }
}

#[derive(Clone)]
pub struct ClientConfig {
    pub username: String,
    pub password: String,
    pub cache: CacheSetting,
    pub base_uri: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("cache", &self.cache)
            .field("base_uri", &self.base_uri)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

#[derive(Deserialize)]
struct RawConfig {
    username: String,
    password: String,
    #[serde(default)]
    cache: Option<CacheConfig>,
    #[serde(default)]
    base_uri: Option<String>,
    #[serde(default)]
    timeout: Option<u64>,
    #[serde(default)]
    connect_timeout: Option<u64>,
}

impl ClientConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            cache: CacheSetting::default(),
            base_uri: DATA_API_BASE_URI.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = CacheSetting::Instance(cache);
        self
    }

    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache = CacheSetting::Config(config);
        self
    }

    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = base_uri.into();
        self
    }

    pub fn with_timeouts(mut self, timeout: Duration, connect_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = connect_timeout;
        self
    }

    /// 从 JSON 映射加载，超时单位为秒
    pub fn from_value(value: Value) -> Result<Self> {
        let raw: RawConfig = serde_json::from_value(value)
            .map_err(|e| Error::Configuration(format!("invalid client config: {}", e)))?;

        let mut config = Self::new(raw.username, raw.password);
        if let Some(cache) = raw.cache {
            config = config.with_cache_config(cache);
        }
        if let Some(base_uri) = raw.base_uri {
            config.base_uri = base_uri;
        }
        if let Some(timeout) = raw.timeout {
            config.timeout = Duration::from_secs(timeout);
        }
        if let Some(connect_timeout) = raw.connect_timeout {
            config.connect_timeout = Duration::from_secs(connect_timeout);
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let value: Value = serde_json::from_str(&raw)?;
        Self::from_value(value)
    }

    /// 从环境变量加载；设置了 `BAZHUAYU_CACHE_DIR` 时使用文件缓存
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let username = lookup(ENV_USERNAME)
            .ok_or_else(|| Error::Configuration(format!("{} is not set", ENV_USERNAME)))?;
        let password = lookup(ENV_PASSWORD)
            .ok_or_else(|| Error::Configuration(format!("{} is not set", ENV_PASSWORD)))?;

        let mut config = Self::new(username, password);
        if let Some(dir) = lookup(ENV_CACHE_DIR) {
            config = config.with_cache_config(CacheConfig::new("file").param("directory", dir));
        }
        if let Some(base_uri) = lookup(ENV_BASE_URI) {
            config.base_uri = base_uri;
        }
        Ok(config)
    }
}

impl CredentialsProvider for ClientConfig {
    fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_from_value_with_cache_mapping() {
        let config = ClientConfig::from_value(json!({
            "username": "test",
            "password": "pwd",
            "cache": {
                "class": "file",
                "namespace": "Test",
                "default_lifetime": 10,
                "directory": "/tmp/runtime"
            },
            "timeout": 12
        }))
        .unwrap();

        assert_eq!(config.credentials(), Credentials::new("test", "pwd"));
        assert_eq!(config.base_uri, DATA_API_BASE_URI);
        assert_eq!(config.timeout, Duration::from_secs(12));
        match config.cache {
            CacheSetting::Config(cache) => assert_eq!(cache.class, "file"),
            other => panic!("unexpected cache setting {:?}", other),
        }
    }

    #[test]
    fn test_default_cache_is_memory_instance() {
        let config = ClientConfig::from_value(json!({"username": "u", "password": "p"})).unwrap();
        assert!(matches!(config.cache, CacheSetting::Instance(_)));
        assert!(config.cache.resolve(&CacheRegistry::new()).is_ok());
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = ClientConfig::from_value(json!({"username": "u"})).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_USERNAME, "env-user"),
            (ENV_PASSWORD, "env-pass"),
            (ENV_CACHE_DIR, "/tmp/cache"),
        ]
        .into_iter()
        .collect();

        let config =
            ClientConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.username, "env-user");
        assert!(matches!(config.cache, CacheSetting::Config(ref c) if c.class == "file"));

        let err = ClientConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains(ENV_USERNAME)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bazhuayu.json");
        std::fs::write(
            &path,
            r#"{"username": "u", "password": "p", "base_uri": "http://localhost:1/"}"#,
        )
        .unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.base_uri, "http://localhost:1/");
    }
}
