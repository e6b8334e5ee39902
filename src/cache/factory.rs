use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::{Cache, FileCache, MemoryCache};
use crate::error::{Error, Result};

/// 按名称描述的缓存配置，例如
/// `{"class": "file", "namespace": "Test", "directory": "/tmp/bazhuayu"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub class: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl CacheConfig {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            params: Map::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// 读取字符串参数，缺省时返回 `default`；`default` 为 `None` 表示必填
    pub fn string(&self, name: &str, default: Option<&str>) -> Result<String> {
        match self.params.get(name) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(Error::Configuration(format!(
                "cache [{}] parameter `{}` must be a string, got {}",
                self.class, name, other
            ))),
            None => default.map(str::to_string).ok_or_else(|| self.missing(name)),
        }
    }

    pub fn integer(&self, name: &str, default: Option<i64>) -> Result<i64> {
        match self.params.get(name) {
            Some(value) => value.as_i64().ok_or_else(|| {
                Error::Configuration(format!(
                    "cache [{}] parameter `{}` must be an integer, got {}",
                    self.class, name, value
                ))
            }),
            None => default.ok_or_else(|| self.missing(name)),
        }
    }

    fn missing(&self, name: &str) -> Error {
        Error::Configuration(format!(
            "unresolvable parameter `{}` for cache [{}]",
            name, self.class
        ))
    }
}

type Constructor = Box<dyn Fn(&CacheConfig) -> Result<Arc<dyn Cache>> + Send + Sync>;

/// 缓存构造器注册表
pub struct CacheRegistry {
    constructors: HashMap<String, Constructor>,
}

impl Default for CacheRegistry {
    /// 包含内置的 `memory` 与 `file`
    fn default() -> Self {
        let mut registry = Self::empty();

        registry.register("memory", |config| {
            let lifetime = config.integer("default_lifetime", Some(0))?;
            Ok(Arc::new(MemoryCache::with_default_lifetime(lifetime)))
        });

        registry.register("file", |config| {
            let directory = config.string("directory", None)?;
            let namespace = config.string("namespace", Some(""))?;
            let lifetime = config.integer("default_lifetime", Some(0))?;
            Ok(Arc::new(FileCache::new(directory, &namespace, lifetime)))
        });

        registry
    }
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// 注册（或覆盖）一个缓存类型
    pub fn register<F>(&mut self, class: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&CacheConfig) -> Result<Arc<dyn Cache>> + Send + Sync + 'static,
    {
        self.constructors.insert(class.into(), Box::new(constructor));
        self
    }

    pub fn contains(&self, class: &str) -> bool {
        self.constructors.contains_key(class)
    }

    pub fn build(&self, config: &CacheConfig) -> Result<Arc<dyn Cache>> {
        let constructor = self.constructors.get(&config.class).ok_or_else(|| {
            Error::Configuration(format!("cache [{}] is not registered", config.class))
        })?;
        constructor(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_from_mapping() {
        let config: CacheConfig = serde_json::from_value(json!({
            "class": "file",
            "namespace": "Test",
            "default_lifetime": 10,
            "directory": "/tmp/runtime"
        }))
        .unwrap();

        assert_eq!(config.class, "file");
        assert_eq!(config.string("namespace", None).unwrap(), "Test");
        assert_eq!(config.integer("default_lifetime", None).unwrap(), 10);
        assert!(!config.params.contains_key("class"));
    }

    #[tokio::test]
    async fn test_build_builtin_caches() {
        let registry = CacheRegistry::new();
        let dir = tempfile::tempdir().unwrap();

        let memory = registry.build(&CacheConfig::new("memory")).unwrap();
        assert!(memory.set("k", json!(1), Some(60)).await);
        assert!(memory.has("k").await);

        let file = registry
            .build(
                &CacheConfig::new("file")
                    .param("directory", dir.path().to_string_lossy().to_string())
                    .param("namespace", "Test"),
            )
            .unwrap();
        assert!(file.set("k", json!(2), Some(60)).await);
        assert_eq!(file.get("k").await, Some(json!(2)));
    }

    #[test]
    fn test_unknown_class_is_rejected() {
        let err = CacheRegistry::new()
            .build(&CacheConfig::new("redis"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("redis")));
    }

    #[test]
    fn test_missing_required_parameter() {
        let err = CacheRegistry::new()
            .build(&CacheConfig::new("file"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("directory")));
    }

    #[test]
    fn test_wrong_parameter_type() {
        let config = CacheConfig::new("memory").param("default_lifetime", "soon");
        let err = CacheRegistry::new().build(&config).err().unwrap();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = CacheRegistry::empty();
        assert!(!registry.contains("memory"));

        registry.register("mine", |_| Ok(Arc::new(MemoryCache::new())));
        assert!(registry.contains("mine"));
        assert!(registry.build(&CacheConfig::new("mine")).is_ok());
    }
}
