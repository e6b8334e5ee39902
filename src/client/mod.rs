//! 客户端模块
//!
//! - `http`: 底层 HTTP 请求与 JSON 解析
//! - `token`: 访问令牌的获取、刷新与缓存
//! - [`Client`]: 八爪鱼数据 API 的各个接口

pub mod http;
pub mod token;

pub use http::{Body, HttpClient};
pub use token::{CredentialsProvider, TokenManager};

use log::debug;
use serde_json::Value;
use std::sync::Arc;

use crate::api::{DEFAULT_PAGE_SIZE, Token, paths};
use crate::cache::{Cache, CacheRegistry};
use crate::config::ClientConfig;
use crate::error::{Result, handle_bad_response};

/// 八爪鱼数据 API 客户端
///
/// 每个接口调用前都会向 [`TokenManager`] 取令牌，并以
/// `Authorization: bearer <token>` 发送。4xx/5xx 会被转换为
/// [`Error::Client`](crate::Error::Client) / [`Error::Server`](crate::Error::Server)。
pub struct Client {
    http: HttpClient,
    tokens: TokenManager,
}

impl Client {
    /// 使用内置缓存类型创建客户端
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_registry(config, &CacheRegistry::default())
    }

    /// 使用自定义的缓存注册表创建客户端
    pub fn with_registry(config: ClientConfig, registry: &CacheRegistry) -> Result<Self> {
        let cache = config.cache.resolve(registry)?;
        let http = HttpClient::new(
            config.base_uri.clone(),
            config.timeout,
            config.connect_timeout,
        )?;
        let tokens = TokenManager::new(config.credentials(), cache, http.clone());

        debug!("八爪鱼客户端已创建: {}", http.base_url());

        Ok(Self::from_parts(http, tokens))
    }

    pub fn from_parts(http: HttpClient, tokens: TokenManager) -> Self {
        Self { http, tokens }
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        self.tokens.cache()
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.tokens
    }

    /// 获取令牌，`refresh` 为 `true` 时强制刷新
    pub async fn token(&self, refresh: bool) -> Result<Token> {
        handle_bad_response(self.tokens.token(refresh)).await
    }

    /// 得到该用户所有的任务组
    pub async fn task_group(&self) -> Result<Value> {
        handle_bad_response(self.get(paths::TASK_GROUP, &[])).await
    }

    /// 获取任务组中的任务
    pub async fn task(&self, task_group_id: &str) -> Result<Value> {
        handle_bad_response(self.get(paths::TASK, &[("taskGroupId", task_group_id.to_string())]))
            .await
    }

    /// 清空任务数据
    pub async fn remove_data_by_task_id(&self, task_id: &str) -> Result<Value> {
        handle_bad_response(self.post(
            paths::REMOVE_DATA_BY_TASK_ID,
            &[("taskId", task_id.to_string())],
        ))
        .await
    }

    /// 导出一批未导出的数据，`size` 默认 100
    pub async fn export_data(&self, task_id: &str, size: Option<u32>) -> Result<Value> {
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        handle_bad_response(self.get(
            paths::NOT_EXPORTED_TOP,
            &[("taskId", task_id.to_string()), ("size", size.to_string())],
        ))
        .await
    }

    /// 标记数据为已导出状态
    pub async fn update_data_status(&self, task_id: &str) -> Result<Value> {
        handle_bad_response(self.post(
            paths::NOT_EXPORTED_UPDATE,
            &[("taskId", task_id.to_string())],
        ))
        .await
    }

    /// 根据起始偏移量获取任务数据，`offset` 默认 0，`size` 默认 100
    pub async fn get_data_of_task_by_offset(
        &self,
        task_id: &str,
        offset: Option<u64>,
        size: Option<u32>,
    ) -> Result<Value> {
        let offset = offset.unwrap_or(0);
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        handle_bad_response(self.get(
            paths::DATA_BY_OFFSET,
            &[
                ("taskId", task_id.to_string()),
                ("offset", offset.to_string()),
                ("size", size.to_string()),
            ],
        ))
        .await
    }

    async fn base_headers(&self) -> Result<Vec<(&'static str, String)>> {
        let access_token = self.tokens.access_token().await?;
        Ok(vec![
            ("Authorization", format!("bearer {}", access_token)),
            ("Content-Type", "application/json".to_string()),
        ])
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let headers = self.base_headers().await?;
        Ok(self.http.get(path, query, &headers).await?)
    }

    async fn post(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let headers = self.base_headers().await?;
        Ok(self.http.post(path, query, Body::Empty, &headers).await?)
    }
}
