//! 访问令牌的获取、刷新与缓存
//!
//! 令牌以凭据指纹为键写入 [`Cache`]，TTL 为 `expires_in` 减去安全余量，
//! 是否过期完全由缓存后端判断。

use log::{debug, info, warn};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use super::http::{Body, HttpClient};
use crate::api::{Credentials, GrantRequest, TOKEN_ENDPOINT, Token};
use crate::cache::Cache;
use crate::error::{Error, Result};

/// 默认安全余量（秒）
pub const DEFAULT_SAFE_SECONDS: i64 = 500;

/// 默认缓存键前缀
pub const DEFAULT_CACHE_PREFIX: &str = "bazhuayu.client.access_token.";

/// 提供密码授权所需的凭据
pub trait CredentialsProvider: Send + Sync {
    fn credentials(&self) -> Credentials;
}

impl CredentialsProvider for Credentials {
    fn credentials(&self) -> Credentials {
        self.clone()
    }
}

pub struct TokenManager<P = Credentials> {
    provider: P,
    cache: Arc<dyn Cache>,
    http: HttpClient,
    cache_prefix: String,
    endpoint: String,
    safe_seconds: i64,
}

impl<P: CredentialsProvider> TokenManager<P> {
    pub fn new(provider: P, cache: Arc<dyn Cache>, http: HttpClient) -> Self {
        Self {
            provider,
            cache,
            http,
            cache_prefix: DEFAULT_CACHE_PREFIX.to_string(),
            endpoint: TOKEN_ENDPOINT.to_string(),
            safe_seconds: DEFAULT_SAFE_SECONDS,
        }
    }

    pub fn with_safe_seconds(mut self, safe_seconds: i64) -> Self {
        self.safe_seconds = safe_seconds;
        self
    }

    pub fn with_cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = prefix.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    pub fn safe_seconds(&self) -> i64 {
        self.safe_seconds
    }

    /// 由凭据计算的缓存键，相同凭据总是得到相同的键
    pub fn cache_key(&self) -> String {
        let credentials = self.provider.credentials();
        // serde_json 的 Map 按键排序，序列化结果稳定
        let payload = json!({
            "username": credentials.username,
            "password": credentials.password,
            "grant_type": "password",
        });
        let digest = Sha256::digest(payload.to_string().as_bytes());
        format!("{}{}", self.cache_prefix, hex::encode(digest))
    }

    pub async fn access_token(&self) -> Result<String> {
        Ok(self.token(false).await?.access_token)
    }

    /// 获取令牌
    ///
    /// - 非强制刷新且缓存命中：直接返回缓存中的令牌，不发请求；
    /// - 强制刷新且缓存命中：用缓存令牌的 `refresh_token` 换取新令牌；
    /// - 缓存未命中（或缓存令牌缺少 `refresh_token`）：走密码授权。
    ///
    /// 新令牌会写回缓存。
    pub async fn token(&self, force_refresh: bool) -> Result<Token> {
        let key = self.cache_key();

        let cached = if self.cache.has(&key).await {
            self.cache.get(&key).await
        } else {
            None
        };

        let token = match cached {
            Some(cached) if !force_refresh => {
                debug!("令牌缓存命中: {}", key);
                return Ok(serde_json::from_value(cached)?);
            }
            Some(cached) => {
                let stale: Token = serde_json::from_value(cached)?;
                match stale.refresh_token {
                    Some(refresh_token) => {
                        info!("刷新访问令牌");
                        self.request_token(&GrantRequest::RefreshToken { refresh_token })
                            .await?
                    }
                    None => {
                        warn!("缓存的令牌没有 refresh_token，改用密码授权");
                        self.request_password_grant().await?
                    }
                }
            }
            None => self.request_password_grant().await?,
        };

        self.set_token(&token).await?;

        Ok(token)
    }

    /// 写入缓存，TTL = `expires_in - safe_seconds`，不大于 0 时缓存会直接丢弃该令牌
    pub async fn set_token(&self, token: &Token) -> Result<&Self> {
        let ttl = token.expires_in - self.safe_seconds;
        let value = serde_json::to_value(token)?;

        if !self.cache.set(&self.cache_key(), value, Some(ttl)).await {
            return Err(Error::CacheWrite);
        }

        debug!("令牌已缓存，TTL {} 秒", ttl);
        Ok(self)
    }

    /// 调用令牌接口，传输错误不做分类
    pub async fn request_token(&self, grant: &GrantRequest) -> Result<Token> {
        let fields = grant
            .form_fields()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        let body = self
            .http
            .post(
                &self.endpoint,
                &[],
                Body::Form(fields),
                &[(
                    "Content-Type",
                    "application/x-www-form-urlencoded".to_string(),
                )],
            )
            .await?;

        Ok(serde_json::from_value(body)?)
    }

    async fn request_password_grant(&self) -> Result<Token> {
        let credentials = self.provider.credentials();
        info!("使用账号 {} 获取访问令牌", credentials.username);
        self.request_token(&GrantRequest::from(&credentials)).await
    }
}
