//! # Bazhuayu Client - 八爪鱼数据 API 客户端
//!
//! 通过账号密码换取访问令牌并缓存，封装八爪鱼数据 API 的任务组、任务、
//! 数据导出与分页接口。
//!
//! ## 功能模块
//!
//! - `api`: 请求与响应的数据结构、接口路径
//! - `cache`: 令牌缓存接口及内置实现
//! - `client`: HTTP 客户端、令牌管理与接口封装
//! - `config`: 客户端配置
//! - `error`: 错误类型
//!
//! ## 基本用法
//!
//! ```rust,no_run
//! use bazhuayu_client::{Client, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Client::new(ClientConfig::new("username", "password"))?;
//!
//!     let groups = client.task_group().await?;
//!     println!("任务组: {}", groups);
//!
//!     let rows = client.export_data("task-id", None).await?;
//!     println!("数据: {}", rows);
//!     client.update_data_status("task-id").await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## 自定义缓存
//!
//! ```rust,no_run
//! use bazhuayu_client::{CacheConfig, Client, ClientConfig};
//!
//! # fn main() -> bazhuayu_client::Result<()> {
//! let config = ClientConfig::new("username", "password").with_cache_config(
//!     CacheConfig::new("file")
//!         .param("directory", "/tmp/bazhuayu")
//!         .param("namespace", "prod"),
//! );
//! let client = Client::new(config)?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;

// 重新导出常用的类型，方便使用
pub use api::{Credentials, GrantRequest, Token};
pub use cache::{Cache, CacheConfig, CacheRegistry, FileCache, MemoryCache};
pub use client::{Client, CredentialsProvider, HttpClient, TokenManager};
pub use config::{CacheSetting, ClientConfig};
pub use error::{Error, HttpError, Result};
