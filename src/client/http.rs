use log::{debug, error};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

use crate::error::{Error, HttpError, Result};

/// POST 请求体
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Form(Vec<(String, String)>),
}

/// HTTP客户端，负责拼接地址、发送请求并解析 JSON 响应
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// 创建新的HTTP客户端实例，`base_url` 会补齐结尾的 `/`
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(concat!("bazhuayu-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;

        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        headers: &[(&'static str, String)],
    ) -> std::result::Result<Value, HttpError> {
        let url = self.url(path);
        debug!("GET {} {:?}", url, query);

        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        self.send(with_headers(request, headers)).await
    }

    pub async fn post(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: Body,
        headers: &[(&'static str, String)],
    ) -> std::result::Result<Value, HttpError> {
        let url = self.url(path);
        debug!("POST {} {:?}", url, query);

        let mut request = with_headers(self.client.post(&url), headers);
        if !query.is_empty() {
            request = request.query(query);
        }
        request = match body {
            Body::Empty => request,
            Body::Form(fields) => request.form(&fields),
        };
        self.send(request).await
    }

    async fn send(&self, request: RequestBuilder) -> std::result::Result<Value, HttpError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("八爪鱼接口返回错误 ({}): {}", status.as_u16(), body);
            return Err(HttpError::Status {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &body),
            });
        }

        debug!("响应: {}", body);

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| HttpError::Decode {
            message: format!("{}, body: {}", e, body),
        })
    }
}

fn with_headers(mut request: RequestBuilder, headers: &[(&'static str, String)]) -> RequestBuilder {
    for (name, value) in headers {
        request = request.header(*name, value);
    }
    request
}

/// 尽量从 JSON 错误体中取出可读的消息
fn error_message(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["error_description", "message", "Message", "error"]
            .iter()
            .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
    });

    match detail {
        Some(detail) => detail,
        None if body.trim().is_empty() => format!("HTTP status {}", status),
        None => body.to_string(),
    }
}
