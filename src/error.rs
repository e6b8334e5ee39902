//! 错误类型定义

use std::future::Future;
use thiserror::Error;

/// 传输层错误，由 [`HttpClient`](crate::client::HttpClient) 产生
#[derive(Debug, Error)]
pub enum HttpError {
    /// 服务端返回了非 2xx 状态码
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// 请求未能完成（连接失败、超时等）
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// 响应体不是合法的 JSON
    #[error("failed to decode response: {message}")]
    Decode { message: String },
}

/// 八爪鱼客户端错误
#[derive(Debug, Error)]
pub enum Error {
    /// 4xx：参数错误、令牌失效等调用方可修正的问题
    #[error("{message}")]
    Client { message: String, code: u16 },

    /// 5xx：服务端故障，可由上层重试
    #[error("{message}")]
    Server { message: String, code: u16 },

    #[error("Failed to cache access token.")]
    CacheWrite,

    /// 缓存构造或配置加载失败
    #[error("configuration error: {0}")]
    Configuration(String),

    /// 未分类的传输层错误
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// 分类后的 HTTP 状态码
    pub fn code(&self) -> Option<u16> {
        match self {
            Error::Client { code, .. } | Error::Server { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// 执行一个操作，把 4xx/5xx 传输错误转换为 [`Error::Client`] / [`Error::Server`]，
/// 其他错误原样返回
pub async fn handle_bad_response<T, F>(operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match operation.await {
        Err(Error::Http(HttpError::Status { status, message })) => match status {
            400..=499 => Err(Error::Client {
                message,
                code: status,
            }),
            500..=599 => Err(Error::Server {
                message,
                code: status,
            }),
            _ => Err(Error::Http(HttpError::Status { status, message })),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> Error {
        Error::Http(HttpError::Status {
            status,
            message: format!("status {}", status),
        })
    }

    #[tokio::test]
    async fn test_client_status_is_classified() {
        let err = handle_bad_response(async { Err::<(), _>(status(404)) })
            .await
            .unwrap_err();

        match err {
            Error::Client { message, code } => {
                assert_eq!(code, 404);
                assert_eq!(message, "status 404");
            }
            other => panic!("expected client error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_status_is_classified() {
        let err = handle_bad_response(async { Err::<(), _>(status(503)) })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Server { code: 503, .. }));
        assert_eq!(err.code(), Some(503));
    }

    #[tokio::test]
    async fn test_other_errors_pass_through() {
        let err = handle_bad_response(async { Err::<(), _>(Error::CacheWrite) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CacheWrite));

        let err = handle_bad_response(async {
            Err::<(), _>(Error::Http(HttpError::Decode {
                message: "bad".to_string(),
            }))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Http(HttpError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_statuses_outside_4xx_5xx_are_not_classified() {
        for code in [302, 399, 600] {
            let err = handle_bad_response(async { Err::<(), _>(status(code)) })
                .await
                .unwrap_err();
            assert!(
                matches!(err, Error::Http(HttpError::Status { status, .. }) if status == code),
                "status {}",
                code
            );
        }

        let err = handle_bad_response(async { Err::<(), _>(status(499)) })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Client { code: 499, .. }));
    }

    #[tokio::test]
    async fn test_success_is_returned_unchanged() {
        let value = handle_bad_response(async { Ok(42) }).await.unwrap();
        assert_eq!(value, 42);
    }
}
