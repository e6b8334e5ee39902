use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 账号凭据
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// 令牌接口的请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
pub enum GrantRequest {
    Password { username: String, password: String },
    RefreshToken { refresh_token: String },
}

impl From<&Credentials> for GrantRequest {
    fn from(credentials: &Credentials) -> Self {
        GrantRequest::Password {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        }
    }
}

impl GrantRequest {
    /// 表单字段，字段顺序固定
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            GrantRequest::Password { username, password } => vec![
                ("username", username.as_str()),
                ("password", password.as_str()),
                ("grant_type", "password"),
            ],
            GrantRequest::RefreshToken { refresh_token } => vec![
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ],
        }
    }
}

/// 令牌接口返回的令牌，未识别的字段保存在 `extra` 中原样透传
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
