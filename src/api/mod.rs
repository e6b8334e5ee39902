//! 八爪鱼数据 API 的请求与响应类型

mod types;

pub use types::{Credentials, GrantRequest, Token};

/// 数据 API 根地址
pub const DATA_API_BASE_URI: &str = "https://dataapi.bazhuayu.com/";

/// 令牌接口路径
pub const TOKEN_ENDPOINT: &str = "token";

/// 分页接口的默认条数
pub const DEFAULT_PAGE_SIZE: u32 = 100;

pub mod paths {
    pub const TASK_GROUP: &str = "api/TaskGroup";
    pub const TASK: &str = "api/Task";
    pub const REMOVE_DATA_BY_TASK_ID: &str = "api/task/RemoveDataByTaskId";
    pub const NOT_EXPORTED_TOP: &str = "api/notexportdata/gettop";
    pub const NOT_EXPORTED_UPDATE: &str = "api/notexportdata/update";
    pub const DATA_BY_OFFSET: &str = "api/alldata/GetDataOfTaskByOffset";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_password_grant_fields() {
        let grant = GrantRequest::from(&Credentials::new("u", "p"));
        assert_eq!(
            grant.form_fields(),
            vec![("username", "u"), ("password", "p"), ("grant_type", "password")]
        );
        assert_eq!(
            serde_json::to_value(&grant).unwrap(),
            json!({"grant_type": "password", "username": "u", "password": "p"})
        );
    }

    #[test]
    fn test_refresh_grant_fields() {
        let grant = GrantRequest::RefreshToken {
            refresh_token: "r1".to_string(),
        };
        assert_eq!(
            grant.form_fields(),
            vec![("refresh_token", "r1"), ("grant_type", "refresh_token")]
        );
    }

    #[test]
    fn test_token_keeps_unknown_fields() {
        let raw = json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 86400,
            "token_type": "bearer",
            ".issued": "Mon, 01 Jan 2024 00:00:00 GMT"
        });
        let token: Token = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(token.access_token, "a");
        assert_eq!(token.refresh_token.as_deref(), Some("r"));
        assert_eq!(token.extra.get("token_type"), Some(&json!("bearer")));
        assert_eq!(serde_json::to_value(&token).unwrap(), raw);
    }

    #[test]
    fn test_token_without_refresh_token() {
        let token: Token =
            serde_json::from_value(json!({"access_token": "a", "expires_in": 10})).unwrap();
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("user", "hunter2"));
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
    }
}
