//! 登录服务 - 业务能力层
//!
//! 负责"验证码 + 账号密码登录"的重试循环。每次尝试都重新获取验证码，
//! 验证码是一次性的。

use crate::captcha::{normalize_code, CaptchaSolver};
use crate::config::Config;
use crate::error::{AppError, AppResult, CaptchaError, ErrorKind, LoginError};
use crate::infrastructure::HttpSession;
use crate::models::Credentials;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{error, info, warn};

/// 登录失败信息中表示"密码错误"的关键字
///
/// 这是基于服务器提示文字的经验判断，服务器改文案后会失效，
/// 失效时只会退化成多重试几次。
pub const PASSWORD_INDICATOR: &str = "密码";

/// 登录接口响应
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "loginStatus", default)]
    pub login_status: JsonValue,
    #[serde(rename = "loginMsg", default)]
    pub login_msg: Option<String>,
}

impl LoginResponse {
    /// `loginStatus` 为 "1" 表示成功
    pub fn is_success(&self) -> bool {
        match &self.login_status {
            JsonValue::String(s) => s.trim() == "1",
            JsonValue::Number(n) => n.as_i64() == Some(1),
            _ => false,
        }
    }

    pub fn message(&self) -> &str {
        self.login_msg.as_deref().unwrap_or("服务器未返回明确错误信息")
    }

    /// 解释登录结果
    pub fn interpret(&self) -> Result<String, LoginError> {
        if self.is_success() {
            Ok(self.message().to_string())
        } else {
            Err(classify_failure(self.message()))
        }
    }
}

/// 区分"密码错误"（终止）和其他失败（可重试）
pub fn classify_failure(message: &str) -> LoginError {
    if message.contains(PASSWORD_INDICATOR) {
        LoginError::CredentialsRejected {
            message: message.to_string(),
        }
    } else {
        LoginError::Transient {
            message: message.to_string(),
        }
    }
}

/// 登录服务
pub struct Authenticator {
    max_attempts: u32,
    retry_delay: Duration,
}

impl Authenticator {
    pub fn new(config: &Config) -> Self {
        Self::with_policy(config.max_login_attempts, config.login_retry_delay())
    }

    pub fn with_policy(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    /// 登录，最多尝试 `max_attempts` 次
    ///
    /// 可重试的错误在循环内部消化；密码错误立即返回，
    /// 次数用尽返回 [`LoginError::AttemptsExhausted`]。
    pub async fn authenticate<S: CaptchaSolver>(
        &self,
        session: &HttpSession,
        solver: &S,
        credentials: &Credentials,
    ) -> AppResult<()> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            info!("--- 第 {}/{} 次尝试登录 ---", attempt, self.max_attempts);

            match self.attempt(session, solver, credentials).await {
                Ok(message) => {
                    info!("✅ 登录成功！{}", message);
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Retryable => {
                    warn!("❌ {}", e);
                    last_error = e.to_string();
                    if attempt < self.max_attempts {
                        info!("等待 {} 毫秒后重试...", self.retry_delay.as_millis());
                        session.pause(self.retry_delay).await?;
                    }
                }
                Err(e) => {
                    error!("❌ {}", e);
                    return Err(e);
                }
            }
        }

        Err(LoginError::AttemptsExhausted {
            attempts: self.max_attempts,
            last: last_error,
        }
        .into())
    }

    /// 单次登录尝试：取验证码 → 识别 → 提交
    async fn attempt<S: CaptchaSolver>(
        &self,
        session: &HttpSession,
        solver: &S,
        credentials: &Credentials,
    ) -> AppResult<String> {
        let endpoints = session.endpoints();

        info!("正在获取验证码...");
        let cache_buster = chrono::Utc::now().timestamp_millis().to_string();
        let image = session
            .get_bytes(&endpoints.captcha(), &[("test", cache_buster.as_str())], None)
            .await
            .map_err(|e| e.map_http(|source| CaptchaError::Fetch(source).into()))?;

        info!("正在识别验证码...");
        let raw = solver.classify(&image).await?;
        let code = normalize_code(&raw)?;
        info!("验证码识别结果: {}", code);

        info!("正在提交登录...");
        let form = [
            ("username", credentials.username()),
            ("password", credentials.password().expose()),
            ("ranstring", code.as_str()),
            ("url", ""),
            ("returnType", ""),
            ("returnUrl", ""),
            ("area", ""),
        ];
        let login_page = endpoints.login_page();
        let response: LoginResponse = session
            .post_form_json(&endpoints.login_api(), &form, Some(&login_page))
            .await
            .map_err(|e| e.map_http(|source| LoginError::Request(source).into()))?;

        response.interpret().map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> LoginResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_status_one_is_success() {
        let r = response(r#"{"loginStatus":"1","loginMsg":"登录成功"}"#);
        assert_eq!(r.interpret().unwrap(), "登录成功");

        let r = response(r#"{"loginStatus":1}"#);
        assert!(r.is_success());
    }

    #[test]
    fn test_password_message_is_terminal() {
        let r = response(r#"{"loginStatus":"0","loginMsg":"密码错误"}"#);
        assert!(matches!(
            r.interpret(),
            Err(LoginError::CredentialsRejected { .. })
        ));
    }

    #[test]
    fn test_other_failure_is_transient() {
        let r = response(r#"{"loginStatus":"0","loginMsg":"验证码输入错误"}"#);
        let err = AppError::from(r.interpret().unwrap_err());
        assert_eq!(err.kind(), ErrorKind::Retryable);
    }

    #[test]
    fn test_missing_fields_are_failure() {
        let r = response("{}");
        assert!(!r.is_success());
        assert!(matches!(r.interpret(), Err(LoginError::Transient { .. })));
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        let authenticator = Authenticator::with_policy(0, Duration::ZERO);
        assert_eq!(authenticator.max_attempts, 1);
    }
}
