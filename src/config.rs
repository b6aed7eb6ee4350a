use crate::error::ConfigError;
use crate::models::{Credentials, Password};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// 服务器要求的最短提交等待时间（秒）
pub const SERVER_MIN_SUBMIT_DELAY_SECS: u64 = 65;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// 单个问卷失败时的处理策略
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPolicy {
    /// 任一问卷失败立即终止整个流程
    FailFast,
    /// 记录失败并继续处理下一个问卷
    BestEffort,
}

impl FromStr for RunPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(RunPolicy::FailFast),
            "best_effort" => Ok(RunPolicy::BestEffort),
            _ => Err(()),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 教务系统根地址
    pub base_url: String,
    /// 学号
    pub username: Option<String>,
    /// 密码
    pub password: Option<Password>,
    /// 最大登录尝试次数
    pub max_login_attempts: u32,
    /// 登录失败后的等待时间（毫秒）
    pub login_retry_delay_ms: u64,
    /// 提交前等待的下限（秒）
    pub submit_delay_min_secs: u64,
    /// 提交前等待的上限（秒）
    pub submit_delay_max_secs: u64,
    /// 两个问卷之间的暂停（毫秒）
    pub item_pause_ms: u64,
    /// 单个请求超时（秒）
    pub request_timeout_secs: u64,
    /// 失败处理策略
    pub run_policy: RunPolicy,
    /// 主观题默认评语
    pub comment_text: String,
    /// 验证码识别服务地址，未配置时使用手动输入
    pub ocr_api_url: Option<String>,
    /// 手动输入模式下验证码图片的保存路径
    pub captcha_image_path: String,
    /// 模拟浏览器的 User-Agent
    pub user_agent: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://jwc.swjtu.edu.cn".to_string(),
            username: None,
            password: None,
            max_login_attempts: 5,
            login_retry_delay_ms: 1000,
            submit_delay_min_secs: SERVER_MIN_SUBMIT_DELAY_SECS,
            submit_delay_max_secs: 75,
            item_pause_ms: 3000,
            request_timeout_secs: 30,
            run_policy: RunPolicy::BestEffort,
            comment_text: "老师讲得很好，没有意见。".to_string(),
            ocr_api_url: None,
            captcha_image_path: "captcha.jpg".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 按 默认值 → 配置文件 → 环境变量 的顺序加载配置
    ///
    /// 不做校验也不写日志，日志初始化后再调用 [`Config::validate`]。
    pub fn load() -> Result<Self, ConfigError> {
        let base = match Self::file_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 实际存在的配置文件路径（`AUTO_ASSESS_CONFIG`，默认 `config.toml`）
    pub fn file_path() -> Option<PathBuf> {
        existing_file(std::env::var("AUTO_ASSESS_CONFIG").ok())
    }

    /// 从 TOML 文件读取配置，缺失的键使用默认值
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 使用环境变量覆盖配置
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// 使用 `lookup` 提供的变量覆盖配置
    ///
    /// 账号密码变量为空白时视为未设置，不覆盖配置文件中的值。
    pub fn with_overrides<L>(self, lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Ok(Self {
            base_url: lookup("BASE_URL").unwrap_or(self.base_url),
            username: non_blank("SWJTU_USERNAME").or(self.username),
            password: non_blank("SWJTU_PASSWORD").map(Password::new).or(self.password),
            max_login_attempts: parse_var(&lookup, "MAX_LOGIN_ATTEMPTS", "u32")?.unwrap_or(self.max_login_attempts),
            login_retry_delay_ms: parse_var(&lookup, "LOGIN_RETRY_DELAY_MS", "u64")?.unwrap_or(self.login_retry_delay_ms),
            submit_delay_min_secs: parse_var(&lookup, "SUBMIT_DELAY_MIN_SECS", "u64")?.unwrap_or(self.submit_delay_min_secs),
            submit_delay_max_secs: parse_var(&lookup, "SUBMIT_DELAY_MAX_SECS", "u64")?.unwrap_or(self.submit_delay_max_secs),
            item_pause_ms: parse_var(&lookup, "ITEM_PAUSE_MS", "u64")?.unwrap_or(self.item_pause_ms),
            request_timeout_secs: parse_var(&lookup, "REQUEST_TIMEOUT_SECS", "u64")?.unwrap_or(self.request_timeout_secs),
            run_policy: parse_var(&lookup, "RUN_POLICY", "fail_fast | best_effort")?.unwrap_or(self.run_policy),
            comment_text: lookup("COMMENT_TEXT").unwrap_or(self.comment_text),
            ocr_api_url: lookup("OCR_API_URL").or(self.ocr_api_url),
            captcha_image_path: lookup("CAPTCHA_IMAGE_PATH").unwrap_or(self.captcha_image_path),
            user_agent: lookup("USER_AGENT").unwrap_or(self.user_agent),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
        })
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "base_url",
                reason: "不能为空".to_string(),
            });
        }
        if self.max_login_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "max_login_attempts",
                reason: "至少为 1".to_string(),
            });
        }
        if self.submit_delay_min_secs > self.submit_delay_max_secs {
            return Err(ConfigError::Invalid {
                key: "submit_delay_min_secs",
                reason: format!(
                    "下限 {} 大于上限 {}",
                    self.submit_delay_min_secs, self.submit_delay_max_secs
                ),
            });
        }
        if self.submit_delay_min_secs < SERVER_MIN_SUBMIT_DELAY_SECS {
            warn!(
                "⚠️ 提交等待下限 {} 秒低于教务处要求的 {} 秒，提交可能被拒绝",
                self.submit_delay_min_secs, SERVER_MIN_SUBMIT_DELAY_SECS
            );
        }
        Ok(())
    }

    /// 取出账号密码，缺失或为空时报错
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let username = self.username.as_deref().map(str::trim).unwrap_or_default();
        let password = self.password.clone().unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        Ok(Credentials::new(username, password))
    }

    pub fn login_retry_delay(&self) -> Duration {
        Duration::from_millis(self.login_retry_delay_ms)
    }

    pub fn item_pause(&self) -> Duration {
        Duration::from_millis(self.item_pause_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn existing_file(configured: Option<String>) -> Option<PathBuf> {
    let path = PathBuf::from(configured.unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string()));
    path.exists().then_some(path)
}

fn parse_var<T, L>(lookup: &L, var_name: &str, expected_type: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    L: Fn(&str) -> Option<String>,
{
    match lookup(var_name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type,
            }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_delay_window_matches_server_policy() {
        let config = Config::default();
        assert_eq!(config.submit_delay_min_secs, 65);
        assert_eq!(config.submit_delay_max_secs, 75);
        assert_eq!(config.max_login_attempts, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial_override() {
        let config = Config::from_toml_str(
            r#"
            username = "2022000000"
            password = "secret"
            run_policy = "fail_fast"
            item_pause_ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.run_policy, RunPolicy::FailFast);
        assert_eq!(config.item_pause_ms, 0);
        assert_eq!(config.base_url, "https://jwc.swjtu.edu.cn");
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.username(), "2022000000");
        assert_eq!(credentials.password().expose(), "secret");
    }

    #[test]
    fn test_missing_credentials_is_error() {
        let config = Config::default();
        assert!(matches!(config.credentials(), Err(ConfigError::MissingCredentials)));

        let config = Config {
            username: Some("  ".to_string()),
            password: Some(Password::new("x")),
            ..Config::default()
        };
        assert!(matches!(config.credentials(), Err(ConfigError::MissingCredentials)));
    }

    #[test]
    fn test_inverted_delay_window_rejected() {
        let config = Config {
            submit_delay_min_secs: 80,
            submit_delay_max_secs: 70,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_run_policy_from_str() {
        assert_eq!("fail-fast".parse::<RunPolicy>(), Ok(RunPolicy::FailFast));
        assert_eq!("BEST_EFFORT".parse::<RunPolicy>(), Ok(RunPolicy::BestEffort));
        assert!("sometimes".parse::<RunPolicy>().is_err());
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn from_file_config() -> Config {
        Config::from_toml_str(
            r#"
            username = "2022000000"
            password = "from-file"
            max_login_attempts = 3
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let config = from_file_config()
            .with_overrides(vars(&[
                ("SWJTU_USERNAME", "2023111111"),
                ("MAX_LOGIN_ATTEMPTS", " 7 "),
                ("RUN_POLICY", "fail-fast"),
                ("BASE_URL", "http://127.0.0.1:8080"),
            ]))
            .unwrap();

        assert_eq!(config.username.as_deref(), Some("2023111111"));
        assert_eq!(config.password.as_ref().map(Password::expose), Some("from-file"));
        assert_eq!(config.max_login_attempts, 7);
        assert_eq!(config.run_policy, RunPolicy::FailFast);
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.submit_delay_min_secs, 65);
    }

    #[test]
    fn test_unset_env_keeps_file_values() {
        let config = from_file_config().with_overrides(vars(&[])).unwrap();
        assert_eq!(config.max_login_attempts, 3);
        assert_eq!(config.username.as_deref(), Some("2022000000"));
    }

    #[test]
    fn test_unparsable_env_value_is_rejected() {
        let err = Config::default()
            .with_overrides(vars(&[("RUN_POLICY", "bogus")]))
            .unwrap_err();
        match err {
            ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            } => {
                assert_eq!(var_name, "RUN_POLICY");
                assert_eq!(value, "bogus");
                assert_eq!(expected_type, "fail_fast | best_effort");
            }
            other => panic!("unexpected error: {}", other),
        }

        assert!(matches!(
            Config::default().with_overrides(vars(&[("MAX_LOGIN_ATTEMPTS", "five")])),
            Err(ConfigError::EnvVarParseFailed { .. })
        ));
    }

    #[test]
    fn test_blank_credential_env_does_not_clobber_file() {
        let config = from_file_config()
            .with_overrides(vars(&[("SWJTU_USERNAME", ""), ("SWJTU_PASSWORD", "  ")]))
            .unwrap();

        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.username(), "2022000000");
        assert_eq!(credentials.password().expose(), "from-file");
    }

    #[test]
    fn test_config_file_only_used_when_present() {
        let manifest = format!("{}/Cargo.toml", env!("CARGO_MANIFEST_DIR"));
        assert_eq!(existing_file(Some(manifest.clone())), Some(PathBuf::from(manifest)));
        assert_eq!(existing_file(Some("/nonexistent/auto_assess.toml".to_string())), None);
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let config = Config {
            password: Some(Password::new("hunter2")),
            ..Config::default()
        };
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
