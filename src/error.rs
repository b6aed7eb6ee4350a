//! 错误类型
//!
//! 按组件划分错误，并通过 [`ErrorKind`] 区分"可重试 / 终止 / 致命"三类，
//! 调用方只根据 `kind()` 做决策，不去匹配错误信息字符串。

use thiserror::Error;

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 可重试（验证码识别错误、网络抖动）
    Retryable,
    /// 终止（账号密码错误，重试没有意义）
    Terminal,
    /// 致命（当前工作单元无法继续）
    Fatal,
}

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 验证码获取或识别失败
    #[error("验证码错误: {0}")]
    Captcha(#[from] CaptchaError),

    /// 登录失败
    #[error("登录错误: {0}")]
    Login(#[from] LoginError),

    /// 登录后建立会话失败
    #[error("访问加载页面失败: {0}")]
    SessionWarmup(#[source] HttpError),

    /// 获取待评价列表失败
    #[error("获取课程列表失败: {0}")]
    Listing(#[from] ListingError),

    /// 问卷提交失败
    #[error("评价过程中发生错误: {0}")]
    Submission(#[from] SubmissionError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 未归类的 HTTP 错误
    #[error("网络错误: {0}")]
    Http(#[from] HttpError),

    /// 页面选择器无法解析
    #[error("选择器 {selector} 无效: {reason}")]
    Selector {
        selector: &'static str,
        reason: String,
    },

    /// 运行被取消
    #[error("操作已取消")]
    Cancelled,
}

impl AppError {
    /// 错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Captcha(_) => ErrorKind::Retryable,
            AppError::Login(LoginError::CredentialsRejected { .. }) => ErrorKind::Terminal,
            AppError::Login(LoginError::Transient { .. } | LoginError::Request(_)) => {
                ErrorKind::Retryable
            }
            AppError::Login(LoginError::AttemptsExhausted { .. }) => ErrorKind::Fatal,
            AppError::SessionWarmup(_)
            | AppError::Listing(_)
            | AppError::Submission(_)
            | AppError::Config(_)
            | AppError::Http(_)
            | AppError::Selector { .. }
            | AppError::Cancelled => ErrorKind::Fatal,
        }
    }

    /// 是否为取消
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled)
    }

    /// 为 HTTP 错误补充所属组件，其他错误（包括取消）原样返回
    pub(crate) fn map_http(self, wrap: impl FnOnce(HttpError) -> AppError) -> AppError {
        match self {
            AppError::Http(e) => wrap(e),
            other => other,
        }
    }
}

/// HTTP 层错误
#[derive(Debug, Error)]
pub enum HttpError {
    /// 请求发送失败（连接、超时等）
    #[error("请求 {endpoint} 失败: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 非 2xx 状态码
    #[error("请求 {endpoint} 返回状态码 {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    /// 响应体读取或解析失败
    #[error("解析 {endpoint} 响应失败: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// 客户端构建失败
    #[error("HTTP 客户端初始化失败: {0}")]
    Client(#[source] reqwest::Error),
}

/// 验证码错误（均可重试）
#[derive(Debug, Error)]
pub enum CaptchaError {
    /// 获取验证码图片失败
    #[error("获取验证码失败: {0}")]
    Fetch(#[source] HttpError),

    /// 识别器内部失败
    #[error("识别验证码失败: {0}")]
    Solve(String),

    /// 识别结果格式不合法
    #[error("识别结果不合法: {0:?}")]
    Malformed(String),
}

/// 登录错误
#[derive(Debug, Error)]
pub enum LoginError {
    /// 服务器明确拒绝账号密码
    #[error("账号或密码错误: {message}")]
    CredentialsRejected { message: String },

    /// 其他失败（一般是验证码识别错误）
    #[error("登录失败: {message}")]
    Transient { message: String },

    /// 登录请求本身失败
    #[error("登录请求异常: {0}")]
    Request(#[source] HttpError),

    /// 用尽重试次数
    #[error("已达到最大尝试次数 ({attempts})，登录失败。最后一次错误: {last}")]
    AttemptsExhausted { attempts: u32, last: String },
}

/// 列表获取错误
#[derive(Debug, Error)]
pub enum ListingError {
    /// 服务器仍然认为我们未登录
    #[error("服务器仍然认为我们未登录")]
    NotAuthenticated,

    #[error("{0}")]
    Request(#[source] HttpError),
}

/// 提交错误
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// 获取问卷页面失败
    #[error("进入问卷页面失败 ({url}): {source}")]
    Fetch {
        url: String,
        #[source]
        source: HttpError,
    },

    /// 提交请求失败
    #[error("提交请求失败 ({url}): {source}")]
    Request {
        url: String,
        #[source]
        source: HttpError,
    },

    /// 响应中没有成功标记
    #[error("提交失败，服务器返回信息未知 ({url}): {snippet}")]
    Rejected { url: String, snippet: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 未配置账号或密码
    #[error("未找到环境变量 SWJTU_USERNAME 或 SWJTU_PASSWORD，学号或密码不能为空")]
    MissingCredentials,

    /// 配置值非法
    #[error("配置项 {key} 非法: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },

    /// 配置文件读取失败
    #[error("读取配置文件 {path} 失败: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 配置文件解析失败
    #[error("解析配置文件 {path} 失败: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 解析问卷时的非致命警告，只会导致对应题目被跳过
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWarning {
    /// 找不到答案区域
    #[error("找不到问题 {index} 的答案区域，跳过此题")]
    MissingAnswerRegion { index: usize },

    /// 选择题没有可选项
    #[error("问题 {index} 没有可选的选项，跳过此题")]
    MissingChoice { index: usize },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
