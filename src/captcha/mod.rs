//! 验证码识别（外部协作者）
//!
//! 核心流程只依赖 [`CaptchaSolver`]：图片字节 → 文本。具体识别方式可替换。

pub mod interactive;
pub mod remote;

pub use interactive::InteractiveSolver;
pub use remote::RemoteOcrSolver;

use crate::config::Config;
use crate::error::CaptchaError;
use std::future::Future;

/// 验证码识别器
pub trait CaptchaSolver {
    /// 识别验证码图片
    fn classify(&self, image: &[u8]) -> impl Future<Output = Result<String, CaptchaError>> + Send;
}

/// 规范化识别结果：去掉首尾空白，必须是非空的字母数字
pub fn normalize_code(raw: &str) -> Result<String, CaptchaError> {
    let code = raw.trim();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CaptchaError::Malformed(raw.to_string()));
    }
    Ok(code.to_string())
}

/// 按配置选择的识别器
pub enum ConfiguredSolver {
    /// 手动输入
    Interactive(InteractiveSolver),
    /// 远程 OCR 服务
    Remote(RemoteOcrSolver),
}

impl ConfiguredSolver {
    /// 配置了 OCR 地址时使用远程识别，否则手动输入
    pub fn from_config(config: &Config) -> Result<Self, CaptchaError> {
        match config.ocr_api_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(Self::Remote(RemoteOcrSolver::new(
                url,
                config.request_timeout(),
            )?)),
            _ => Ok(Self::Interactive(InteractiveSolver::new(&config.captcha_image_path))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Interactive(_) => "手动输入",
            Self::Remote(_) => "远程 OCR",
        }
    }
}

impl CaptchaSolver for ConfiguredSolver {
    async fn classify(&self, image: &[u8]) -> Result<String, CaptchaError> {
        match self {
            Self::Interactive(solver) => solver.classify(image).await,
            Self::Remote(solver) => solver.classify(image).await,
        }
    }
}
