//! 远程 OCR 识别
//!
//! 把图片原始字节 POST 给识别服务，响应正文即为识别结果。

use crate::captcha::CaptchaSolver;
use crate::error::{CaptchaError, HttpError};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

pub struct RemoteOcrSolver {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteOcrSolver {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, CaptchaError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CaptchaError::Fetch(HttpError::Client(e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl CaptchaSolver for RemoteOcrSolver {
    async fn classify(&self, image: &[u8]) -> Result<String, CaptchaError> {
        debug!("调用 OCR 服务: {} ({} 字节)", self.endpoint, image.len());

        let response = self
            .client
            .post(self.endpoint.as_str())
            .header(CONTENT_TYPE, "image/jpeg")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| CaptchaError::Solve(format!("OCR 服务请求失败: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaptchaError::Solve(format!("OCR 服务返回状态码 {}", status)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| CaptchaError::Solve(format!("读取 OCR 结果失败: {}", e)))?;

        Ok(text.trim().to_string())
    }
}
