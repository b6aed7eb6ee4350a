//! 手动输入验证码
//!
//! 把图片写到本地文件，提示用户查看后在终端输入。

use crate::captcha::CaptchaSolver;
use crate::error::CaptchaError;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;

pub struct InteractiveSolver {
    image_path: PathBuf,
}

impl InteractiveSolver {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
        }
    }
}

impl CaptchaSolver for InteractiveSolver {
    async fn classify(&self, image: &[u8]) -> Result<String, CaptchaError> {
        tokio::fs::write(&self.image_path, image)
            .await
            .map_err(|e| CaptchaError::Solve(format!("保存验证码图片失败: {}", e)))?;
        info!("🖼️ 验证码图片已保存至: {}", self.image_path.display());

        let line = tokio::task::spawn_blocking(|| -> std::io::Result<String> {
            print!("请查看验证码图片，并在此输入：");
            std::io::stdout().flush()?;
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await
        .map_err(|e| CaptchaError::Solve(e.to_string()))?
        .map_err(|e| CaptchaError::Solve(format!("读取输入失败: {}", e)))?;

        Ok(line.trim().to_string())
    }
}
