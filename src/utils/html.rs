//! HTML 选择器

use crate::error::{AppError, AppResult};
use scraper::Selector;

/// 解析 CSS 选择器
pub fn selector(css: &'static str) -> AppResult<Selector> {
    Selector::parse(css).map_err(|e| AppError::Selector {
        selector: css,
        reason: e.to_string(),
    })
}
