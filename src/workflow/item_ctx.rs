//! 问卷处理上下文
//!
//! 封装"我正在处理第几个问卷、地址是什么"这一信息

use std::fmt::Display;

/// 问卷处理上下文
#[derive(Debug, Clone)]
pub struct ItemCtx {
    /// 当前序号（从1开始）
    pub index: usize,
    /// 问卷总数
    pub total: usize,
    /// 问卷地址
    pub url: String,
}

impl ItemCtx {
    pub fn new(index: usize, total: usize, url: impl Into<String>) -> Self {
        Self {
            index,
            total,
            url: url.into(),
        }
    }

    /// 进度标记，如 `[2/5]`
    pub fn progress(&self) -> String {
        format!("[{}/{}]", self.index, self.total)
    }

    pub fn is_last(&self) -> bool {
        self.index >= self.total
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}/{}] {}", self.index, self.total, self.url)
    }
}
