//! 提交结果与运行统计

/// 单个问卷的提交结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub success: bool,
    pub message: String,
}

impl SubmissionResult {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// 单个问卷的处理记录
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    pub url: String,
    pub result: SubmissionResult,
}

/// 整次运行的统计
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// 待评价问卷总数
    pub total: usize,
    pub outcomes: Vec<ItemOutcome>,
}

impl RunReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            outcomes: Vec::with_capacity(total),
        }
    }

    pub fn record(&mut self, url: impl Into<String>, result: SubmissionResult) {
        self.outcomes.push(ItemOutcome {
            url: url.into(),
            result,
        });
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.result.success).count()
    }

    /// 全部问卷都已成功提交（没有问卷也算成功）
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.outcomes.len() == self.total
    }
}
