//! 问卷答案数据模型
//!
//! 解析阶段产出逐题的 [`QuestionRecord`]，编码阶段 [`QuestionnairePayload::to_form`]
//! 再把它们拼成服务器要求的下划线格式。两步互不干扰。

use crate::error::ParseWarning;
use std::collections::BTreeMap;

/// 题目 ID 序列的保留键
pub const KEY_IDS: &str = "id";
/// 答案序列的保留键
pub const KEY_ANSWERS: &str = "answer";
/// 分数序列的保留键
pub const KEY_SCORES: &str = "scores";
/// 权重序列的保留键
pub const KEY_PERCENTS: &str = "percents";

/// 题目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// 主观题（文本框）
    FreeText,
    /// 选择题（单选）
    Choice,
}

/// 单道题目的作答记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    /// 题目 ID（problem_id）
    pub identifier: String,
    pub kind: QuestionKind,
    /// 提交的答案值
    pub answer: String,
    /// 选项分数，主观题为空
    pub score: String,
    /// 题目权重
    pub percent: String,
    /// 所选选项的文字，仅用于日志
    pub label: Option<String>,
}

/// 一份问卷的提交内容
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionnairePayload {
    /// 问卷标题
    pub title: Option<String>,
    /// 隐藏字段与固定控制字段
    pub fields: BTreeMap<String, String>,
    /// 按文档顺序排列的作答记录
    pub records: Vec<QuestionRecord>,
    /// 解析过程中的警告
    pub warnings: Vec<ParseWarning>,
}

impl QuestionnairePayload {
    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.identifier.as_str()).collect()
    }

    pub fn answers(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.answer.as_str()).collect()
    }

    pub fn scores(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.score.as_str()).collect()
    }

    pub fn percents(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.percent.as_str()).collect()
    }

    /// 编码为提交表单
    ///
    /// 四个序列写在最后，覆盖同名字段。
    pub fn to_form(&self) -> BTreeMap<String, String> {
        let mut form = self.fields.clone();
        form.insert(KEY_IDS.to_string(), encode_sequence(self.ids()));
        form.insert(KEY_ANSWERS.to_string(), encode_sequence(self.answers()));
        form.insert(KEY_SCORES.to_string(), encode_sequence(self.scores()));
        form.insert(KEY_PERCENTS.to_string(), encode_sequence(self.percents()));
        form
    }
}

/// 下划线编码：`[a, b, c]` → `_a_b_c`，空序列为 `_`
pub fn encode_sequence<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut encoded = String::new();
    let mut empty = true;
    for value in values {
        encoded.push('_');
        encoded.push_str(value.as_ref());
        empty = false;
    }
    if empty {
        encoded.push('_');
    }
    encoded
}
