//! 问卷解析 - 业务能力层
//!
//! 把问卷页面转换为 [`QuestionnairePayload`]。纯函数：相同的页面和时间戳
//! 总是得到相同的结果，除日志外没有副作用。
//!
//! 页面结构：
//! - `input[type=hidden]`：需要原样回传的隐藏字段
//! - `div.post-problem`：题目块，内含 `input[name=problem_id]`（`value` 为题目 ID，`perc` 为权重）
//! - `div.answerDiv`：答案区域，位于题目块内部或紧随其后；含 `textarea` 的是主观题，
//!   否则取第一个 `input[type=radio]`（`value` 为答案，`score` 为分数）

use crate::config::Config;
use crate::error::{AppResult, ParseWarning};
use crate::models::{QuestionKind, QuestionRecord, QuestionnairePayload};
use crate::utils::html::selector;
use crate::utils::logging::truncate_text;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// 选择题缺少文字时显示的占位
const UNKNOWN_LABEL: &str = "未知选项";

/// 提交接口要求的固定字段
const CONTROL_FIELDS: [(&str, &str); 3] = [
    ("setAction", "answerStudent"),
    ("templateFlag", "0"),
    ("keyword", "null"),
];

/// 客户端时间戳字段
const TIMESTAMP_FIELD: &str = "t";

/// 客户端时间戳（秒，带小数）
pub fn client_timestamp() -> String {
    let now = chrono::Utc::now();
    format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
}

struct Selectors {
    title: Selector,
    hidden: Selector,
    problem: Selector,
    problem_id: Selector,
    answer_region: Selector,
    textarea: Selector,
    radio: Selector,
}

impl Selectors {
    fn new() -> AppResult<Self> {
        Ok(Self {
            title: selector("div.post-title")?,
            hidden: selector(r#"input[type="hidden"]"#)?,
            problem: selector("div.post-problem")?,
            problem_id: selector(r#"input[name="problem_id"]"#)?,
            answer_region: selector("div.answerDiv")?,
            textarea: selector("textarea")?,
            radio: selector(r#"input[type="radio"]"#)?,
        })
    }
}

/// 问卷解析器
pub struct PayloadBuilder {
    comment_text: String,
    selectors: Selectors,
}

impl PayloadBuilder {
    pub fn new(config: &Config) -> AppResult<Self> {
        Self::with_comment(config.comment_text.clone())
    }

    /// 指定主观题评语
    pub fn with_comment(comment_text: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            comment_text: comment_text.into(),
            selectors: Selectors::new()?,
        })
    }

    /// 解析问卷页面并构建提交内容
    pub fn build(&self, document: &str, client_timestamp: &str) -> QuestionnairePayload {
        let html = Html::parse_document(document);
        let sel = &self.selectors;

        let title = html
            .select(&sel.title)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string());
        if let Some(title) = &title {
            info!(" -> 问卷标题: {}", title);
        }

        let mut payload = QuestionnairePayload {
            title,
            fields: self.collect_fields(&html, client_timestamp),
            ..Default::default()
        };

        for (index, block) in html.select(&sel.problem).enumerate() {
            let index = index + 1;
            match self.parse_question(block, index) {
                Ok(Some(record)) => payload.records.push(record),
                Ok(None) => {}
                Err(warning) => {
                    warn!("   [警告] {}", warning);
                    payload.warnings.push(warning);
                }
            }
        }

        debug!(
            "问卷解析完成: {} 道题目, {} 个警告",
            payload.records.len(),
            payload.warnings.len()
        );
        payload
    }

    /// 固定控制字段 + 隐藏字段，同名时以隐藏字段为准
    fn collect_fields(&self, html: &Html, client_timestamp: &str) -> BTreeMap<String, String> {
        let mut fields: BTreeMap<String, String> = CONTROL_FIELDS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        fields.insert(TIMESTAMP_FIELD.to_string(), client_timestamp.to_string());

        for input in html.select(&self.selectors.hidden) {
            let element = input.value();
            if let (Some(name), Some(value)) = (element.attr("name"), element.attr("value")) {
                if !name.is_empty() {
                    fields.insert(name.to_string(), value.to_string());
                }
            }
        }
        fields
    }

    /// 解析单个题目块
    ///
    /// 没有题目 ID 的块不算题目，返回 `Ok(None)`；找不到可作答控件时返回警告。
    fn parse_question(
        &self,
        block: ElementRef<'_>,
        index: usize,
    ) -> Result<Option<QuestionRecord>, ParseWarning> {
        let sel = &self.selectors;
        let Some(id_input) = block.select(&sel.problem_id).next() else {
            return Ok(None);
        };

        info!("   [问题 {}] {}", index, question_text(block));

        let identifier = id_input.value().attr("value").unwrap_or_default().to_string();
        let percent = id_input.value().attr("perc").unwrap_or_default().to_string();

        let region = self
            .answer_region(block)
            .ok_or(ParseWarning::MissingAnswerRegion { index })?;

        if region.select(&sel.textarea).next().is_some() {
            info!("   [答案 {}] (主观题): {}", index, self.comment_text);
            return Ok(Some(QuestionRecord {
                identifier,
                kind: QuestionKind::FreeText,
                answer: self.comment_text.clone(),
                score: String::new(),
                percent,
                label: None,
            }));
        }

        let option = region
            .select(&sel.radio)
            .next()
            .ok_or(ParseWarning::MissingChoice { index })?;
        let label = option_label(option);
        info!("   [答案 {}] (选择题): {}", index, label);

        Ok(Some(QuestionRecord {
            identifier,
            kind: QuestionKind::Choice,
            answer: option.value().attr("value").unwrap_or_default().to_string(),
            score: option.value().attr("score").unwrap_or_default().to_string(),
            percent,
            label: Some(label),
        }))
    }

    /// 答案区域：先在题目块内部找，再找后面的兄弟节点，遇到下一个题目块即停止
    fn answer_region<'a>(&self, block: ElementRef<'a>) -> Option<ElementRef<'a>> {
        let sel = &self.selectors;
        if let Some(inner) = block.select(&sel.answer_region).next() {
            return Some(inner);
        }
        for sibling in block.next_siblings().filter_map(ElementRef::wrap) {
            if sel.answer_region.matches(&sibling) {
                return Some(sibling);
            }
            if sel.problem.matches(&sibling) {
                break;
            }
        }
        None
    }
}

/// 题干：题目块自身的直接文本
fn question_text(block: ElementRef<'_>) -> String {
    let text: String = block
        .children()
        .filter_map(|child| child.value().as_text().map(|t| &**t))
        .collect();
    truncate_text(text.trim(), 80)
}

/// 选项后面紧跟的 label 文字
fn option_label(option: ElementRef<'_>) -> String {
    option
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "label")
        .map(|label| label.text().collect::<String>().trim().to_string())
        .filter(|label| !label.is_empty())
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::questionnaire::{KEY_ANSWERS, KEY_IDS, KEY_PERCENTS, KEY_SCORES};

    const COMMENT: &str = "老师讲得很好，没有意见。";
    const TS: &str = "1700000000.000000";

    fn builder() -> PayloadBuilder {
        PayloadBuilder::with_comment(COMMENT).unwrap()
    }

    const SAMPLE: &str = r#"
        <html><body>
        <form>
          <input type="hidden" name="assess_id" value="A1B2">
          <input type="hidden" name="sign" value="">
          <input type="hidden" value="no-name">
          <div class="post-title"> 2024 秋季学期课程评价 </div>
          <div class="post-problem">
            <input type="hidden" name="problem_id" value="101" perc="30">
            教师授课认真
            <div class="answerDiv">
              <input type="radio" name="r101" value="A" score="10"><label>非常满意</label>
              <input type="radio" name="r101" value="B" score="8"><label>满意</label>
            </div>
          </div>
          <div class="post-problem">
            <input type="hidden" name="problem_id" value="102" perc="20">
            课堂内容充实
          </div>
          <div class="answerDiv">
            <input type="radio" name="r102" value="C" score="9"><label>很好</label>
          </div>
          <div class="post-problem">说明：以下为主观题</div>
          <div class="post-problem">
            <input type="hidden" name="problem_id" value="103" perc="50">
            意见和建议
            <div class="answerDiv"><textarea name="t103"></textarea></div>
          </div>
        </form>
        </body></html>
    "#;

    #[test]
    fn test_build_sample_questionnaire() {
        let payload = builder().build(SAMPLE, TS);

        assert_eq!(payload.title.as_deref(), Some("2024 秋季学期课程评价"));
        assert_eq!(payload.ids(), vec!["101", "102", "103"]);
        assert_eq!(payload.answers(), vec!["A", "C", COMMENT]);
        assert_eq!(payload.scores(), vec!["10", "9", ""]);
        assert_eq!(payload.percents(), vec!["30", "20", "50"]);
        assert_eq!(payload.records[2].kind, QuestionKind::FreeText);
        assert_eq!(payload.records[0].label.as_deref(), Some("非常满意"));
        assert!(payload.warnings.is_empty());

        let form = payload.to_form();
        assert_eq!(form[KEY_IDS], "_101_102_103");
        assert_eq!(form[KEY_ANSWERS], format!("_A_C_{}", COMMENT));
        assert_eq!(form[KEY_SCORES], "_10_9_");
        assert_eq!(form[KEY_PERCENTS], "_30_20_50");
    }

    #[test]
    fn test_hidden_and_control_fields() {
        let payload = builder().build(SAMPLE, TS);
        let fields = &payload.fields;

        assert_eq!(fields["assess_id"], "A1B2");
        assert_eq!(fields["sign"], "");
        assert_eq!(fields["setAction"], "answerStudent");
        assert_eq!(fields["templateFlag"], "0");
        assert_eq!(fields["keyword"], "null");
        assert_eq!(fields["t"], TS);
        assert!(!fields.values().any(|v| v == "no-name"));
    }

    #[test]
    fn test_hidden_field_overrides_control_field() {
        let html = r#"<input type="hidden" name="templateFlag" value="1">"#;
        let payload = builder().build(html, TS);
        assert_eq!(payload.fields["templateFlag"], "1");
    }

    #[test]
    fn test_build_is_deterministic() {
        let first = builder().build(SAMPLE, TS).to_form();
        let second = builder().build(SAMPLE, TS).to_form();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_document_serializes_underscores() {
        let payload = builder().build("<html><body></body></html>", TS);
        let form = payload.to_form();
        for key in [KEY_IDS, KEY_ANSWERS, KEY_SCORES, KEY_PERCENTS] {
            assert_eq!(form[key], "_");
        }
    }

    #[test]
    fn test_missing_answer_region_is_skipped_with_warning() {
        let html = r#"
            <div class="post-problem"><input name="problem_id" value="1" perc="40">无答案</div>
            <div class="post-problem">
              <input name="problem_id" value="2" perc="60">有答案
              <div class="answerDiv"><input type="radio" value="A" score="5"></div>
            </div>
        "#;
        let payload = builder().build(html, TS);

        assert_eq!(payload.ids(), vec!["2"]);
        assert_eq!(payload.answers().len(), 1);
        assert_eq!(payload.scores().len(), 1);
        assert_eq!(payload.percents(), vec!["60"]);
        assert_eq!(payload.records[0].label.as_deref(), Some(UNKNOWN_LABEL));
        assert_eq!(
            payload.warnings,
            vec![ParseWarning::MissingAnswerRegion { index: 1 }]
        );
    }

    #[test]
    fn test_choice_region_without_radio_is_skipped() {
        let html = r#"
            <div class="post-problem">
              <input name="problem_id" value="9" perc="10">
              <div class="answerDiv"><span>暂无选项</span></div>
            </div>
        "#;
        let payload = builder().build(html, TS);
        assert!(payload.records.is_empty());
        assert_eq!(payload.warnings, vec![ParseWarning::MissingChoice { index: 1 }]);
    }

    #[test]
    fn test_single_free_text_question() {
        let html = r#"
            <div class="post-problem">
              <input name="problem_id" value="7" perc="100">其他意见
              <div class="answerDiv"><textarea></textarea></div>
            </div>
        "#;
        let form = builder().build(html, TS).to_form();
        assert_eq!(form[KEY_ANSWERS], format!("_{}", COMMENT));
        assert_eq!(form[KEY_SCORES], "_");
    }
}
