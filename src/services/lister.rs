//! 待评价列表 - 业务能力层

use crate::error::{AppResult, ListingError};
use crate::infrastructure::{Endpoints, HttpSession};
use crate::models::PendingItem;
use crate::utils::html::selector;
use scraper::{Html, Selector};
use tracing::{info, warn};

/// 服务器认为未登录时页面中的提示
pub const NOT_LOGGED_IN_PHRASE: &str = "非常抱歉，您还未登陆";

/// 待填写问卷链接的文字
pub const PENDING_LINK_LABEL: &str = "填写问卷";

/// 待评价列表服务
pub struct Lister {
    anchors: Selector,
}

impl Lister {
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            anchors: selector("a")?,
        })
    }

    /// 获取待评价问卷列表
    ///
    /// 列表可以为空；服务器提示未登录时返回 [`ListingError::NotAuthenticated`]。
    pub async fn list_pending(&self, session: &HttpSession) -> AppResult<Vec<PendingItem>> {
        info!("正在获取待评价课程列表...");
        let endpoints = session.endpoints();
        let referer = endpoints.loading();
        let body = session
            .get_text(&endpoints.assess_list(), Some(&referer))
            .await
            .map_err(|e| e.map_http(|source| ListingError::Request(source).into()))?;

        let items = self.parse(&body, endpoints)?;
        info!("成功找到 {} 门待评价课程。", items.len());
        Ok(items)
    }

    /// 解析列表页面，按文档顺序返回所有"填写问卷"链接
    pub fn parse(&self, body: &str, endpoints: &Endpoints) -> Result<Vec<PendingItem>, ListingError> {
        if body.contains(NOT_LOGGED_IN_PHRASE) {
            return Err(ListingError::NotAuthenticated);
        }

        let document = Html::parse_document(body);
        let mut items = Vec::new();
        for anchor in document.select(&self.anchors) {
            let label: String = anchor.text().collect();
            if label.trim() != PENDING_LINK_LABEL {
                continue;
            }
            match anchor.value().attr("href") {
                Some(href) => items.push(PendingItem::new(endpoints.absolute(href))),
                None => warn!("⚠️ \"{}\" 链接缺少 href，已忽略", PENDING_LINK_LABEL),
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lister() -> Lister {
        Lister::new().unwrap()
    }

    fn endpoints() -> Endpoints {
        Endpoints::new("https://jwc.swjtu.edu.cn")
    }

    #[test]
    fn test_parse_links_in_document_order() {
        let html = r#"
            <table>
              <tr><td>高等数学</td><td><a href="../vatuu/AssessAction?setAction=viewAssess&amp;id=2">填写问卷</a></td></tr>
              <tr><td>大学英语</td><td><a href="../vatuu/AssessAction?setAction=viewAssess&amp;id=1">填写问卷</a></td></tr>
              <tr><td>线性代数</td><td><a href="../vatuu/AssessAction?setAction=viewResult&amp;id=3">查看问卷</a></td></tr>
            </table>
        "#;

        let items = lister().parse(html, &endpoints()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].url(),
            "https://jwc.swjtu.edu.cn/vatuu/AssessAction?setAction=viewAssess&id=2"
        );
        assert_eq!(
            items[1].url(),
            "https://jwc.swjtu.edu.cn/vatuu/AssessAction?setAction=viewAssess&id=1"
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        let html = r#"<a href="../x?id=1">填写问卷</a><a href="../x?id=1">填写问卷</a>"#;
        assert_eq!(lister().parse(html, &endpoints()).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_list_is_ok() {
        let html = "<html><body><p>暂无需要评价的课程</p></body></html>";
        assert!(lister().parse(html, &endpoints()).unwrap().is_empty());
    }

    #[test]
    fn test_denial_phrase_is_error() {
        let html = "<html><body>非常抱歉，您还未登陆，请先登录</body></html>";
        assert!(matches!(
            lister().parse(html, &endpoints()),
            Err(ListingError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_label_must_match_whole_text() {
        let html = r#"<a href="../x?id=1">重新填写问卷</a><a href="../x?id=2"> 填写问卷 </a>"#;
        let items = lister().parse(html, &endpoints()).unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].url().ends_with("id=2"));
    }
}
