//! 教务系统地址

/// 站点各接口地址，全部由根地址派生
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 登录页面（只用作 Referer）
    pub fn login_page(&self) -> String {
        format!("{}/service/login.html", self.base_url)
    }

    pub fn login_api(&self) -> String {
        format!("{}/vatuu/UserLoginAction", self.base_url)
    }

    pub fn captcha(&self) -> String {
        format!("{}/vatuu/GetRandomNumberToJPEG", self.base_url)
    }

    /// 登录后建立会话的加载页面
    pub fn loading(&self) -> String {
        format!("{}/vatuu/UserLoadingAction", self.base_url)
    }

    pub fn assess_list(&self) -> String {
        format!("{}/vatuu/AssessAction?setAction=list", self.base_url)
    }

    pub fn submit(&self) -> String {
        format!("{}/vatuu/AssessAction", self.base_url)
    }

    /// 把页面里的相对链接（`../vatuu/...`）转换为完整地址
    pub fn absolute(&self, href: &str) -> String {
        let path = href.trim().replace("..", "");
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}
