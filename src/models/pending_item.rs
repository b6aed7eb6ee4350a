use std::fmt;

/// 一个待填写问卷的完整地址
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingItem {
    url: String,
}

impl PendingItem {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for PendingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
