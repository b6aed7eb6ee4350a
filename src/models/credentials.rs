//! 账号密码
//!
//! 密码只在构造登录表单时通过 [`Password::expose`] 取出，`Debug` 输出一律脱敏。

use serde::Deserialize;
use std::fmt;

/// 密码，`Debug` 不显示明文
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 取出明文
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// 登录凭据，进程生命周期内不可变
#[derive(Clone, Debug)]
pub struct Credentials {
    username: String,
    password: Password,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: Password) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let credentials = Credentials::new("2022000000", Password::new("hunter2"));
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("2022000000"));
        assert!(!rendered.contains("hunter2"));
    }
}
