//! `/configure` 表单解析

use std::fmt;

use url::form_urlencoded;

use super::html::{PASSWORD_FIELD, SSID_FIELD};

/// 表单请求体的最大长度
pub const MAX_FORM_LEN: usize = 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("form body is not valid UTF-8")]
    NotUtf8,
    #[error("missing form field `{0}`")]
    MissingField(&'static str),
    // 设备端只读到上限加一字节，真实长度未知
    #[error("form body exceeds {max} bytes")]
    TooLarge { max: usize },
}

#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub ssid: String,
    pub password: String,
}

impl Credentials {
    /// 解析 `application/x-www-form-urlencoded` 请求体。
    ///
    /// 未知字段忽略，重复字段以最后一个为准；字段值不做校验。
    pub fn from_form(body: &[u8]) -> Result<Self, FormError> {
        if body.len() > MAX_FORM_LEN {
            return Err(FormError::TooLarge { max: MAX_FORM_LEN });
        }
        std::str::from_utf8(body).map_err(|_| FormError::NotUtf8)?;

        let mut ssid = None;
        let mut password = None;
        for (key, value) in form_urlencoded::parse(body) {
            if key == SSID_FIELD {
                ssid = Some(value.into_owned());
            } else if key == PASSWORD_FIELD {
                password = Some(value.into_owned());
            }
        }

        Ok(Self {
            ssid: ssid.ok_or(FormError::MissingField(SSID_FIELD))?,
            password: password.ok_or(FormError::MissingField(PASSWORD_FIELD))?,
        })
    }
}

// 密码脱敏显示
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &self.ssid)
            .field("password", &"*".repeat(self.password.len().min(8)))
            .finish()
    }
}
