//! WiFi 凭据持久化

use super::form::{Credentials, MAX_FORM_LEN};

/// NVS 中保存 SSID 的键
pub const SSID_KEY: &str = "ssid";
/// NVS 中保存密码的键
pub const PASS_KEY: &str = "pass";

/// 读取字符串的缓冲区大小。表单中任何字段都不会超过整个请求体，
/// 多出的 1 字节留给 NVS 的结尾 NUL。
pub const READ_BUF_LEN: usize = MAX_FORM_LEN + 1;

pub trait CredentialStore {
    type Error: std::fmt::Debug;

    /// 没有保存过 SSID 时返回 `None`
    fn load(&self) -> Result<Option<Credentials>, Self::Error>;

    fn save(&mut self, credentials: &Credentials) -> Result<(), Self::Error>;
}

/// 内存中的凭据存储，重启后丢失
#[derive(Debug, Default)]
pub struct MemoryStore {
    credentials: Option<Credentials>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    type Error = std::convert::Infallible;

    fn load(&self) -> Result<Option<Credentials>, Self::Error> {
        Ok(self.credentials.clone())
    }

    fn save(&mut self, credentials: &Credentials) -> Result<(), Self::Error> {
        self.credentials = Some(credentials.clone());
        Ok(())
    }
}

/// NVS 命名空间的字符串读写，接口与 `EspNvs` 一致
pub trait StrStorage {
    type Error: std::fmt::Debug;

    /// 值（含结尾 NUL）放不进 `buf` 时返回错误
    fn get_str<'a>(&self, key: &str, buf: &'a mut [u8]) -> Result<Option<&'a str>, Self::Error>;

    fn set_str(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

    fn remove(&mut self, key: &str) -> Result<bool, Self::Error>;
}

/// 以 `ssid`/`pass` 两个键保存凭据
#[derive(Debug)]
pub struct NvsStore<S> {
    storage: S,
}

impl<S: StrStorage> NvsStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn into_inner(self) -> S {
        self.storage
    }
}

impl<S: StrStorage> CredentialStore for NvsStore<S> {
    type Error = S::Error;

    fn load(&self) -> Result<Option<Credentials>, Self::Error> {
        let mut str_buf = [0; READ_BUF_LEN];
        let ssid = self
            .storage
            .get_str(SSID_KEY, &mut str_buf)?
            .unwrap_or_default()
            .to_string();
        if ssid.is_empty() {
            return Ok(None);
        }

        let password = self
            .storage
            .get_str(PASS_KEY, &mut str_buf)?
            .unwrap_or_default()
            .to_string();

        Ok(Some(Credentials { ssid, password }))
    }

    // 先删 SSID，最后写入 SSID：中途失败时 load 返回 None，不会读到新旧混合的凭据
    fn save(&mut self, credentials: &Credentials) -> Result<(), Self::Error> {
        self.storage.remove(SSID_KEY)?;
        self.storage.set_str(PASS_KEY, &credentials.password)?;
        self.storage.set_str(SSID_KEY, &credentials.ssid)?;
        log::info!("Saved credentials for SSID {:?}", credentials.ssid);
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
mod nvs {
    use esp_idf_svc::nvs::{EspNvs, NvsDefault};
    use esp_idf_svc::sys::EspError;

    use super::StrStorage;

    impl StrStorage for EspNvs<NvsDefault> {
        type Error = EspError;

        fn get_str<'a>(&self, key: &str, buf: &'a mut [u8]) -> Result<Option<&'a str>, EspError> {
            EspNvs::get_str(self, key, buf)
        }

        fn set_str(&mut self, key: &str, value: &str) -> Result<(), EspError> {
            EspNvs::set_str(self, key, value)
        }

        fn remove(&mut self, key: &str) -> Result<bool, EspError> {
            EspNvs::remove(self, key)
        }
    }
}
