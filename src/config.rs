//! 编译期配置
//!
//! 通过环境变量在编译时覆盖默认值，例如 `PORTAL_AP_PREFIX=LAB cargo build`。

use std::time::Duration;

/// AP 模式的固定地址，配网页通过它访问
pub const PORTAL_URL: &str = "http://192.168.4.1/";

/// 保存配置后到重启之间的延迟
pub const RESTART_DELAY: Duration = Duration::from_secs(2);

const DEFAULT_AP_PREFIX: &str = "WIICMATH";
const DEFAULT_AP_CHANNEL: u8 = 1;
const DEFAULT_MAX_CONNECTIONS: u16 = 4;
const DEFAULT_NVS_NAMESPACE: &str = "setting";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    // SoftAP 名称前缀，完整名称为 `{prefix}-{MAC 后 6 位}`
    pub ap_prefix: &'static str,

    pub ap_channel: u8,

    pub max_connections: u16,

    // 保存 WiFi 凭据的 NVS 命名空间
    pub nvs_namespace: &'static str,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            ap_prefix: DEFAULT_AP_PREFIX,
            ap_channel: DEFAULT_AP_CHANNEL,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            nvs_namespace: DEFAULT_NVS_NAMESPACE,
        }
    }
}

impl PortalConfig {
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("PORTAL_AP_PREFIX"),
            option_env!("PORTAL_AP_CHANNEL"),
            option_env!("PORTAL_MAX_CONNECTIONS"),
            option_env!("PORTAL_NVS_NAMESPACE"),
        )
    }

    /// 非法或为空的值回退到默认值
    pub fn from_values(
        ap_prefix: Option<&'static str>,
        ap_channel: Option<&str>,
        max_connections: Option<&str>,
        nvs_namespace: Option<&'static str>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            ap_prefix: ap_prefix
                .filter(|prefix| !prefix.is_empty())
                .unwrap_or(defaults.ap_prefix),
            ap_channel: ap_channel
                .and_then(|raw| raw.parse::<u8>().ok())
                .filter(|ch| (1..=13).contains(ch))
                .unwrap_or(defaults.ap_channel),
            max_connections: max_connections
                .and_then(|raw| raw.parse::<u16>().ok())
                .filter(|n| (1..=10).contains(n))
                .unwrap_or(defaults.max_connections),
            // NVS 命名空间最长 15 字节
            nvs_namespace: nvs_namespace
                .filter(|ns| !ns.is_empty() && ns.len() <= 15)
                .unwrap_or(defaults.nvs_namespace),
        }
    }

    pub fn ap_ssid(&self, mac: &[u8; 6]) -> String {
        ap_ssid(self.ap_prefix, mac)
    }
}

/// 取 MAC 地址后 3 个字节作为 AP 名称后缀
pub fn ap_ssid(prefix: &str, mac: &[u8; 6]) -> String {
    format!("{}-{:02X}{:02X}{:02X}", prefix, mac[3], mac[4], mac[5])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        assert_eq!(
            PortalConfig::from_values(None, None, None, None),
            PortalConfig::default()
        );
    }

    #[test]
    fn overrides_are_applied() {
        let config = PortalConfig::from_values(Some("LAB"), Some("6"), Some("2"), Some("wifi"));
        assert_eq!(config.ap_prefix, "LAB");
        assert_eq!(config.ap_channel, 6);
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.nvs_namespace, "wifi");
    }

    #[test]
    fn invalid_overrides_fall_back() {
        let config = PortalConfig::from_values(
            Some(""),
            Some("14"),
            Some("many"),
            Some("a-namespace-that-is-too-long"),
        );
        assert_eq!(config, PortalConfig::default());
    }

    #[test]
    fn ssid_uses_mac_suffix() {
        let mac = [0x24, 0x0a, 0xc4, 0x12, 0xab, 0x0f];
        assert_eq!(ap_ssid("WIICMATH", &mac), "WIICMATH-12AB0F");
        assert_eq!(PortalConfig::default().ap_ssid(&mac), "WIICMATH-12AB0F");
    }
}
