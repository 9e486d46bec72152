//! 配网 AP 与 HTTP 服务

use std::sync::{Arc, Mutex};

use anyhow::Context;
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    http::server::{Configuration as HttpConfig, EspHttpServer},
    ipv4::{Configuration as IpConfig, Ipv4Addr, Mask, RouterConfiguration, Subnet},
    netif::{EspNetif, NetifConfiguration, NetifStack},
    nvs::EspDefaultNvs,
    wifi::{AccessPointConfiguration, AuthMethod, BlockingWifi, Configuration, EspWifi, WifiDriver},
};
use tokio::sync::mpsc;

use super::store::NvsStore;
use super::{handlers, PortalEvent};
use crate::config::PortalConfig;

/// 与 `config::PORTAL_URL` 对应
const PORTAL_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 4, 1);

// GET 路由表 + /api/status + /configure
const MAX_URI_HANDLERS: usize = 12;
const HTTP_STACK_SIZE: usize = 8192;

/// 运行中的配网服务，drop 后 HTTP 服务和 AP 依次关闭
pub struct CaptivePortal<'a> {
    _server: EspHttpServer<'a>,
    _wifi: BlockingWifi<EspWifi<'a>>,
}

impl<'a> CaptivePortal<'a> {
    pub fn start(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        config: &PortalConfig,
        ap_ssid: &str,
        store: Arc<Mutex<NvsStore<EspDefaultNvs>>>,
        events: mpsc::Sender<PortalEvent>,
    ) -> anyhow::Result<Self> {
        let wifi = open_access_point(modem, sysloop, config, ap_ssid)
            .with_context(|| format!("failed to start SoftAP {}", ap_ssid))?;
        log::info!("SoftAP {} up on channel {}", ap_ssid, config.ap_channel);

        let mut server = EspHttpServer::new(&HttpConfig {
            stack_size: HTTP_STACK_SIZE,
            max_uri_handlers: MAX_URI_HANDLERS,
            ..Default::default()
        })?;
        handlers::register_routes(&mut server, store, events)?;
        log::info!("Portal listening on http://{}/", PORTAL_ADDR);

        Ok(Self {
            _server: server,
            _wifi: wifi,
        })
    }
}

/// 路由器模式的网络接口：网关、DHCP 和 DNS 都指向设备自身
fn router_netif() -> anyhow::Result<EspNetif> {
    let conf = NetifConfiguration {
        ip_configuration: Some(IpConfig::Router(RouterConfiguration {
            subnet: Subnet {
                gateway: PORTAL_ADDR,
                mask: Mask(24),
            },
            dhcp_enabled: true,
            dns: Some(PORTAL_ADDR),
            secondary_dns: None,
        })),
        ..NetifConfiguration::wifi_default_router()
    };
    Ok(EspNetif::new_with_conf(&conf)?)
}

fn open_access_point<'d>(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    config: &PortalConfig,
    ap_ssid: &str,
) -> anyhow::Result<BlockingWifi<EspWifi<'d>>> {
    let driver = WifiDriver::new(modem, sysloop.clone(), None)?;
    // STA 接口不使用，wrap_all 要求提供
    let esp_wifi = EspWifi::wrap_all(driver, EspNetif::new(NetifStack::Sta)?, router_netif()?)?;
    let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

    wifi.set_configuration(&Configuration::AccessPoint(AccessPointConfiguration {
        ssid: ap_ssid
            .try_into()
            .map_err(|_| anyhow::anyhow!("AP SSID too long: {}", ap_ssid))?,
        ssid_hidden: false,
        channel: config.ap_channel,
        auth_method: AuthMethod::None,
        max_connections: config.max_connections,
        ..Default::default()
    }))?;
    wifi.start()?;

    Ok(wifi)
}
